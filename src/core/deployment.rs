//! Deployment classification.
//!
//! A project is classified once per finalize run from the shape of the build
//! directory: a published runtime config means the app was pushed already
//! built, project files alone mean it must be built from source.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::runtime_config::RuntimeConfig;
use crate::resolver::ResolveError;

/// How the application reaches the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentType {
    /// Published, relies on a shared runtime and web framework.
    Fdd,
    /// Published with the runtime bundled; no shared frameworks needed.
    SelfContained,
    /// Project sources that must be restored and published here.
    Source,
}

impl DeploymentType {
    /// Whether the app arrived already published.
    pub fn is_published(self) -> bool {
        matches!(self, DeploymentType::Fdd | DeploymentType::SelfContained)
    }
}

impl fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentType::Fdd => write!(f, "FDD"),
            DeploymentType::SelfContained => write!(f, "SCD"),
            DeploymentType::Source => write!(f, "SOURCE"),
        }
    }
}

/// Decide the deployment type from what the build directory contains.
///
/// `published` is the parsed top-level runtime config, if one exists.
pub fn classify(
    root: &Path,
    published: Option<&RuntimeConfig>,
    project_files: &[PathBuf],
) -> Result<DeploymentType, ResolveError> {
    match published {
        Some(config) if config.framework.is_some() => Ok(DeploymentType::Fdd),
        Some(_) => Ok(DeploymentType::SelfContained),
        None if !project_files.is_empty() => Ok(DeploymentType::Source),
        None => Err(ResolveError::Classification {
            root: root.to_path_buf(),
        }),
    }
}
