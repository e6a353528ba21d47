//! Framework version resolution.
//!
//! Given a classified project, decide which web framework and which base
//! runtime must be installed. Resolution is all-or-nothing: both versions
//! are determined or an error is returned.

pub mod errors;
pub mod extract;
pub mod fdd;
pub mod source;
pub mod version;

pub use errors::ResolveError;
pub use fdd::resolve_fdd;
pub use source::resolve_source;

use serde::Serialize;

use crate::core::dependency::{DependencySpec, DOTNET_ASPNETCORE, DOTNET_RUNTIME};
use crate::core::deployment::DeploymentType;
use crate::core::project::ProjectAccess;

/// The two shared framework versions an application needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameworkVersions {
    pub aspnetcore: String,
    pub runtime: String,
}

impl FrameworkVersions {
    /// Install specs, web framework first.
    pub fn specs(&self) -> [DependencySpec; 2] {
        [
            DependencySpec::new(DOTNET_ASPNETCORE, &self.aspnetcore),
            DependencySpec::new(DOTNET_RUNTIME, &self.runtime),
        ]
    }
}

/// Resolve framework versions for an already classified project.
///
/// Self-contained apps carry their own runtime and yield `None`.
pub fn resolve_framework_versions<P>(
    project: &P,
    deployment: DeploymentType,
) -> Result<Option<FrameworkVersions>, ResolveError>
where
    P: ProjectAccess + ?Sized,
{
    let versions = match deployment {
        DeploymentType::Fdd => {
            let config = project.runtime_config()?;
            resolve_fdd(project, &config)?
        }
        DeploymentType::Source => resolve_source(project)?,
        DeploymentType::SelfContained => return Ok(None),
    };

    tracing::debug!(
        "resolved {} frameworks: aspnetcore {}, runtime {}",
        deployment,
        versions.aspnetcore,
        versions.runtime
    );
    Ok(Some(versions))
}
