//! Dependency installation.
//!
//! The resolution engine hands fully resolved `(name, version)` pairs to an
//! [`Installer`]; how the artifact is found, fetched and unpacked is the
//! installer's business.

pub mod catalog;
pub mod fetch;

use std::path::{Path, PathBuf};

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::dependency::DependencySpec;

pub use catalog::{Catalog, CatalogEntry};
pub use fetch::CatalogInstaller;

/// Installs a resolved dependency into a directory.
pub trait Installer {
    fn install_dependency(&self, spec: &DependencySpec, target_dir: &Path)
        -> Result<(), InstallError>;
}

/// Error while installing a dependency.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum InstallError {
    #[error("failed to read dependency catalog `{}`: {message}", .path.display())]
    #[diagnostic(code(finalize::install::catalog))]
    Catalog { path: PathBuf, message: String },

    #[error("`{spec}` is not in the dependency catalog for stack `{}`", .stack.as_deref().unwrap_or("any"))]
    #[diagnostic(
        code(finalize::install::unknown_dependency),
        help("check the `dependencies` list in the buildpack manifest")
    )]
    UnknownDependency {
        spec: DependencySpec,
        stack: Option<String>,
    },

    #[error("failed to download `{uri}`: {message}")]
    #[diagnostic(code(finalize::install::download))]
    Download { uri: String, message: String },

    #[error("checksum mismatch for `{uri}`: expected {expected}, got {actual}")]
    #[diagnostic(code(finalize::install::checksum))]
    ChecksumMismatch {
        uri: String,
        expected: String,
        actual: String,
    },

    #[error("failed to extract `{}`: {message}", .archive.display())]
    #[diagnostic(code(finalize::install::extract))]
    Extract { archive: PathBuf, message: String },

    #[error("i/o error on `{}`", .path.display())]
    #[diagnostic(code(finalize::install::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        InstallError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
