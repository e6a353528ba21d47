//! dotnet-finalize - the finalize stage of a .NET Core buildpack
//!
//! This crate decides which shared runtime and web framework a staged
//! application needs, installs them, publishes source apps, trims the
//! staging area and writes the launch configuration.

pub mod core;
pub mod installer;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides scriptable implementations of the project accessor, installer
/// and command runner.
#[cfg(test)]
pub mod test_support;

pub use core::{DependencySpec, DeploymentType, Project, ProjectAccess, RuntimeConfig, Stager};
pub use installer::{CatalogInstaller, Installer};
pub use resolver::{FrameworkVersions, ResolveError};
