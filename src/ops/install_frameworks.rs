//! Classify, resolve and install the shared frameworks.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::deployment::DeploymentType;
use crate::core::project::ProjectAccess;
use crate::installer::Installer;
use crate::resolver::{resolve_framework_versions, FrameworkVersions};
use crate::util::Shell;

/// Classify the project, then resolve and install its frameworks into `target_dir`.
pub fn install_frameworks<P, I>(
    project: &P,
    installer: &I,
    target_dir: &Path,
    shell: &Shell,
) -> Result<Option<FrameworkVersions>>
where
    P: ProjectAccess + ?Sized,
    I: Installer + ?Sized,
{
    let deployment = project.deployment_type()?;
    install_frameworks_for(deployment, project, installer, target_dir, shell)
}

/// Same as [`install_frameworks`] for a project classified by the caller.
///
/// The web framework is always installed before the runtime. Any failure
/// aborts; nothing already installed is rolled back.
pub fn install_frameworks_for<P, I>(
    deployment: DeploymentType,
    project: &P,
    installer: &I,
    target_dir: &Path,
    shell: &Shell,
) -> Result<Option<FrameworkVersions>>
where
    P: ProjectAccess + ?Sized,
    I: Installer + ?Sized,
{
    let Some(versions) = resolve_framework_versions(project, deployment)? else {
        shell.info("Self-contained app, no shared frameworks required");
        return Ok(None);
    };

    for spec in versions.specs() {
        shell.info(format!("Installing {}", spec));
        installer
            .install_dependency(&spec, target_dir)
            .with_context(|| format!("failed to install {}", spec))?;
    }

    Ok(Some(versions))
}
