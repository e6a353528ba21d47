//! The finalize pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::deployment::DeploymentType;
use crate::core::project::{Project, ProjectAccess};
use crate::core::stager::Stager;
use crate::installer::Installer;
use crate::ops::clean::clean_staging_area;
use crate::ops::dotnet_cli::DotnetCli;
use crate::ops::install_frameworks::install_frameworks_for;
use crate::ops::launch::{write_profile_d, write_release};
use crate::resolver::FrameworkVersions;
use crate::util::process::CommandRunner;
use crate::util::{Config, Shell};

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalized {
    pub deployment: DeploymentType,
    pub frameworks: Option<FrameworkVersions>,
    pub start_command: PathBuf,
    pub release_file: PathBuf,
}

/// Everything the pipeline runs against.
pub struct FinalizeContext<'a, I: ?Sized, R: ?Sized> {
    pub project: &'a Project,
    pub stager: &'a Stager,
    pub installer: &'a I,
    pub runner: &'a R,
    pub config: &'a Config,
    pub shell: &'a Shell,
    /// PATH inherited by build commands.
    pub inherited_path: Option<String>,
}

/// Run the whole finalize stage.
///
/// Steps run strictly in order: restore, install frameworks, publish,
/// cleanup, profile.d, release file. The first failure aborts and nothing
/// later runs, so no release file is left behind by a failed run.
pub fn run<I, R>(cx: &FinalizeContext<'_, I, R>) -> Result<Finalized>
where
    I: Installer + ?Sized,
    R: CommandRunner + ?Sized,
{
    let shell = cx.shell;
    shell.begin_step("Finalizing Dotnet Core");

    let deployment = cx.project.deployment_type()?;
    shell.info(format!("Deployment type: {}", deployment));

    let cli = DotnetCli::new(cx.runner, cx.stager);
    if !deployment.is_published() {
        cli.restore(&cx.project.project_files(), shell)
            .context("unable to run dotnet restore")?;
    }

    shell.begin_step("Installing frameworks");
    let frameworks = install_frameworks_for(
        deployment,
        cx.project,
        cx.installer,
        &cx.stager.dotnet_sdk_dir(),
        shell,
    )
    .context("unable to install frameworks")?;

    if !deployment.is_published() {
        let main = cx.project.main_path()?;
        cli.publish(&main, cx.config, cx.inherited_path.as_deref(), shell)
            .context("unable to run dotnet publish")?;
    }

    let start_command = cx.project.start_command()?;
    clean_staging_area(
        &cx.stager.dep_dir(),
        &start_command.to_string_lossy(),
        cx.config.install_node,
        shell,
    )
    .context("unable to clean staging area")?;

    write_profile_d(cx.stager).context("unable to write profile.d")?;
    let release_file = write_release(cx.stager.build_dir(), &start_command)
        .context("unable to write release file")?;

    tracing::info!("finalize complete: {}", start_command.display());
    Ok(Finalized {
        deployment,
        frameworks,
        start_command,
        release_file,
    })
}
