//! `dotnet restore` and `dotnet publish` for source apps.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::stager::Stager;
use crate::util::config::Config;
use crate::util::process::{CommandRunner, ProcessBuilder};
use crate::util::{fs, Shell};

/// Build commands against the staging area.
pub struct DotnetCli<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    stager: &'a Stager,
}

impl<'a, R: CommandRunner + ?Sized> DotnetCli<'a, R> {
    pub fn new(runner: &'a R, stager: &'a Stager) -> Self {
        DotnetCli { runner, stager }
    }

    fn command(&self) -> ProcessBuilder {
        let dep_dir = self.stager.dep_dir();
        ProcessBuilder::new("dotnet")
            .cwd(self.stager.build_dir())
            .env("DOTNET_SKIP_FIRST_TIME_EXPERIENCE", "true")
            .env("DefaultItemExcludes", ".cloudfoundry/**/*.*")
            .env("HOME", dep_dir.to_string_lossy())
    }

    /// Restore every project file, in order.
    pub fn restore(&self, project_files: &[PathBuf], shell: &Shell) -> Result<()> {
        shell.begin_step("Restore dotnet dependencies");
        for path in project_files {
            let cmd = self.command().arg("restore").arg(path);
            self.runner.run(&cmd)?;
        }
        Ok(())
    }

    /// Publish the main project into `<dep_dir>/dotnet_publish`.
    ///
    /// `inherited_path` is the PATH the build commands would otherwise see.
    pub fn publish(
        &self,
        main_project: &Path,
        config: &Config,
        inherited_path: Option<&str>,
        shell: &Shell,
    ) -> Result<PathBuf> {
        shell.begin_step("Publish dotnet");

        let publish_dir = self.stager.dep_dir().join("dotnet_publish");
        fs::ensure_dir(&publish_dir)?;

        let node_bin = main_project
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("node_modules")
            .join(".bin");
        let path = match inherited_path {
            Some(rest) if !rest.is_empty() => format!("{}:{}", node_bin.display(), rest),
            _ => node_bin.display().to_string(),
        };

        let mut cmd = self
            .command()
            .env("PATH", path)
            .arg("publish")
            .arg(main_project)
            .arg("-o")
            .arg(&publish_dir)
            .args(["-c", config.publish_configuration()]);
        if let Some(rid) = config.runtime_identifier() {
            cmd = cmd.args(["-r", rid]);
        }

        shell.debug(format!("Running command: {}", cmd.display_command()));
        self.runner.run(&cmd)?;
        Ok(publish_dir)
    }
}
