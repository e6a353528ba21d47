//! `finalize run` command

use anyhow::Result;

use crate::cli::RunArgs;
use crate::commands::load_catalog;
use dotnet_finalize::ops::{self, FinalizeContext};
use dotnet_finalize::util::{Config, ProcessRunner, Shell};
use dotnet_finalize::{CatalogInstaller, Project, Stager};

pub fn execute(args: RunArgs, shell: &Shell) -> Result<()> {
    let config = Config::resolve(args.config.as_deref(), &args.build_dir, |key| {
        std::env::var(key).ok()
    })?;
    let catalog = load_catalog(args.manifest.as_deref())?;

    let stager = Stager::new(&args.build_dir, &args.cache_dir, &args.deps_dir, &args.deps_idx);
    let project = Project::new(
        stager.build_dir(),
        stager.dep_dir(),
        catalog.clone(),
        config.stack.clone(),
    );
    let installer = CatalogInstaller::new(catalog, stager.cache_dir(), config.stack.clone());

    let cx = FinalizeContext {
        project: &project,
        stager: &stager,
        installer: &installer,
        runner: &ProcessRunner,
        config: &config,
        shell,
        inherited_path: std::env::var("PATH").ok(),
    };

    match ops::run(&cx) {
        Ok(done) => {
            shell.info(format!("Start command: {}", done.start_command.display()));
            Ok(())
        }
        Err(e) => {
            shell.error(format!("{:#}", e));
            Err(e)
        }
    }
}
