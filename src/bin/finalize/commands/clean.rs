//! `finalize clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use dotnet_finalize::ops::clean_staging_area;
use dotnet_finalize::util::Shell;

pub fn execute(args: CleanArgs, shell: &Shell) -> Result<()> {
    let dep_dir = args.deps_dir.join(&args.deps_idx);
    let removed = clean_staging_area(&dep_dir, &args.start_command, args.install_node, shell)?;
    if removed.is_empty() {
        shell.info("Nothing to remove");
    }
    Ok(())
}
