//! `finalize resolve` command

use anyhow::Result;

use crate::cli::ResolveArgs;
use crate::commands::load_catalog;
use dotnet_finalize::resolver::resolve_framework_versions;
use dotnet_finalize::{Project, ProjectAccess};

pub fn execute(args: ResolveArgs) -> Result<()> {
    let catalog = load_catalog(args.manifest.as_deref())?;
    let dep_dir = args.deps_dir.join(&args.deps_idx);
    let project = Project::new(&args.build_dir, dep_dir, catalog, args.stack);

    let deployment = project.deployment_type()?;
    let versions = resolve_framework_versions(&project, deployment)?;

    if args.json {
        let output = serde_json::json!({
            "deployment": deployment.to_string(),
            "frameworks": versions.as_ref().map(|v| v.specs()),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("deployment: {}", deployment);
    match versions {
        Some(versions) => {
            for spec in versions.specs() {
                println!("{}", spec);
            }
        }
        None => println!("no shared frameworks required"),
    }
    Ok(())
}
