//! Framework versions for framework-dependent deployments.
//!
//! The application's runtime config names only one of the two shared
//! frameworks. The other is derived from it:
//!
//! - a web framework reference is matched first, and the runtime it was
//!   built against is read from that web framework's own runtime config;
//! - a base runtime reference is matched directly, and the web framework is
//!   taken verbatim from the version pinned at restore time in `*.deps.json`.

use crate::core::dependency::{
    is_web_framework, ASPNETCORE_APP, DOTNET_ASPNETCORE, DOTNET_RUNTIME, NETCORE_APP,
};
use crate::core::project::ProjectAccess;
use crate::core::runtime_config::RuntimeConfig;
use crate::resolver::{FrameworkVersions, ResolveError};

/// Resolve both framework versions from the application's runtime config.
pub fn resolve_fdd<P>(
    project: &P,
    app_config: &RuntimeConfig,
) -> Result<FrameworkVersions, ResolveError>
where
    P: ProjectAccess + ?Sized,
{
    let (name, version) = match &app_config.framework {
        Some(framework) => (framework.name.as_str(), framework.version.as_str()),
        None => {
            return Err(ResolveError::MissingFramework {
                owner: "the application".to_string(),
            })
        }
    };
    let apply_patches = app_config.apply_patches;

    if is_web_framework(name) {
        let aspnetcore =
            project.find_matching_framework_version(DOTNET_ASPNETCORE, version, apply_patches)?;

        let nested = project.shared_framework_config(&aspnetcore)?;
        let nested_version = nested
            .framework_version()
            .ok_or_else(|| ResolveError::MissingFramework {
                owner: format!("{} {}", ASPNETCORE_APP, aspnetcore),
            })?;

        let runtime = project.find_matching_framework_version(
            DOTNET_RUNTIME,
            nested_version,
            apply_patches,
        )?;
        Ok(FrameworkVersions { aspnetcore, runtime })
    } else if name == NETCORE_APP {
        let runtime =
            project.find_matching_framework_version(DOTNET_RUNTIME, version, apply_patches)?;
        let aspnetcore = project.pinned_aspnetcore_version()?;
        Ok(FrameworkVersions { aspnetcore, runtime })
    } else {
        Err(ResolveError::UnsupportedFramework {
            name: name.to_string(),
        })
    }
}
