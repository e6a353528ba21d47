//! Installable dependency identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog name of the shared base runtime.
pub const DOTNET_RUNTIME: &str = "dotnet-runtime";

/// Catalog name of the shared web framework.
pub const DOTNET_ASPNETCORE: &str = "dotnet-aspnetcore";

/// Framework name of the base runtime as written in runtime configs.
pub const NETCORE_APP: &str = "Microsoft.NETCore.App";

/// Framework name of the web framework (2.1 and later).
pub const ASPNETCORE_APP: &str = "Microsoft.AspNetCore.App";

/// Framework name of the 2.x web meta-package.
pub const ASPNETCORE_ALL: &str = "Microsoft.AspNetCore.All";

/// A fully resolved `(name, version)` pair handed to the installer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencySpec {
    pub name: String,
    pub version: String,
}

impl DependencySpec {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        DependencySpec {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Returns true for the two web-framework names.
pub fn is_web_framework(name: &str) -> bool {
    name == ASPNETCORE_APP || name == ASPNETCORE_ALL
}

/// Directory under `dotnet-sdk/shared/` holding installed versions of a dependency.
pub fn shared_framework_dir(dependency: &str) -> Option<&'static str> {
    match dependency {
        DOTNET_RUNTIME => Some(NETCORE_APP),
        DOTNET_ASPNETCORE => Some(ASPNETCORE_APP),
        _ => None,
    }
}
