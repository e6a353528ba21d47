//! Version extraction from raw project text.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::dependency::{DOTNET_ASPNETCORE, DOTNET_RUNTIME};
use crate::resolver::ResolveError;

/// A named extraction rule bound to the dependency it yields a version for.
#[derive(Debug)]
pub struct VersionPattern {
    pub dependency: &'static str,
    pub regex: Regex,
}

impl VersionPattern {
    fn new(dependency: &'static str, pattern: &str) -> Self {
        VersionPattern {
            dependency,
            regex: Regex::new(pattern).expect("static version pattern"),
        }
    }
}

/// `<RuntimeFrameworkVersion>5.0.2</RuntimeFrameworkVersion>`
pub static RUNTIME_FRAMEWORK_VERSION: LazyLock<VersionPattern> = LazyLock::new(|| {
    VersionPattern::new(
        DOTNET_RUNTIME,
        r"<RuntimeFrameworkVersion>\s*([^<\s]+)\s*</RuntimeFrameworkVersion>",
    )
});

/// `<PackageReference Include="Microsoft.AspNetCore.All" Version="2.1.3" />`
pub static ASPNETCORE_PACKAGE_REFERENCE: LazyLock<VersionPattern> = LazyLock::new(|| {
    VersionPattern::new(
        DOTNET_ASPNETCORE,
        r#""Microsoft\.AspNetCore\.(?:All|App)"\s+Version="([^"]+)""#,
    )
});

/// Return the first capture of the first match of `pattern` in `text`.
///
/// `path` is only used to attribute a failure.
pub fn extract_version(
    text: &str,
    pattern: &VersionPattern,
    path: &Path,
) -> Result<String, ResolveError> {
    pattern
        .regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ResolveError::PatternNotMatched {
            dependency: pattern.dependency.to_string(),
            pattern: pattern.regex.as_str().to_string(),
            path: path.to_path_buf(),
        })
}
