//! `*.runtimeconfig.json` parsing.
//!
//! Only the pieces that drive framework resolution are kept: the framework
//! reference and the patch roll-forward flag. Key matching accepts both the
//! canonical camelCase and PascalCase spellings, and a leading UTF-8 BOM is
//! ignored since the SDK on some platforms writes one.

use std::path::Path;

use serde::Deserialize;

use crate::core::dependency::{is_web_framework, NETCORE_APP};
use crate::resolver::ResolveError;

/// A shared framework reference (`runtimeOptions.framework`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FrameworkReference {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Version")]
    pub version: String,
}

/// The resolution-relevant view of a runtime config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Primary framework; `None` for self-contained apps.
    pub framework: Option<FrameworkReference>,
    /// Whether a higher patch release may be substituted.
    pub apply_patches: bool,
}

#[derive(Debug, Deserialize)]
struct RawRuntimeConfig {
    #[serde(rename = "runtimeOptions", alias = "RuntimeOptions", default)]
    runtime_options: RawRuntimeOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRuntimeOptions {
    #[serde(alias = "Framework")]
    framework: Option<FrameworkReference>,
    #[serde(alias = "Frameworks")]
    frameworks: Vec<FrameworkReference>,
    #[serde(rename = "applyPatches", alias = "ApplyPatches")]
    apply_patches: Option<bool>,
}

impl RuntimeConfig {
    /// Parse runtime config JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let raw: RawRuntimeConfig = serde_json::from_str(text)?;
        let options = raw.runtime_options;

        let framework = options
            .framework
            .or_else(|| primary_framework(options.frameworks));

        Ok(RuntimeConfig {
            framework,
            // The host rolls forward on patch unless told otherwise.
            apply_patches: options.apply_patches.unwrap_or(true),
        })
    }

    /// Read and parse a runtime config file.
    pub fn load(path: &Path) -> Result<Self, ResolveError> {
        let text = std::fs::read_to_string(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&text).map_err(|e| ResolveError::RuntimeConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Name of the primary framework, if any.
    pub fn framework_name(&self) -> Option<&str> {
        self.framework.as_ref().map(|f| f.name.as_str())
    }

    /// Version of the primary framework, if any.
    pub fn framework_version(&self) -> Option<&str> {
        self.framework.as_ref().map(|f| f.version.as_str())
    }
}

/// Pick the framework that determines resolution from a `frameworks` array.
fn primary_framework(mut frameworks: Vec<FrameworkReference>) -> Option<FrameworkReference> {
    if let Some(pos) = frameworks.iter().position(|f| is_web_framework(&f.name)) {
        return Some(frameworks.swap_remove(pos));
    }
    if let Some(pos) = frameworks.iter().position(|f| f.name == NETCORE_APP) {
        return Some(frameworks.swap_remove(pos));
    }
    if frameworks.is_empty() {
        None
    } else {
        Some(frameworks.swap_remove(0))
    }
}
