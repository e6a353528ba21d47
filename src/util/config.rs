//! Finalize configuration.
//!
//! Settings are layered, lowest precedence first:
//! 1. Defaults
//! 2. An optional TOML file (`--config`)
//! 3. Environment (`INSTALL_NODE`, `PUBLISH_RELEASE_CONFIG`, `CF_STACK`)
//! 4. Files pushed with the app (`buildpack.yml`, then `global.json`), which
//!    only carry the SDK version

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Finalize configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keep the node install in the droplet
    pub install_node: bool,

    /// Publish with `-c Release` instead of `-c Debug`
    pub publish_release_config: bool,

    /// Platform stack name (e.g. cflinuxfs3)
    pub stack: Option<String>,

    /// SDK version line requested by the app (e.g. 2.1.x)
    pub dotnet_sdk_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BuildpackYml {
    #[serde(rename = "dotnet-core", default)]
    dotnet_core: BuildpackYmlDotnet,
}

#[derive(Debug, Default, Deserialize)]
struct BuildpackYmlDotnet {
    sdk: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GlobalJson {
    sdk: Option<GlobalJsonSdk>,
}

#[derive(Debug, Default, Deserialize)]
struct GlobalJsonSdk {
    version: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("INSTALL_NODE") {
            self.install_node = value == "true";
        }
        if let Some(value) = lookup("PUBLISH_RELEASE_CONFIG") {
            self.publish_release_config = value == "true";
        }
        if let Some(stack) = lookup("CF_STACK").filter(|s| !s.is_empty()) {
            self.stack = Some(stack);
        }
    }

    /// Pick up the SDK version from files pushed with the app.
    pub fn apply_app_files(&mut self, build_dir: &Path) -> Result<()> {
        let buildpack_yml = build_dir.join("buildpack.yml");
        if buildpack_yml.is_file() {
            let contents = std::fs::read_to_string(&buildpack_yml)
                .with_context(|| format!("failed to read {}", buildpack_yml.display()))?;
            let parsed: BuildpackYml = serde_yaml::from_str(&contents)
                .with_context(|| format!("failed to parse {}", buildpack_yml.display()))?;
            if let Some(sdk) = parsed.dotnet_core.sdk {
                self.dotnet_sdk_version = Some(sdk);
                return Ok(());
            }
        }

        let global_json = build_dir.join("global.json");
        if global_json.is_file() {
            let contents = std::fs::read_to_string(&global_json)
                .with_context(|| format!("failed to read {}", global_json.display()))?;
            let parsed: GlobalJson = serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse {}", global_json.display()))?;
            if let Some(version) = parsed.sdk.and_then(|s| s.version) {
                self.dotnet_sdk_version = Some(version);
            }
        }

        Ok(())
    }

    /// Build the effective configuration for a run.
    pub fn resolve<F>(file: Option<&Path>, build_dir: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match file {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        config.apply_env(lookup);
        config.apply_app_files(build_dir)?;
        tracing::debug!("effective config: {:?}", config);
        Ok(config)
    }

    /// `-c` value for `dotnet publish`.
    pub fn publish_configuration(&self) -> &'static str {
        if self.publish_release_config {
            "Release"
        } else {
            "Debug"
        }
    }

    /// Runtime identifier passed to `dotnet publish -r`.
    ///
    /// Only 2.x SDKs need one; later SDKs publish portable apps.
    pub fn runtime_identifier(&self) -> Option<&'static str> {
        let sdk = self.dotnet_sdk_version.as_deref()?;
        if !sdk.starts_with("2.") {
            return None;
        }
        stack_runtime_identifier(self.stack.as_deref()?)
    }
}

/// Map a platform stack to the .NET runtime identifier of its base OS.
pub fn stack_runtime_identifier(stack: &str) -> Option<&'static str> {
    match stack {
        "cflinuxfs2" => Some("ubuntu.14.04-x64"),
        "cflinuxfs3" | "cflinuxfs3m" => Some("ubuntu.18.04-x64"),
        _ => None,
    }
}
