//! Launch configuration: the profile.d script and the release file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::stager::Stager;
use crate::util::fs;

/// Sourced at container start so the app listens on the platform port.
pub const STARTUP_SCRIPT: &str = "export ASPNETCORE_URLS=http://0.0.0.0:${PORT}\n";

/// Release file read by the release step, relative to the build directory.
pub const RELEASE_FILE: &str = "tmp/dotnet-core-buildpack-release-step.yml";

/// The release file document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub default_process_types: BTreeMap<String, String>,
}

/// `cd <dir> && <launcher> --server.urls http://0.0.0.0:${PORT}`
pub fn web_command(start_command: &Path) -> String {
    let dir = start_command
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".to_string());
    let name = start_command
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let launcher = if name.ends_with(".dll") {
        format!("dotnet ./{}", name)
    } else {
        format!("./{}", name)
    };
    format!("cd {} && {} --server.urls http://0.0.0.0:${{PORT}}", dir, launcher)
}

pub fn release_for(start_command: &Path) -> Release {
    let mut default_process_types = BTreeMap::new();
    default_process_types.insert("web".to_string(), web_command(start_command));
    Release {
        default_process_types,
    }
}

pub fn write_profile_d(stager: &Stager) -> Result<PathBuf> {
    stager.write_profile_d("startup.sh", STARTUP_SCRIPT)
}

/// Write the release file under `build_dir`.
pub fn write_release(build_dir: &Path, start_command: &Path) -> Result<PathBuf> {
    let path = build_dir.join(RELEASE_FILE);
    let yaml = serde_yaml::to_string(&release_for(start_command))
        .context("failed to serialize release file")?;
    fs::write_string(&path, &yaml)?;
    Ok(path)
}
