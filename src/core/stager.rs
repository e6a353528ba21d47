//! Staging directory layout.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::fs;

/// Directories handed to the finalize stage by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stager {
    build_dir: PathBuf,
    cache_dir: PathBuf,
    deps_dir: PathBuf,
    deps_idx: String,
}

impl Stager {
    pub fn new(
        build_dir: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
        deps_dir: impl Into<PathBuf>,
        deps_idx: impl Into<String>,
    ) -> Self {
        Stager {
            build_dir: build_dir.into(),
            cache_dir: cache_dir.into(),
            deps_dir: deps_dir.into(),
            deps_idx: deps_idx.into(),
        }
    }

    /// The application directory.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn deps_dir(&self) -> &Path {
        &self.deps_dir
    }

    pub fn deps_idx(&self) -> &str {
        &self.deps_idx
    }

    /// This buildpack's own dependency directory: `<deps_dir>/<deps_idx>`.
    pub fn dep_dir(&self) -> PathBuf {
        self.deps_dir.join(&self.deps_idx)
    }

    /// Where shared frameworks are installed.
    pub fn dotnet_sdk_dir(&self) -> PathBuf {
        self.dep_dir().join("dotnet-sdk")
    }

    /// Write a script sourced at container start.
    pub fn write_profile_d(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dep_dir().join("profile.d").join(name);
        fs::write_string(&path, contents)?;
        Ok(path)
    }
}
