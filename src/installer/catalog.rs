//! The buildpack dependency catalog (`manifest.yml`).

use std::path::Path;

use serde::Deserialize;

use crate::installer::InstallError;

/// One installable artifact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub version: String,
    pub uri: String,
    pub sha256: String,
    /// Stacks the artifact was built for; empty means any.
    #[serde(default)]
    pub cf_stacks: Vec<String>,
}

impl CatalogEntry {
    fn supports(&self, stack: Option<&str>) -> bool {
        match stack {
            Some(stack) if !self.cf_stacks.is_empty() => self.cf_stacks.iter().any(|s| s == stack),
            _ => true,
        }
    }

    /// File name of the artifact, taken from the last URI segment.
    pub fn file_name(&self) -> &str {
        self.uri
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.name)
    }
}

/// All dependencies the buildpack can install.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub dependencies: Vec<CatalogEntry>,
}

impl Catalog {
    /// Parse a manifest document. Keys other than `dependencies` are ignored.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Catalog::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, InstallError> {
        let text = std::fs::read_to_string(path).map_err(|e| InstallError::io(path, e))?;
        Self::from_yaml(&text).map_err(|e| InstallError::Catalog {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Versions of `name` available for `stack`, in catalog order.
    pub fn versions(&self, name: &str, stack: Option<&str>) -> Vec<String> {
        self.dependencies
            .iter()
            .filter(|d| d.name == name && d.supports(stack))
            .map(|d| d.version.clone())
            .collect()
    }

    /// The entry for an exact `(name, version)` on `stack`.
    pub fn find(&self, name: &str, version: &str, stack: Option<&str>) -> Option<&CatalogEntry> {
        self.dependencies
            .iter()
            .find(|d| d.name == name && d.version == version && d.supports(stack))
    }
}
