//! The application being staged.
//!
//! [`ProjectAccess`] is everything the resolution engine needs to know about
//! the application: its deployment type, the text of its main project file,
//! its parsed runtime configs, its pinned web framework, and which framework
//! versions can satisfy a request. [`Project`] answers those questions from
//! the build directory, the buildpack's dependency directory and the catalog.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::core::dependency::{shared_framework_dir, ASPNETCORE_ALL, ASPNETCORE_APP};
use crate::core::deployment::{classify, DeploymentType};
use crate::core::runtime_config::RuntimeConfig;
use crate::installer::Catalog;
use crate::resolver::version::find_matching_version;
use crate::resolver::ResolveError;
use crate::util::fs;

/// Project file extensions recognized as buildable sources.
pub const PROJECT_EXTENSIONS: &[&str] = &["csproj", "fsproj", "vbproj"];

/// Directories never searched for project files.
const SKIP_DIRS: &[&str] = &[".cloudfoundry", "node_modules", "bin", "obj"];

static ASSEMBLY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<AssemblyName>\s*([^<\s]+)\s*</AssemblyName>")
        .expect("static assembly name pattern")
});

/// What the resolution engine may ask about the application.
pub trait ProjectAccess {
    /// How the application was pushed. Classified once per finalize run.
    fn deployment_type(&self) -> Result<DeploymentType, ResolveError>;

    /// The project file to build.
    fn main_path(&self) -> Result<PathBuf, ResolveError>;

    /// Raw text of a project file.
    fn read_project_file(&self, path: &Path) -> Result<String, ResolveError>;

    /// The application's own published runtime config.
    fn runtime_config(&self) -> Result<RuntimeConfig, ResolveError>;

    /// The runtime config shipped inside an installed web framework.
    fn shared_framework_config(&self, aspnetcore_version: &str)
        -> Result<RuntimeConfig, ResolveError>;

    /// Best installed or catalog version of `dependency` for `requested`.
    fn find_matching_framework_version(
        &self,
        dependency: &str,
        requested: &str,
        apply_patches: bool,
    ) -> Result<String, ResolveError>;

    /// Web framework version pinned in the application's `*.deps.json`.
    fn pinned_aspnetcore_version(&self) -> Result<String, ResolveError>;
}

/// A project on disk.
#[derive(Debug)]
pub struct Project {
    build_dir: PathBuf,
    dep_dir: PathBuf,
    catalog: Catalog,
    stack: Option<String>,
    deployment: OnceCell<DeploymentType>,
}

impl Project {
    pub fn new(
        build_dir: impl Into<PathBuf>,
        dep_dir: impl Into<PathBuf>,
        catalog: Catalog,
        stack: Option<String>,
    ) -> Self {
        Project {
            build_dir: build_dir.into(),
            dep_dir: dep_dir.into(),
            catalog,
            stack,
            deployment: OnceCell::new(),
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn dep_dir(&self) -> &Path {
        &self.dep_dir
    }

    /// First top-level `*.runtimeconfig.json`, if any.
    pub fn runtime_config_file(&self) -> Result<Option<PathBuf>, ResolveError> {
        Ok(self.top_level("*.runtimeconfig.json")?.into_iter().next())
    }

    /// Whether the app was pushed already published.
    pub fn is_published(&self) -> Result<bool, ResolveError> {
        Ok(self.runtime_config_file()?.is_some())
    }

    /// All project files under the build directory, sorted.
    pub fn project_files(&self) -> Vec<PathBuf> {
        fs::find_files_with_extensions(&self.build_dir, PROJECT_EXTENSIONS, SKIP_DIRS)
    }

    /// The command that launches the app, as a path.
    ///
    /// Published apps launch from the build directory; source apps from the
    /// publish output. A native host wins over the `.dll`.
    pub fn start_command(&self) -> Result<PathBuf, ResolveError> {
        let (dir, name) = if self.deployment_type()?.is_published() {
            let config = self
                .runtime_config_file()?
                .ok_or_else(|| ResolveError::MissingRuntimeConfig {
                    root: self.build_dir.clone(),
                })?;
            (self.build_dir.clone(), runtime_config_stem(&config))
        } else {
            let main = self.main_path()?;
            let text = self.read_project_file(&main)?;
            let name = ASSEMBLY_NAME
                .captures(&text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| file_stem(&main));
            (self.dep_dir.join("dotnet_publish"), name)
        };

        let native = dir.join(&name);
        if native.is_file() {
            Ok(native)
        } else {
            Ok(dir.join(format!("{}.dll", name)))
        }
    }

    /// Versions of `dependency` already unpacked under `dotnet-sdk/shared/`.
    pub fn installed_versions(&self, dependency: &str) -> Result<Vec<String>, ResolveError> {
        let Some(framework) = shared_framework_dir(dependency) else {
            return Ok(Vec::new());
        };
        let dir = self.dep_dir.join("dotnet-sdk").join("shared").join(framework);

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(ResolveError::Io { path: dir, source }),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ResolveError::Io {
                path: dir.clone(),
                source,
            })?;
            if entry.path().is_dir() {
                versions.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        versions.sort();
        Ok(versions)
    }

    fn top_level(&self, pattern: &str) -> Result<Vec<PathBuf>, ResolveError> {
        fs::glob_top_level(&self.build_dir, pattern).map_err(|e| ResolveError::Io {
            path: self.build_dir.clone(),
            source: std::io::Error::other(format!("{:#}", e)),
        })
    }

    /// Explicit project from `.deployment` (`[config]` / `project = <path>`).
    fn deployment_file_project(&self) -> Result<Option<PathBuf>, ResolveError> {
        let path = self.build_dir.join(".deployment");
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path).map_err(|source| ResolveError::Io {
            path: path.clone(),
            source,
        })?;

        let mut in_config = false;
        for line in text.lines().map(str::trim) {
            if line.starts_with('[') {
                in_config = line.eq_ignore_ascii_case("[config]");
                continue;
            }
            if !in_config {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                if key.trim() == "project" {
                    let value = value.trim().trim_matches('"');
                    return Ok(Some(self.build_dir.join(value)));
                }
            }
        }
        Ok(None)
    }
}

impl ProjectAccess for Project {
    fn deployment_type(&self) -> Result<DeploymentType, ResolveError> {
        if let Some(kind) = self.deployment.get() {
            return Ok(*kind);
        }

        let published = match self.runtime_config_file()? {
            Some(path) => Some(RuntimeConfig::load(&path)?),
            None => None,
        };
        let project_files = if published.is_some() {
            Vec::new()
        } else {
            self.project_files()
        };

        let kind = classify(&self.build_dir, published.as_ref(), &project_files)?;
        tracing::debug!("deployment type of {}: {}", self.build_dir.display(), kind);
        Ok(*self.deployment.get_or_init(|| kind))
    }

    fn main_path(&self) -> Result<PathBuf, ResolveError> {
        if let Some(path) = self.deployment_file_project()? {
            return Ok(path);
        }

        let mut files = self.project_files();
        match files.len() {
            0 => Err(ResolveError::NoProjectFile {
                root: self.build_dir.clone(),
            }),
            1 => Ok(files.remove(0)),
            _ => Err(ResolveError::MultipleProjectFiles {
                root: self.build_dir.clone(),
                candidates: files
                    .iter()
                    .map(|f| fs::relative_path(&self.build_dir, f))
                    .collect(),
            }),
        }
    }

    fn read_project_file(&self, path: &Path) -> Result<String, ResolveError> {
        std::fs::read_to_string(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn runtime_config(&self) -> Result<RuntimeConfig, ResolveError> {
        let path = self
            .runtime_config_file()?
            .ok_or_else(|| ResolveError::MissingRuntimeConfig {
                root: self.build_dir.clone(),
            })?;
        RuntimeConfig::load(&path)
    }

    fn shared_framework_config(
        &self,
        aspnetcore_version: &str,
    ) -> Result<RuntimeConfig, ResolveError> {
        let path = self
            .dep_dir
            .join("dotnet-sdk")
            .join("shared")
            .join(ASPNETCORE_APP)
            .join(aspnetcore_version)
            .join(format!("{}.runtimeconfig.json", ASPNETCORE_APP));
        RuntimeConfig::load(&path)
    }

    fn find_matching_framework_version(
        &self,
        dependency: &str,
        requested: &str,
        apply_patches: bool,
    ) -> Result<String, ResolveError> {
        let mut available = self.catalog.versions(dependency, self.stack.as_deref());
        for version in self.installed_versions(dependency)? {
            if !available.contains(&version) {
                available.push(version);
            }
        }
        find_matching_version(dependency, requested, &available, apply_patches)
    }

    fn pinned_aspnetcore_version(&self) -> Result<String, ResolveError> {
        let path = self
            .top_level("*.deps.json")?
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::PinnedVersionNotFound {
                path: self.build_dir.clone(),
            })?;

        let text = std::fs::read_to_string(&path).map_err(|source| ResolveError::Io {
            path: path.clone(),
            source,
        })?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
        let manifest: Value =
            serde_json::from_str(text).map_err(|e| ResolveError::DepsManifestParse {
                path: path.clone(),
                message: e.to_string(),
            })?;

        pinned_web_framework(&manifest).ok_or(ResolveError::PinnedVersionNotFound { path })
    }
}

/// Find `Microsoft.AspNetCore.App/<v>` (else `.All/<v>`) among library keys,
/// looking at `libraries` before each target.
fn pinned_web_framework(manifest: &Value) -> Option<String> {
    let mut sections: Vec<&serde_json::Map<String, Value>> = Vec::new();
    if let Some(libraries) = manifest.get("libraries").and_then(Value::as_object) {
        sections.push(libraries);
    }
    if let Some(targets) = manifest.get("targets").and_then(Value::as_object) {
        sections.extend(targets.values().filter_map(Value::as_object));
    }

    for framework in [ASPNETCORE_APP, ASPNETCORE_ALL] {
        let prefix = format!("{}/", framework);
        for section in &sections {
            let found = section
                .keys()
                .find_map(|key| key.strip_prefix(&prefix))
                .filter(|v| !v.is_empty());
            if let Some(version) = found {
                return Some(version.to_string());
            }
        }
    }
    None
}

fn runtime_config_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.trim_end_matches(".runtimeconfig.json").to_string()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
