//! Test utilities and mocks for unit tests.
//!
//! The resolution engine and the finalize pipeline only talk to the
//! [`ProjectAccess`], [`Installer`] and [`CommandRunner`] traits, so tests
//! can script a project, record install calls and record build commands
//! without touching the SDK or the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::test_support::{fixtures, MockInstaller, MockProject};
//!
//! let project = MockProject::fdd()
//!     .with_runtime_config(fixtures::runtime_config("Microsoft.NETCore.App", "3.1.0", true))
//!     .with_catalog("dotnet-runtime", &["3.1.0", "3.1.5"])
//!     .with_pinned_aspnetcore("3.1.2");
//! let installer = MockInstaller::new();
//! ```

pub mod fixtures;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::dependency::DependencySpec;
use crate::core::deployment::DeploymentType;
use crate::core::project::ProjectAccess;
use crate::core::runtime_config::{FrameworkReference, RuntimeConfig};
use crate::installer::{InstallError, Installer};
use crate::resolver::version::find_matching_version;
use crate::resolver::ResolveError;
use crate::util::process::{CommandRunner, ProcessBuilder};

const MOCK_ROOT: &str = "/app";

#[derive(Debug, Clone)]
enum ConfigState {
    Missing,
    Malformed(String),
    Parsed(RuntimeConfig),
}

/// A scriptable [`ProjectAccess`] that records version lookups.
#[derive(Debug)]
pub struct MockProject {
    deployment: Option<DeploymentType>,
    runtime_config: ConfigState,
    project_text: Option<String>,
    catalog: HashMap<String, Vec<String>>,
    shared_configs: HashMap<String, RuntimeConfig>,
    pinned_aspnetcore: Option<String>,
    lookups: RefCell<Vec<(String, String, bool)>>,
    classifications: Cell<usize>,
}

impl MockProject {
    fn new(deployment: Option<DeploymentType>) -> Self {
        MockProject {
            deployment,
            runtime_config: ConfigState::Missing,
            project_text: None,
            catalog: HashMap::new(),
            shared_configs: HashMap::new(),
            pinned_aspnetcore: None,
            lookups: RefCell::new(Vec::new()),
            classifications: Cell::new(0),
        }
    }

    /// A published, framework-dependent app.
    pub fn fdd() -> Self {
        MockProject::new(Some(DeploymentType::Fdd))
    }

    /// A source app whose main project file holds `text`.
    pub fn source(text: &str) -> Self {
        let mut project = MockProject::new(Some(DeploymentType::Source));
        project.project_text = Some(text.to_string());
        project
    }

    /// A project whose shape matches nothing.
    pub fn unclassifiable() -> Self {
        MockProject::new(None)
    }

    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = ConfigState::Parsed(config);
        self
    }

    pub fn with_malformed_runtime_config(mut self, message: &str) -> Self {
        self.runtime_config = ConfigState::Malformed(message.to_string());
        self
    }

    pub fn with_catalog(mut self, dependency: &str, versions: &[&str]) -> Self {
        self.catalog
            .entry(dependency.to_string())
            .or_default()
            .extend(versions.iter().map(|v| v.to_string()));
        self
    }

    /// Make the web framework `version` ship a runtime config referencing
    /// `framework` at `framework_version`.
    pub fn with_shared_config(
        mut self,
        version: &str,
        framework: &str,
        framework_version: &str,
    ) -> Self {
        self.shared_configs.insert(
            version.to_string(),
            RuntimeConfig {
                framework: Some(FrameworkReference {
                    name: framework.to_string(),
                    version: framework_version.to_string(),
                }),
                apply_patches: true,
            },
        );
        self
    }

    pub fn with_pinned_aspnetcore(mut self, version: &str) -> Self {
        self.pinned_aspnetcore = Some(version.to_string());
        self
    }

    /// Every `(dependency, requested, apply_patches)` lookup so far.
    pub fn lookups(&self) -> Vec<(String, String, bool)> {
        self.lookups.borrow().clone()
    }

    /// How many times the deployment type was asked for.
    pub fn classifications(&self) -> usize {
        self.classifications.get()
    }

    fn main_file(&self) -> PathBuf {
        Path::new(MOCK_ROOT).join("app.csproj")
    }
}

impl ProjectAccess for MockProject {
    fn deployment_type(&self) -> Result<DeploymentType, ResolveError> {
        self.classifications.set(self.classifications.get() + 1);
        self.deployment.ok_or_else(|| ResolveError::Classification {
            root: PathBuf::from(MOCK_ROOT),
        })
    }

    fn main_path(&self) -> Result<PathBuf, ResolveError> {
        match self.project_text {
            Some(_) => Ok(self.main_file()),
            None => Err(ResolveError::NoProjectFile {
                root: PathBuf::from(MOCK_ROOT),
            }),
        }
    }

    fn read_project_file(&self, path: &Path) -> Result<String, ResolveError> {
        match &self.project_text {
            Some(text) if path == self.main_file() => Ok(text.clone()),
            _ => Err(ResolveError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }

    fn runtime_config(&self) -> Result<RuntimeConfig, ResolveError> {
        match &self.runtime_config {
            ConfigState::Parsed(config) => Ok(config.clone()),
            ConfigState::Malformed(message) => Err(ResolveError::RuntimeConfigParse {
                path: Path::new(MOCK_ROOT).join("app.runtimeconfig.json"),
                message: message.clone(),
            }),
            ConfigState::Missing => Err(ResolveError::MissingRuntimeConfig {
                root: PathBuf::from(MOCK_ROOT),
            }),
        }
    }

    fn shared_framework_config(
        &self,
        aspnetcore_version: &str,
    ) -> Result<RuntimeConfig, ResolveError> {
        self.shared_configs
            .get(aspnetcore_version)
            .cloned()
            .ok_or_else(|| ResolveError::Io {
                path: PathBuf::from(format!(
                    "/deps/0/dotnet-sdk/shared/Microsoft.AspNetCore.App/{}",
                    aspnetcore_version
                )),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }

    fn find_matching_framework_version(
        &self,
        dependency: &str,
        requested: &str,
        apply_patches: bool,
    ) -> Result<String, ResolveError> {
        self.lookups.borrow_mut().push((
            dependency.to_string(),
            requested.to_string(),
            apply_patches,
        ));
        let available = self.catalog.get(dependency).cloned().unwrap_or_default();
        find_matching_version(dependency, requested, &available, apply_patches)
    }

    fn pinned_aspnetcore_version(&self) -> Result<String, ResolveError> {
        self.pinned_aspnetcore
            .clone()
            .ok_or_else(|| ResolveError::PinnedVersionNotFound {
                path: PathBuf::from(MOCK_ROOT),
            })
    }
}

/// Records install calls; can be told to fail for one dependency.
#[derive(Debug, Default)]
pub struct MockInstaller {
    calls: RefCell<Vec<(DependencySpec, PathBuf)>>,
    fail_on: Option<String>,
}

impl MockInstaller {
    pub fn new() -> Self {
        MockInstaller::default()
    }

    /// Fail every install of `dependency`.
    pub fn failing_on(dependency: &str) -> Self {
        MockInstaller {
            calls: RefCell::new(Vec::new()),
            fail_on: Some(dependency.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<(DependencySpec, PathBuf)> {
        self.calls.borrow().clone()
    }

    /// Installed specs in call order.
    pub fn specs(&self) -> Vec<DependencySpec> {
        self.calls.borrow().iter().map(|(s, _)| s.clone()).collect()
    }
}

impl Installer for MockInstaller {
    fn install_dependency(
        &self,
        spec: &DependencySpec,
        target_dir: &Path,
    ) -> Result<(), InstallError> {
        self.calls
            .borrow_mut()
            .push((spec.clone(), target_dir.to_path_buf()));

        if self.fail_on.as_deref() == Some(spec.name.as_str()) {
            return Err(InstallError::Download {
                uri: format!("https://buildpacks.example.com/{}", spec.name),
                message: "HTTP 503 Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

/// Pattern for matching commands in [`MockExecutor`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Any => true,
        }
    }
}

/// Records commands instead of running them.
#[derive(Debug, Default)]
pub struct MockExecutor {
    commands: RefCell<Vec<ProcessBuilder>>,
    failures: Vec<(CommandPattern, i32)>,
}

impl MockExecutor {
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Make matching commands exit with `status`.
    pub fn fail_when(mut self, pattern: CommandPattern, status: i32) -> Self {
        self.failures.push((pattern, status));
        self
    }

    /// Display strings of every command run so far.
    pub fn calls(&self) -> Vec<String> {
        self.commands
            .borrow()
            .iter()
            .map(ProcessBuilder::display_command)
            .collect()
    }

    /// Every command run so far.
    pub fn commands(&self) -> Vec<ProcessBuilder> {
        self.commands.borrow().clone()
    }
}

impl CommandRunner for MockExecutor {
    fn run(&self, cmd: &ProcessBuilder) -> Result<()> {
        self.commands.borrow_mut().push(cmd.clone());

        let full = cmd.display_command();
        for (pattern, status) in &self.failures {
            if pattern.matches(&full) {
                bail!("`{}` failed with exit code Some({})", full, status);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_records_and_fails() {
        let exec = MockExecutor::new()
            .fail_when(CommandPattern::StartsWith("dotnet publish".to_string()), 1);

        exec.run(&ProcessBuilder::new("dotnet").args(["restore", "a.csproj"]))
            .unwrap();
        let err = exec
            .run(&ProcessBuilder::new("dotnet").args(["publish", "a.csproj"]))
            .unwrap_err();

        assert!(err.to_string().contains("exit code Some(1)"));
        assert_eq!(
            exec.calls(),
            vec!["dotnet restore a.csproj", "dotnet publish a.csproj"]
        );
    }

    #[test]
    fn test_mock_installer_failure() {
        let installer = MockInstaller::failing_on("dotnet-runtime");
        installer
            .install_dependency(&DependencySpec::new("dotnet-aspnetcore", "3.1.0"), Path::new("/d"))
            .unwrap();
        assert!(installer
            .install_dependency(&DependencySpec::new("dotnet-runtime", "3.1.0"), Path::new("/d"))
            .is_err());
        assert_eq!(installer.calls().len(), 2);
    }

    #[test]
    fn test_mock_project_records_lookups() {
        let project = MockProject::fdd().with_catalog("dotnet-runtime", &["3.1.0"]);
        project
            .find_matching_framework_version("dotnet-runtime", "3.1.0", false)
            .unwrap();
        assert_eq!(
            project.lookups(),
            vec![("dotnet-runtime".to_string(), "3.1.0".to_string(), false)]
        );
    }
}
