//! Resolution error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error while classifying the project or resolving framework versions.
///
/// Every variant is fatal to the finalize run.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("could not determine deployment type of `{}`", .root.display())]
    #[diagnostic(
        code(finalize::resolve::classification),
        help("push either a published app (*.runtimeconfig.json) or a project file")
    )]
    Classification { root: PathBuf },

    #[error("could not determine `{dependency}` version from `{}`", .path.display())]
    #[diagnostic(code(finalize::resolve::pattern_not_matched))]
    PatternNotMatched {
        dependency: String,
        pattern: String,
        path: PathBuf,
    },

    #[error("unsupported framework `{name}` in application runtime config")]
    #[diagnostic(
        code(finalize::resolve::unsupported_framework),
        help("supported frameworks: Microsoft.AspNetCore.All, Microsoft.AspNetCore.App, Microsoft.NETCore.App")
    )]
    UnsupportedFramework { name: String },

    #[error("no version of `{dependency}` matches `{requested}`")]
    #[diagnostic(code(finalize::resolve::no_matching_version))]
    NoMatchingVersion {
        dependency: String,
        requested: String,
        apply_patches: bool,
        available: Vec<String>,
    },

    #[error("invalid `{dependency}` version `{version}`")]
    #[diagnostic(code(finalize::resolve::invalid_version))]
    InvalidVersion { dependency: String, version: String },

    #[error("failed to parse runtime config `{}`: {message}", .path.display())]
    #[diagnostic(code(finalize::resolve::runtime_config))]
    RuntimeConfigParse { path: PathBuf, message: String },

    #[error("no *.runtimeconfig.json found in `{}`", .root.display())]
    #[diagnostic(code(finalize::resolve::missing_runtime_config))]
    MissingRuntimeConfig { root: PathBuf },

    #[error("runtime config of {owner} does not reference a framework")]
    #[diagnostic(code(finalize::resolve::missing_framework))]
    MissingFramework { owner: String },

    #[error("no pinned web framework version in `{}`", .path.display())]
    #[diagnostic(code(finalize::resolve::pinned_version))]
    PinnedVersionNotFound { path: PathBuf },

    #[error("failed to parse dependency manifest `{}`: {message}", .path.display())]
    #[diagnostic(code(finalize::resolve::deps_manifest))]
    DepsManifestParse { path: PathBuf, message: String },

    #[error("no project file found under `{}`", .root.display())]
    #[diagnostic(code(finalize::resolve::no_project))]
    NoProjectFile { root: PathBuf },

    #[error("multiple project files found under `{}`", .root.display())]
    #[diagnostic(code(finalize::resolve::multiple_projects))]
    MultipleProjectFiles {
        root: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error("i/o error on `{}`", .path.display())]
    #[diagnostic(code(finalize::resolve::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::Classification { root } => Diagnostic::error(self.to_string())
                .with_location(root)
                .with_context("no *.runtimeconfig.json at the top level and no *.csproj, *.fsproj or *.vbproj")
                .with_suggestion("Push the output of `dotnet publish`")
                .with_suggestion("Or push the project sources including the project file"),

            ResolveError::PatternNotMatched {
                dependency,
                pattern,
                path,
            } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_context(format!("pattern `{}` did not match", pattern))
                .with_suggestion(format!(
                    "Declare the {} version explicitly in the project file",
                    dependency
                )),

            ResolveError::UnsupportedFramework { name } => {
                Diagnostic::error(self.to_string())
                    .with_context(format!("runtimeOptions.framework.name is `{}`", name))
                    .with_suggestion(
                        "Target Microsoft.NETCore.App or Microsoft.AspNetCore.App".to_string(),
                    )
            }

            ResolveError::NoMatchingVersion {
                dependency,
                requested,
                apply_patches,
                available,
            } => {
                let policy = if *apply_patches {
                    "same major.minor, equal or higher patch"
                } else {
                    "exact version"
                };
                let mut diag = Diagnostic::error(self.to_string())
                    .with_context(format!("patch policy: {}", policy));

                if available.is_empty() {
                    diag = diag.with_context(format!("no `{}` versions are available", dependency));
                } else {
                    diag = diag.with_context(format!(
                        "available versions: {}",
                        available.join(", ")
                    ));
                }

                diag.with_suggestion(format!(
                    "Target a `{}` version supported by this buildpack",
                    dependency
                ))
            }

            ResolveError::MultipleProjectFiles { candidates, .. } => {
                let mut diag = Diagnostic::error(self.to_string());
                for candidate in candidates {
                    diag = diag.with_context(candidate.display().to_string());
                }
                diag.with_suggestion(
                    "Add a .deployment file with `[config]` and `project = <path>`".to_string(),
                )
            }

            ResolveError::Io { path, source } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_context(source.to_string()),

            ResolveError::RuntimeConfigParse { path, .. }
            | ResolveError::PinnedVersionNotFound { path }
            | ResolveError::DepsManifestParse { path, .. } => {
                Diagnostic::error(self.to_string()).with_location(path)
            }

            ResolveError::MissingRuntimeConfig { root } => Diagnostic::error(self.to_string())
                .with_location(root)
                .with_suggestion("Push the full output directory of `dotnet publish`"),

            ResolveError::InvalidVersion { .. }
            | ResolveError::MissingFramework { .. }
            | ResolveError::NoProjectFile { .. } => {
                Diagnostic::error(self.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matching_version_diagnostic() {
        let err = ResolveError::NoMatchingVersion {
            dependency: "dotnet-runtime".to_string(),
            requested: "3.1.4".to_string(),
            apply_patches: false,
            available: vec!["3.1.3".to_string(), "3.1.5".to_string()],
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("no version of `dotnet-runtime` matches `3.1.4`"));
        assert!(output.contains("exact version"));
        assert!(output.contains("3.1.3, 3.1.5"));
    }

    #[test]
    fn test_pattern_not_matched_names_dependency() {
        let err = ResolveError::PatternNotMatched {
            dependency: "dotnet-aspnetcore".to_string(),
            pattern: "Version=\"(.*)\"".to_string(),
            path: PathBuf::from("/app/web.csproj"),
        };

        assert!(err.to_string().contains("dotnet-aspnetcore"));
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("--> /app/web.csproj"));
        assert!(output.contains("help: consider:"));
    }

    #[test]
    fn test_multiple_projects_lists_candidates() {
        let err = ResolveError::MultipleProjectFiles {
            root: PathBuf::from("/app"),
            candidates: vec![PathBuf::from("a/a.csproj"), PathBuf::from("b/b.csproj")],
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("a/a.csproj"));
        assert!(output.contains("b/b.csproj"));
        assert!(output.contains(".deployment"));
    }
}
