//! Fixture builders for runtime configs, project files, deps manifests,
//! catalogs and archives.

use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::core::runtime_config::{FrameworkReference, RuntimeConfig};

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// An in-memory runtime config.
pub fn runtime_config(framework: &str, version: &str, apply_patches: bool) -> RuntimeConfig {
    RuntimeConfig {
        framework: Some(FrameworkReference {
            name: framework.to_string(),
            version: version.to_string(),
        }),
        apply_patches,
    }
}

/// `*.runtimeconfig.json` text. `apply_patches: None` omits the key.
pub fn runtime_config_json(framework: &str, version: &str, apply_patches: Option<bool>) -> String {
    let patches = match apply_patches {
        Some(value) => format!(",\n    \"applyPatches\": {}", value),
        None => String::new(),
    };
    format!(
        r#"{{
  "runtimeOptions": {{
    "tfm": "netcoreapp{major_minor}",
    "framework": {{
      "name": "{framework}",
      "version": "{version}"
    }}{patches}
  }}
}}
"#,
        major_minor = version.rsplit_once('.').map(|(mm, _)| mm).unwrap_or(version),
        framework = framework,
        version = version,
        patches = patches,
    )
}

/// Write `<dir>/<stem>.runtimeconfig.json`.
pub fn write_runtime_config(
    dir: &Path,
    stem: &str,
    framework: &str,
    version: &str,
    apply_patches: Option<bool>,
) -> PathBuf {
    let path = dir.join(format!("{}.runtimeconfig.json", stem));
    write_file(&path, &runtime_config_json(framework, version, apply_patches));
    path
}

/// A project file declaring the given runtime and web framework versions.
pub fn csproj(runtime: Option<&str>, aspnetcore_all: Option<&str>) -> String {
    let runtime = runtime
        .map(|v| format!("    <RuntimeFrameworkVersion>{}</RuntimeFrameworkVersion>\n", v))
        .unwrap_or_default();
    let reference = aspnetcore_all
        .map(|v| {
            format!(
                "    <PackageReference Include=\"Microsoft.AspNetCore.All\" Version=\"{}\" />\n",
                v
            )
        })
        .unwrap_or_default();

    format!(
        "<Project Sdk=\"Microsoft.NET.Sdk.Web\">\n  <PropertyGroup>\n    <TargetFramework>netcoreapp2.1</TargetFramework>\n{}  </PropertyGroup>\n  <ItemGroup>\n{}  </ItemGroup>\n</Project>\n",
        runtime, reference
    )
}

/// A `*.deps.json` that pins `framework` at `version`.
pub fn deps_json(framework: &str, version: &str) -> String {
    format!(
        r#"{{
  "runtimeTarget": {{ "name": ".NETCoreApp,Version=v3.1" }},
  "targets": {{
    ".NETCoreApp,Version=v3.1": {{
      "web/1.0.0": {{ "dependencies": {{ "{framework}": "{version}" }} }},
      "{framework}/{version}": {{}}
    }}
  }},
  "libraries": {{
    "web/1.0.0": {{ "type": "project", "serviceable": false, "sha512": "" }},
    "{framework}/{version}": {{ "type": "package", "serviceable": true }}
  }}
}}
"#,
        framework = framework,
        version = version,
    )
}

/// A buildpack manifest listing `(name, version)` dependencies for cflinuxfs3.
pub fn catalog_yaml(entries: &[(&str, &str)]) -> String {
    let mut yaml = String::from("language: dotnet-core\ndependencies:\n");
    for (name, version) in entries {
        yaml.push_str(&format!(
            "  - name: {name}\n    version: {version}\n    uri: https://buildpacks.example.com/{name}/{name}.{version}.tar.gz\n    sha256: 0000\n    cf_stacks: [cflinuxfs3]\n",
            name = name,
            version = version,
        ));
    }
    yaml
}

/// A gzipped tarball holding `(path, contents)` regular files.
pub fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
    let mut data = Vec::new();
    {
        let encoder = GzEncoder::new(&mut data, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (path, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_path(path).unwrap();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append(&header, contents.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_config_json_parses() {
        let cfg = RuntimeConfig::from_json(&runtime_config_json(
            "Microsoft.NETCore.App",
            "3.1.0",
            Some(false),
        ))
        .unwrap();
        assert_eq!(cfg, runtime_config("Microsoft.NETCore.App", "3.1.0", false));
    }

    #[test]
    fn test_deps_json_is_valid() {
        let value: serde_json::Value =
            serde_json::from_str(&deps_json("Microsoft.AspNetCore.App", "3.1.3")).unwrap();
        assert!(value["libraries"]["Microsoft.AspNetCore.App/3.1.3"].is_object());
    }
}
