//! Catalog-backed installer: fetch, verify, cache and unpack.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use tar::Archive;
use url::Url;

use crate::core::dependency::{shared_framework_dir, DependencySpec};
use crate::installer::{Catalog, CatalogEntry, InstallError, Installer};

/// Installs dependencies listed in the buildpack catalog.
///
/// Archives are cached under `<cache_dir>/dependencies/<sha256>/` so later
/// builds on the same cell skip the download.
#[derive(Debug)]
pub struct CatalogInstaller {
    catalog: Catalog,
    cache_dir: PathBuf,
    stack: Option<String>,
}

impl CatalogInstaller {
    pub fn new(catalog: Catalog, cache_dir: impl Into<PathBuf>, stack: Option<String>) -> Self {
        CatalogInstaller {
            catalog,
            cache_dir: cache_dir.into(),
            stack,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn cached_archive_path(&self, entry: &CatalogEntry) -> PathBuf {
        self.cache_dir
            .join("dependencies")
            .join(&entry.sha256)
            .join(entry.file_name())
    }

    /// Return the archive bytes, from the cache when it holds a verified copy.
    fn fetch(&self, entry: &CatalogEntry) -> Result<(PathBuf, Vec<u8>), InstallError> {
        let cached = self.cached_archive_path(entry);
        if cached.is_file() {
            let data = std::fs::read(&cached).map_err(|e| InstallError::io(&cached, e))?;
            if sha256_hex(&data) == entry.sha256 {
                tracing::debug!("using cached {}", cached.display());
                return Ok((cached, data));
            }
            tracing::warn!("cached archive {} is corrupt; refetching", cached.display());
        }

        let data = download(&entry.uri)?;
        let actual = sha256_hex(&data);
        if actual != entry.sha256 {
            return Err(InstallError::ChecksumMismatch {
                uri: entry.uri.clone(),
                expected: entry.sha256.clone(),
                actual,
            });
        }

        store(&cached, &data)?;
        Ok((cached, data))
    }
}

impl Installer for CatalogInstaller {
    fn install_dependency(
        &self,
        spec: &DependencySpec,
        target_dir: &Path,
    ) -> Result<(), InstallError> {
        if let Some(existing) = installed_path(spec, target_dir) {
            tracing::debug!("{} already present at {}", spec, existing.display());
            return Ok(());
        }

        let entry = self
            .catalog
            .find(&spec.name, &spec.version, self.stack.as_deref())
            .ok_or_else(|| InstallError::UnknownDependency {
                spec: spec.clone(),
                stack: self.stack.clone(),
            })?;

        tracing::debug!("installing {} into {}", spec, target_dir.display());
        let (archive, data) = self.fetch(entry)?;
        extract_tar_gz(&data, target_dir).map_err(|message| InstallError::Extract {
            archive,
            message,
        })
    }
}

/// The unpacked `shared/<framework>/<version>` directory of `spec`, if present.
fn installed_path(spec: &DependencySpec, target_dir: &Path) -> Option<PathBuf> {
    let framework = shared_framework_dir(&spec.name)?;
    let path = target_dir.join("shared").join(framework).join(&spec.version);
    path.is_dir().then_some(path)
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn download(uri: &str) -> Result<Vec<u8>, InstallError> {
    let failed = |message: String| InstallError::Download {
        uri: uri.to_string(),
        message,
    };

    let url = Url::parse(uri).map_err(|e| failed(e.to_string()))?;
    match url.scheme() {
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|_| failed("not a local path".to_string()))?;
            std::fs::read(&path).map_err(|e| InstallError::io(&path, e))
        }
        "http" | "https" => {
            tracing::debug!("downloading {}", url);
            let response = reqwest::blocking::get(url.as_str()).map_err(|e| failed(e.to_string()))?;
            if !response.status().is_success() {
                return Err(failed(format!("HTTP {}", response.status())));
            }
            let bytes = response.bytes().map_err(|e| failed(e.to_string()))?;
            Ok(bytes.to_vec())
        }
        other => Err(failed(format!("unsupported scheme `{}`", other))),
    }
}

/// Write `data` to `path` atomically.
fn store(path: &Path, data: &[u8]) -> Result<(), InstallError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| InstallError::io(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| InstallError::io(dir, e))?;
    tmp.write_all(data).map_err(|e| InstallError::io(dir, e))?;
    tmp.persist(path).map_err(|e| InstallError::io(path, e.error))?;
    Ok(())
}

/// Unpack a gzipped tarball into `dest`, refusing entries that would land outside it.
pub fn extract_tar_gz(data: &[u8], dest: &Path) -> Result<(), String> {
    std::fs::create_dir_all(dest)
        .map_err(|e| format!("failed to create {}: {}", dest.display(), e))?;

    let mut archive = Archive::new(GzDecoder::new(Cursor::new(data)));
    archive.set_preserve_permissions(true);

    let entries = archive
        .entries()
        .map_err(|e| format!("failed to read entries: {}", e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| format!("failed to read entry: {}", e))?;
        let name = entry
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        // `unpack_in` reports false for `..` and absolute paths.
        let unpacked = entry
            .unpack_in(dest)
            .map_err(|e| format!("failed to unpack {}: {}", name, e))?;
        if !unpacked {
            return Err(format!("entry escapes destination directory: {}", name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::tar_gz;
    use tempfile::TempDir;

    fn installer_for(archive: &Path, sha256: &str, cache: &Path) -> CatalogInstaller {
        let url = Url::from_file_path(archive).unwrap();
        let catalog = Catalog {
            dependencies: vec![CatalogEntry {
                name: "dotnet-runtime".to_string(),
                version: "3.1.5".to_string(),
                uri: url.to_string(),
                sha256: sha256.to_string(),
                cf_stacks: vec!["cflinuxfs3".to_string()],
            }],
        };
        CatalogInstaller::new(catalog, cache, Some("cflinuxfs3".to_string()))
    }

    #[test]
    fn test_install_from_file_uri_and_cache() {
        let tmp = TempDir::new().unwrap();
        let data = tar_gz(&[("shared/Microsoft.NETCore.App/3.1.5/libhostpolicy.so", "elf")]);
        let archive = tmp.path().join("dotnet-runtime.3.1.5.tar.gz");
        std::fs::write(&archive, &data).unwrap();

        let cache = tmp.path().join("cache");
        let installer = installer_for(&archive, &sha256_hex(&data), &cache);
        let target = tmp.path().join("deps/0/dotnet-sdk");

        installer
            .install_dependency(&DependencySpec::new("dotnet-runtime", "3.1.5"), &target)
            .unwrap();

        assert!(target
            .join("shared/Microsoft.NETCore.App/3.1.5/libhostpolicy.so")
            .is_file());
        assert!(cache
            .join("dependencies")
            .join(sha256_hex(&data))
            .join("dotnet-runtime.3.1.5.tar.gz")
            .is_file());

        // The cached copy serves the second install even with the source gone.
        std::fs::remove_file(&archive).unwrap();
        let again = tmp.path().join("deps/1/dotnet-sdk");
        installer
            .install_dependency(&DependencySpec::new("dotnet-runtime", "3.1.5"), &again)
            .unwrap();
        assert!(again.join("shared").is_dir());
    }

    #[test]
    fn test_checksum_mismatch() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("runtime.tar.gz");
        std::fs::write(&archive, tar_gz(&[("a.txt", "a")])).unwrap();

        let installer = installer_for(&archive, "deadbeef", &tmp.path().join("cache"));
        let err = installer
            .install_dependency(
                &DependencySpec::new("dotnet-runtime", "3.1.5"),
                &tmp.path().join("out"),
            )
            .unwrap_err();
        assert!(matches!(err, InstallError::ChecksumMismatch { .. }));
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn test_unknown_dependency() {
        let tmp = TempDir::new().unwrap();
        let installer = CatalogInstaller::new(Catalog::default(), tmp.path(), None);
        let err = installer
            .install_dependency(&DependencySpec::new("dotnet-aspnetcore", "9.9.9"), tmp.path())
            .unwrap_err();
        assert!(err.to_string().contains("dotnet-aspnetcore 9.9.9"));
    }

    #[test]
    fn test_installed_version_outside_catalog_is_kept() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("dotnet-sdk");
        std::fs::create_dir_all(target.join("shared/Microsoft.NETCore.App/3.1.7")).unwrap();
        std::fs::create_dir_all(target.join("shared/Microsoft.AspNetCore.App/3.1.6")).unwrap();

        let installer = CatalogInstaller::new(Catalog::default(), tmp.path().join("cache"), None);
        installer
            .install_dependency(&DependencySpec::new("dotnet-runtime", "3.1.7"), &target)
            .unwrap();
        installer
            .install_dependency(&DependencySpec::new("dotnet-aspnetcore", "3.1.6"), &target)
            .unwrap();

        // A different patch still has to come from the catalog.
        let err = installer
            .install_dependency(&DependencySpec::new("dotnet-runtime", "3.1.8"), &target)
            .unwrap_err();
        assert!(matches!(err, InstallError::UnknownDependency { .. }));
        assert!(!tmp.path().join("cache").exists());
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = download("ftp://example.com/a.tar.gz").unwrap_err();
        assert!(matches!(err, InstallError::Download { .. }));
    }
}
