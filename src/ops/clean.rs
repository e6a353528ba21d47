//! Staging area cleanup.
//!
//! Build-time caches and tools are removed from the dependency directory
//! before the droplet is packed, along with any `bin`/`lib` symlinks that
//! pointed into them.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::{fs, Shell};

/// Directories always removed when present.
pub const CACHE_DIRS: &[&str] = &["nuget", ".nuget", ".local", ".cache", ".config", ".npm"];

/// Directories scanned for links into removed trees.
const LINK_DIRS: &[&str] = &["bin", "lib"];

/// The candidate list for an app launched by `start_command`.
///
/// The SDK stays when the app launches through `dotnet <name>.dll`; node
/// stays only when explicitly requested.
pub fn dirs_to_remove(start_command: &str, install_node: bool) -> Vec<&'static str> {
    let mut dirs = CACHE_DIRS.to_vec();
    if !start_command.ends_with(".dll") {
        dirs.push("dotnet-sdk");
    }
    if !install_node {
        dirs.push("node");
    }
    dirs
}

/// Remove unneeded directories from `dep_dir`. Returns the names removed.
///
/// Absent candidates are skipped, so cleaning twice is harmless.
pub fn clean_staging_area(
    dep_dir: &Path,
    start_command: &str,
    install_node: bool,
    shell: &Shell,
) -> Result<Vec<String>> {
    shell.begin_step("Cleaning staging area");

    let mut removed = Vec::new();
    for name in dirs_to_remove(start_command, install_node) {
        let dir = dep_dir.join(name);
        if std::fs::symlink_metadata(&dir).is_err() {
            continue;
        }

        shell.info(format!("Removing {}", name));
        fs::remove_all_if_exists(&dir)?;
        let links = remove_symlinks_to(dep_dir, &dir)?;
        tracing::debug!("removed {} and {} link(s) into it", dir.display(), links);
        removed.push(name.to_string());
    }
    Ok(removed)
}

/// Remove links in `<dep_dir>/bin` and `<dep_dir>/lib` whose target lies under `removed`.
fn remove_symlinks_to(dep_dir: &Path, removed: &Path) -> Result<usize> {
    let mut count = 0;
    for name in LINK_DIRS {
        let link_dir = dep_dir.join(name);
        for (link, target) in fs::symlinks_in(&link_dir)? {
            let absolute = if target.is_absolute() {
                target
            } else {
                normalize(&link_dir.join(target))
            };
            if absolute.starts_with(removed) {
                std::fs::remove_file(&link)
                    .with_context(|| format!("failed to remove link: {}", link.display()))?;
                count += 1;
            }
        }
    }
    Ok(count)
}

/// Resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
