//! Filesystem utilities for the staging area.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use walkdir::WalkDir;

/// Remove whatever is at `path`: a directory tree, a file or a symlink.
///
/// Returns whether anything was removed.
pub fn remove_all_if_exists(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            fs::remove_dir_all(path)
                .with_context(|| format!("failed to remove directory: {}", path.display()))?;
            Ok(true)
        }
        Ok(_) => {
            fs::remove_file(path)
                .with_context(|| format!("failed to remove file: {}", path.display()))?;
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => {
            Err(e).with_context(|| format!("failed to stat: {}", path.display()))
        }
    }
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Files directly inside `dir` whose name matches `pattern` (e.g. `*.deps.json`).
///
/// Results are sorted so callers picking the first entry are deterministic.
pub fn glob_top_level(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = format!("{}/{}", escaped, pattern);

    let mut results = Vec::new();
    let paths =
        glob(&full_pattern).with_context(|| format!("invalid glob pattern: {}", pattern))?;
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    results.push(path);
                }
            }
            Err(e) => {
                tracing::warn!("glob error: {}", e);
            }
        }
    }

    results.sort();
    Ok(results)
}

/// Recursively find files with one of `extensions`, skipping the named directories
/// and any hidden directory.
pub fn find_files_with_extensions(
    root: &Path,
    extensions: &[&str],
    skip_dirs: &[&str],
) -> Vec<PathBuf> {
    let mut results: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !name.starts_with('.') && !skip_dirs.iter().any(|d| *d == name)
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .map(|ext| extensions.iter().any(|e| ext == *e))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    results.sort();
    results
}

/// Symbolic links directly inside `dir`, paired with their targets.
///
/// A missing `dir` yields no links.
pub fn symlinks_in(dir: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read directory: {}", dir.display()))
        }
    };

    let mut links = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_symlink() {
            let path = entry.path();
            let target = fs::read_link(&path)
                .with_context(|| format!("failed to read link: {}", path.display()))?;
            links.push((path, target));
        }
    }
    links.sort();
    Ok(links)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Create a symlink (platform-aware).
#[cfg(unix)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}
