//! Path normalization utilities.

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to the path itself when absolute, or to `cwd.join(path)`.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a configured path against `root`, expanding a leading `~`.
///
/// Targets may not exist yet (output directories, optional patch targets),
/// so the result is only canonicalized when it does.
pub fn resolve_against(path: &Path, root: &Path) -> PathBuf {
    let expanded = match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    };
    let joined = if expanded.is_relative() {
        root.join(expanded)
    } else {
        expanded
    };
    if joined.exists() {
        normalize_path(&joined)
    } else {
        joined
    }
}

/// File name of `path` as UTF-8, empty when absent.
#[inline]
pub fn file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
}
