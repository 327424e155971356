//! Removal of stale artifacts.
//!
//! Best-effort throughout: a missing file is not an error, and a failed
//! removal is recorded without stopping the others.

use crate::config::{CleanupConfig, DeploymentMode};
use crate::{debug, log};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, io::Error)>,
}

impl CleanupReport {
    fn remove(&mut self, path: PathBuf) {
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match result {
            Ok(()) => {
                debug!("cleanup"; "removed {}", path.display());
                self.removed.push(path);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                log!("warning"; "cannot remove {}: {}", path.display(), e);
                self.failed.push((path, e));
            }
        }
    }
}

/// Remove stale prefixed entries from `dir`, and project dotfiles when
/// installed.
pub fn cleanup(
    dir: &Path,
    project_root: &Path,
    mode: DeploymentMode,
    settings: &CleanupConfig,
) -> CleanupReport {
    let mut report = CleanupReport::default();

    match fs::read_dir(dir) {
        Ok(entries) => {
            let mut stale: Vec<PathBuf> = entries
                .filter_map(Result::ok)
                .filter(|entry| {
                    let name = entry.file_name();
                    let name = name.to_string_lossy();
                    settings.stale_prefixes.iter().any(|p| name.starts_with(p.as_str()))
                })
                .map(|entry| entry.path())
                .collect();
            stale.sort();
            for path in stale {
                report.remove(path);
            }
        }
        Err(e) => {
            log!("warning"; "cannot list {}: {}", dir.display(), e);
            report.failed.push((dir.to_path_buf(), e));
        }
    }

    if mode == DeploymentMode::Installed {
        for dotfile in &settings.dotfiles {
            report.remove(project_root.join(dotfile));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_removes_stale_prefixed_files() {
        let out = TempDir::new().unwrap();
        fs::write(out.path().join("i-f7-ios.css"), "").unwrap();
        fs::write(out.path().join("i-f7-ios-icons.woff"), "").unwrap();
        fs::write(out.path().join("app.js"), "").unwrap();
        let project = TempDir::new().unwrap();
        fs::write(project.path().join(".babelrc"), "{}").unwrap();

        let report = cleanup(
            out.path(),
            project.path(),
            DeploymentMode::Source,
            &CleanupConfig::default(),
        );
        assert_eq!(report.removed.len(), 2);
        assert!(report.failed.is_empty());
        assert!(out.path().join("app.js").exists());
        assert!(project.path().join(".babelrc").exists());
    }

    #[test]
    fn test_installed_removes_dotfiles() {
        let out = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(project.path().join(".babelrc"), "{}").unwrap();

        let report = cleanup(
            out.path(),
            project.path(),
            DeploymentMode::Installed,
            &CleanupConfig::default(),
        );
        assert_eq!(report.removed, vec![project.path().join(".babelrc")]);
        assert!(!project.path().join(".babelrc").exists());

        // Absent targets are not failures.
        let again = cleanup(
            out.path(),
            project.path(),
            DeploymentMode::Installed,
            &CleanupConfig::default(),
        );
        assert!(again.removed.is_empty());
        assert!(again.failed.is_empty());
    }
}
