//! Staging directory lifecycle: adopt, publish, roll back.
//!
//! ```text
//! <bundle>  ──adopt──▶  <root>/.build-X.Y.Z.staging  ──publish──▶  <root>/build-X.Y.Z
//!     ▲                          │
//!     └────────rollback──────────┘
//! ```
//!
//! Consumers of `<root>/build-X.Y.Z` never observe a half-finalized
//! directory: it only appears through the final rename.

use crate::error::{StageError, StageResult};
use crate::output::VersionedOutputPath;
use crate::{debug, log};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A bundle moved into staging, remembering where it came from.
#[derive(Debug)]
pub struct Staging {
    bundle: PathBuf,
    dir: PathBuf,
}

impl Staging {
    /// Move `bundle` into the staging sibling of `output`.
    ///
    /// Leftovers of an interrupted run are removed first.
    pub fn adopt(bundle: &Path, output: &VersionedOutputPath) -> StageResult<Self> {
        if !bundle.is_dir() {
            return Err(StageError::MissingBundle(bundle.to_path_buf()));
        }

        let dir = output.staging();
        remove_dir_if_exists(&dir)?;
        fs::create_dir_all(output.root()).map_err(|e| StageError::write(output.root(), e))?;

        fs::rename(bundle, &dir).map_err(|e| StageError::RenameFailure {
            from: bundle.to_path_buf(),
            to: dir.clone(),
            source: Some(e),
        })?;
        debug!("stage"; "{} -> {}", bundle.display(), dir.display());

        Ok(Self {
            bundle: bundle.to_path_buf(),
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replace the versioned directory with the staged one.
    ///
    /// The published directory is moved aside rather than deleted, and only
    /// removed once the staged one is in place. If the final rename fails it
    /// is moved back, so the path the rewrite rules point at keeps serving.
    pub fn publish(self, output: &VersionedOutputPath) -> StageResult<PathBuf> {
        let target = output.path();
        let previous = output.previous();

        if let Err(e) = remove_dir_if_exists(&previous) {
            return Err(self.rollback_with(e));
        }
        let had_previous = target.exists();
        if had_previous && let Err(e) = fs::rename(target, &previous) {
            let err = StageError::RenameFailure {
                from: target.to_path_buf(),
                to: previous,
                source: Some(e),
            };
            return Err(self.rollback_with(err));
        }

        if let Err(e) = fs::rename(&self.dir, target) {
            let err = StageError::RenameFailure {
                from: self.dir.clone(),
                to: target.to_path_buf(),
                source: Some(e),
            };
            if had_previous {
                restore_previous(&previous, target);
            } else {
                log!("error"; "{} was not published; references to {} are dangling",
                    target.display(), output.dir_name());
            }
            return Err(self.rollback_with(err));
        }

        if had_previous && let Err(e) = remove_dir_if_exists(&previous) {
            log!("warning"; "cannot remove {}: {}", previous.display(), e);
        }
        Ok(target.to_path_buf())
    }

    /// Return the staged bundle to where the bundler left it.
    pub fn rollback(self) {
        if self.bundle.exists() {
            log!("error"; "cannot restore bundle: {} already exists, staged output left at {}",
                self.bundle.display(), self.dir.display());
            return;
        }
        match fs::rename(&self.dir, &self.bundle) {
            Ok(()) => log!("warning"; "restored bundle to {}", self.bundle.display()),
            Err(e) => log!("error"; "cannot restore bundle from {}: {}", self.dir.display(), e),
        }
    }

    fn rollback_with(self, err: StageError) -> StageError {
        self.rollback();
        err
    }
}

fn restore_previous(previous: &Path, target: &Path) {
    match fs::rename(previous, target) {
        Ok(()) => log!("warning"; "kept previous {}", target.display()),
        Err(e) => log!("error"; "cannot restore {} from {}: {}",
            target.display(), previous.display(), e),
    }
}

fn remove_dir_if_exists(dir: &Path) -> StageResult<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StageError::io(dir, e)),
    }
}
