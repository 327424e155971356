//! `[cleanup]` section.

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Generated files starting with one of these prefixes are removed from
    /// the output directory.
    pub stale_prefixes: Vec<String>,
    /// Project-root files removed in installed mode.
    pub dotfiles: Vec<PathBuf>,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            stale_prefixes: vec!["i-f7-ios".into()],
            dotfiles: vec![".babelrc".into()],
        }
    }
}

impl CleanupConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.stale_prefixes.iter().any(|p| p.is_empty()) {
            diag.error_with_hint(
                FieldPath::new("cleanup.stale_prefixes"),
                "an empty prefix would match every file",
                "remove the empty entry",
            );
        }
        for dotfile in &self.dotfiles {
            if dotfile.is_absolute() || dotfile.components().count() != 1 {
                diag.error(
                    FieldPath::new("cleanup.dotfiles"),
                    format!("`{}` must be a plain file name", dotfile.display()),
                );
            }
        }
    }
}
