//! `[paths]` section: where the pipeline reads and writes.
//!
//! All paths are relative to the directory holding `appbake.toml` unless
//! absolute. `~` is expanded.
//!
//! ```toml
//! [paths]
//! app = "."                      # directory holding config.json
//! icons = "icons"                # icon source tree
//! output = "www"                 # parent of build-<version>
//! license = "LICENSE"
//! rewrite_rules = "www/.htaccess"
//! project = "."                  # project root (dotfile cleanup)
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub app: PathBuf,
    pub icons: PathBuf,
    pub output: PathBuf,
    pub license: PathBuf,
    pub rewrite_rules: PathBuf,
    pub project: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            app: ".".into(),
            icons: "icons".into(),
            output: "www".into(),
            license: "LICENSE".into(),
            rewrite_rules: "www/.htaccess".into(),
            project: ".".into(),
        }
    }
}

impl PathsConfig {
    /// File name of the app descriptor inside `app`.
    pub const DESCRIPTOR: &'static str = "config.json";

    pub fn descriptor(&self) -> PathBuf {
        self.app.join(Self::DESCRIPTOR)
    }

    /// Resolve every path against `root`.
    pub fn normalize(&mut self, root: &Path) {
        for path in [
            &mut self.app,
            &mut self.icons,
            &mut self.output,
            &mut self.license,
            &mut self.rewrite_rules,
            &mut self.project,
        ] {
            *path = crate::utils::path::resolve_against(path, root);
        }
    }
}
