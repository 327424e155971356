//! Application descriptor (`config.json` in the app directory).
//!
//! ```json
//! { "title": "Demo", "version": "2.0.1", "iconBackgroundColor": "#112233" }
//! ```

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application metadata read once per run. Unknown keys are ignored: the
/// descriptor is shared with the application itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDescriptor {
    pub title: String,
    pub version: String,
    pub icon_background_color: String,
}

impl AppDescriptor {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        serde_json::from_str(&content).map_err(|err| ConfigError::Json(path.to_path_buf(), err))
    }
}
