//! `[icons]` section.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconsConfig {
    /// `TileColor` written to `browserconfig.xml`.
    pub tile_color: String,
}

impl Default for IconsConfig {
    fn default() -> Self {
        Self {
            tile_color: "#da532c".into(),
        }
    }
}
