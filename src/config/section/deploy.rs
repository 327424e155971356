//! `[deploy]` section.

use serde::{Deserialize, Serialize};

/// Whether the pipeline runs inside the maintained source tree or against an
/// installed copy of the tool.
///
/// - `Source`: the license year is kept current.
/// - `Installed`: leftover build-tool dotfiles are removed from the project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    #[default]
    Source,
    Installed,
}

impl DeploymentMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Installed => "installed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub mode: DeploymentMode,
}
