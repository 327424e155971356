//! `[patch]` section: auxiliary files rewritten after generation.

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Name following the year in the license's copyright line.
    pub license_holder: String,
    /// Skip (instead of fail) when the license file is absent.
    pub license_optional: bool,
    /// Skip (instead of fail) when the rewrite-rules file is absent.
    pub rewrite_rules_optional: bool,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            license_holder: "scriptPilot".into(),
            license_optional: true,
            rewrite_rules_optional: true,
        }
    }
}

impl PatchConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.license_holder.trim().is_empty() {
            diag.error(
                FieldPath::new("patch.license_holder"),
                "license holder must not be empty",
            );
        }
    }
}
