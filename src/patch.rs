//! In-place regex patching of auxiliary files outside the bundle.
//!
//! A [`PatchRule`] pairs a target file with a pattern and a replacement
//! template (`$1`-style group references). Rules are independent: each yields
//! its own outcome, and the caller decides what a failure means.
//!
//! | Rule             | Target            | When                 |
//! |------------------|-------------------|----------------------|
//! | `license_year`   | `LICENSE`         | source mode only     |
//! | `rewrite_rules`  | `www/.htaccess`   | always               |

use crate::config::{DeploymentMode, ProjectConfig};
use crate::output::Version;
use regex::Regex;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("patch target `{0}` does not exist")]
    TargetMissing(PathBuf),

    #[error("failed to patch `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid patch pattern")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The file was rewritten.
    Patched { replacements: usize },
    /// No match, or every match already had the target value.
    Unchanged,
    /// Optional target absent.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct PatchRule {
    pub name: &'static str,
    pub target: PathBuf,
    pub pattern: Regex,
    pub replacement: String,
    pub optional: bool,
}

impl PatchRule {
    /// Keep the copyright year in the license current.
    pub fn license_year(
        target: impl Into<PathBuf>,
        holder: &str,
        year: i64,
        optional: bool,
    ) -> Result<Self, PatchError> {
        let holder_pattern = regex::escape(holder);
        Ok(Self {
            name: "license",
            target: target.into(),
            pattern: Regex::new(&format!(r"Copyright \(c\) ([0-9]{{4}}) {holder_pattern}"))?,
            replacement: format!("Copyright (c) {year} {}", literal(holder)),
            optional,
        })
    }

    /// Point every `/build-X.Y.Z/` reference at the current version.
    pub fn rewrite_rules(
        target: impl Into<PathBuf>,
        version: &Version,
        optional: bool,
    ) -> Result<Self, PatchError> {
        Ok(Self {
            name: "rewrite rules",
            target: target.into(),
            pattern: Regex::new(r"/build-([0-9]+)\.([0-9]+)\.([0-9]+)/")?,
            replacement: format!("/build-{version}/"),
            optional,
        })
    }

    /// Patch the target file.
    pub fn apply(&self) -> Result<PatchOutcome, PatchError> {
        let content = match fs::read_to_string(&self.target) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return if self.optional {
                    Ok(PatchOutcome::Skipped)
                } else {
                    Err(PatchError::TargetMissing(self.target.clone()))
                };
            }
            Err(source) => {
                return Err(PatchError::Io {
                    path: self.target.clone(),
                    source,
                });
            }
        };

        let (patched, replacements) = self.apply_str(&content);
        if replacements == 0 || patched == content {
            return Ok(PatchOutcome::Unchanged);
        }

        fs::write(&self.target, patched).map_err(|source| PatchError::Io {
            path: self.target.clone(),
            source,
        })?;
        Ok(PatchOutcome::Patched { replacements })
    }

    /// Replace every match, returning the new text and the match count.
    pub fn apply_str(&self, content: &str) -> (String, usize) {
        let replacements = self.pattern.find_iter(content).count();
        if replacements == 0 {
            return (content.to_string(), 0);
        }
        let patched = self
            .pattern
            .replace_all(content, self.replacement.as_str())
            .into_owned();
        (patched, replacements)
    }
}

/// Escape `$` so a literal survives as a replacement template.
fn literal(s: &str) -> String {
    s.replace('$', "$$")
}

/// Apply each rule, one outcome per rule, in order.
pub fn patch(rules: &[PatchRule]) -> Vec<Result<PatchOutcome, PatchError>> {
    rules.iter().map(PatchRule::apply).collect()
}

/// The rule set for a finalize run.
pub fn rules(
    config: &ProjectConfig,
    version: &Version,
    year: i64,
) -> Result<Vec<PatchRule>, PatchError> {
    let mut rules = Vec::with_capacity(2);
    if config.deploy.mode == DeploymentMode::Source {
        rules.push(PatchRule::license_year(
            &config.paths.license,
            &config.patch.license_holder,
            year,
            config.patch.license_optional,
        )?);
    }
    rules.push(PatchRule::rewrite_rules(
        &config.paths.rewrite_rules,
        version,
        config.patch.rewrite_rules_optional,
    )?);
    Ok(rules)
}
