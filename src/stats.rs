//! Build statistics reported by the upstream bundler.
//!
//! The bundler is a black box; all the pipeline needs from it is where it
//! emitted the bundle, which assets it emitted, and (optionally) the
//! compilation hash.

use crate::error::{StageError, StageResult};
use anyhow::{Context, Result};
use jwalk::WalkDir;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Compilation hash, when the bundler reports one.
    pub hash: Option<String>,
    /// Directory the bundle was emitted into, when reported.
    pub output_path: Option<PathBuf>,
    /// Emitted asset names, relative to the bundle directory, `/`-separated.
    pub assets: Vec<String>,
}

/// Subset of the bundler's JSON stats the pipeline reads.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStats {
    hash: Option<String>,
    output_path: Option<PathBuf>,
    #[serde(default)]
    assets: Vec<RawAsset>,
}

#[derive(Deserialize)]
struct RawAsset {
    name: String,
}

impl BuildStats {
    /// Load the bundler's JSON stats file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read build stats {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid build stats {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: RawStats = serde_json::from_str(content)?;
        let mut assets: Vec<String> = raw.assets.into_iter().map(|a| a.name).collect();
        assets.sort();
        assets.dedup();
        Ok(Self {
            hash: raw.hash.filter(|h| !h.is_empty()),
            output_path: raw.output_path,
            assets,
        })
    }

    /// Derive stats by listing the files in an emitted bundle.
    pub fn scan(bundle: &Path) -> StageResult<Self> {
        if !bundle.is_dir() {
            return Err(StageError::MissingBundle(bundle.to_path_buf()));
        }
        Ok(Self {
            hash: None,
            output_path: Some(bundle.to_path_buf()),
            assets: list_files(bundle),
        })
    }

    /// Copy keeping only the assets for which `keep` holds.
    pub fn retain_assets(&self, keep: impl Fn(&str) -> bool) -> Self {
        Self {
            assets: self.assets.iter().filter(|name| keep(name)).cloned().collect(),
            ..self.clone()
        }
    }

    /// Copy without assets whose names start with any of `prefixes`.
    pub fn without_prefixes(&self, prefixes: &[String]) -> Self {
        self.retain_assets(|name| !prefixes.iter().any(|p| name.starts_with(p.as_str())))
    }
}

/// Relative, `/`-separated, sorted names of every file under `dir`.
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(dir)
        .skip_hidden(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let path = e.path();
            let rel = path.strip_prefix(dir).ok()?;
            let parts: Vec<_> = rel.iter().map(|p| p.to_string_lossy().into_owned()).collect();
            Some(parts.join("/"))
        })
        .collect();
    files.sort();
    files
}
