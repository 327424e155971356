//! Offline cache manifest generation.
//!
//! # Appcache Format
//!
//! ```text
//! CACHE MANIFEST
//! # 4f2a9c
//!
//! CACHE:
//! app.1a2b.js
//! app.9f8e.css
//!
//! NETWORK:
//! *
//! ```
//!
//! There is no explicit pre-cache list beyond the bundle's own assets, and the
//! network section allows everything. Source maps are debug artifacts, never
//! cached.

use crate::error::{StageError, StageResult};
use crate::stats::BuildStats;
use crate::utils::hash::Digest;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

pub const APPCACHE_FILE: &str = "manifest.appcache";

/// Length of the content-derived revision comment.
const REVISION_LEN: usize = 20;

static SOURCE_MAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(js|css)\.map$").expect("valid source-map pattern"));

/// One rule of the cache manifest.
#[derive(Debug, Clone)]
pub enum CacheManifestEntry {
    /// Wildcard entry for the NETWORK section.
    Include(&'static str),
    /// Assets whose names match are left out of the CACHE section.
    Exclude(Regex),
}

impl CacheManifestEntry {
    /// The fixed rule set: allow the network for everything, exclude maps.
    pub fn defaults() -> Vec<Self> {
        vec![Self::Include("*"), Self::Exclude(SOURCE_MAP.clone())]
    }
}

/// In-memory cache manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheManifest {
    pub revision: String,
    pub cache: Vec<String>,
    pub network: Vec<String>,
}

impl CacheManifest {
    /// Apply `rules` to the bundle's assets.
    pub fn build(revision: String, assets: &[String], rules: &[CacheManifestEntry]) -> Self {
        let mut network = Vec::new();
        let mut excludes = Vec::new();
        for rule in rules {
            match rule {
                CacheManifestEntry::Include(pattern) => network.push((*pattern).to_string()),
                CacheManifestEntry::Exclude(regex) => excludes.push(regex),
            }
        }

        let cache = assets
            .iter()
            .filter(|name| name.as_str() != APPCACHE_FILE)
            .filter(|name| !excludes.iter().any(|re| re.is_match(name)))
            .cloned()
            .collect();

        Self {
            revision,
            cache,
            network,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(256);
        out.push_str("CACHE MANIFEST\n");
        out.push_str("# ");
        out.push_str(&self.revision);
        out.push_str("\n\nCACHE:\n");
        for entry in &self.cache {
            out.push_str(entry);
            out.push('\n');
        }
        out.push_str("\nNETWORK:\n");
        for entry in &self.network {
            out.push_str(entry);
            out.push('\n');
        }
        out
    }
}

/// Revision comment: the compilation hash, or a digest of the assets.
///
/// The comment is what makes clients refetch, so it must change whenever a
/// cached asset does.
pub fn revision(stats: &BuildStats, dir: &Path) -> StageResult<String> {
    if let Some(hash) = &stats.hash {
        return Ok(hash.clone());
    }

    let mut digest = Digest::new();
    for name in &stats.assets {
        let path = dir.join(name);
        if path.is_file() {
            digest
                .update_file(name, &path)
                .map_err(|e| StageError::io(&path, e))?;
        }
    }
    Ok(digest.finish_hex(REVISION_LEN))
}

/// Write `manifest.appcache` for the bundle in `dir`.
pub fn generate(dir: &Path, stats: &BuildStats) -> StageResult<CacheManifest> {
    let manifest = CacheManifest::build(
        revision(stats, dir)?,
        &stats.assets,
        &CacheManifestEntry::defaults(),
    );
    let path = dir.join(APPCACHE_FILE);
    fs::write(&path, manifest.render()).map_err(|e| StageError::write(&path, e))?;
    Ok(manifest)
}
