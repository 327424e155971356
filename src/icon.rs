//! Platform icon sets and the Windows tile descriptor.
//!
//! Icons are driven by two declarative tables: [`ICON_FAMILIES`] says which
//! source files belong in the bundle, [`ICON_RENAMES`] canonicalizes names
//! some platforms probe for without a size suffix.
//!
//! The run is two-phase. Planning validates everything (every family present,
//! every rename source planned) before the first byte is written, so a broken
//! icon tree leaves the output untouched.

use crate::debug;
use crate::error::{StageError, StageResult};
use crate::generator::manifest::{HEAD_FAVICONS, MANIFEST_ICONS};
use crate::utils::{path::file_name, xml};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub const BROWSERCONFIG_FILE: &str = "browserconfig.xml";

/// A group of icon files sharing a name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconFamily {
    /// Human-readable family name used in errors.
    pub name: &'static str,
    pub prefix: &'static str,
}

/// One-to-one rename applied after copying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconRename {
    pub from: &'static str,
    pub to: &'static str,
}

pub const ICON_FAMILIES: &[IconFamily] = &[
    IconFamily {
        name: "favicon",
        prefix: "favicon-",
    },
    IconFamily {
        name: "android chrome",
        prefix: "android-chrome-",
    },
    IconFamily {
        name: "windows tile",
        prefix: "mstile-",
    },
    IconFamily {
        name: "apple touch",
        prefix: "apple-touch-icon-",
    },
];

pub const ICON_RENAMES: &[IconRename] = &[IconRename {
    from: "apple-touch-icon-180x180.png",
    to: "apple-touch-icon.png",
}];

/// Tile image referenced from `browserconfig.xml`.
pub const TILE_LOGO: &str = "mstile-150x150.png";

/// Exact files the generated artifacts link to. A family prefix match alone
/// would let `mstile-310x310.png` stand in for the tile logo.
pub fn required_files() -> impl Iterator<Item = &'static str> {
    std::iter::once(TILE_LOGO)
        .chain(MANIFEST_ICONS.iter().map(|(src, _)| *src))
        .chain(HEAD_FAVICONS.iter().map(|(href, _)| *href))
}

/// A planned copy from the icon source tree into the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconAsset {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Validated copy plan.
#[derive(Debug)]
pub struct IconPlan {
    pub assets: Vec<IconAsset>,
    pub renames: Vec<(PathBuf, PathBuf)>,
}

impl IconPlan {
    /// Every path this plan leaves in the output directory.
    pub fn outputs(&self) -> impl Iterator<Item = &Path> {
        self.assets
            .iter()
            .map(|a| a.destination.as_path())
            .chain(self.renames.iter().map(|(_, to)| to.as_path()))
    }
}

/// What [`run`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconReport {
    pub copied: usize,
    pub renamed: usize,
}

/// Plan every copy without touching `dir`.
///
/// Fails on the first family without a source file, or when a rename source
/// is not among the planned copies.
pub fn plan(source_root: &Path, dir: &Path) -> StageResult<IconPlan> {
    let mut names: Vec<String> = fs::read_dir(source_root)
        .map_err(|e| StageError::io(source_root, e))?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();

    let mut assets = Vec::new();
    for family in ICON_FAMILIES {
        let before = assets.len();
        assets.extend(
            names
                .iter()
                .filter(|name| name.starts_with(family.prefix))
                .map(|name| IconAsset {
                    source: source_root.join(name),
                    destination: dir.join(name),
                }),
        );
        if assets.len() == before {
            return Err(StageError::MissingIconAsset {
                family: family.name,
                pattern: format!("{}*", family.prefix),
                root: source_root.to_path_buf(),
            });
        }
    }

    for required in required_files() {
        if !names.iter().any(|name| name == required) {
            let family = ICON_FAMILIES
                .iter()
                .find(|f| required.starts_with(f.prefix))
                .map_or("required", |f| f.name);
            return Err(StageError::MissingIconAsset {
                family,
                pattern: required.to_string(),
                root: source_root.to_path_buf(),
            });
        }
    }

    let mut renames = Vec::with_capacity(ICON_RENAMES.len());
    for rename in ICON_RENAMES {
        let from = dir.join(rename.from);
        let to = dir.join(rename.to);
        if !assets.iter().any(|a| a.destination == from) {
            return Err(StageError::RenameFailure {
                from,
                to,
                source: None,
            });
        }
        renames.push((from, to));
    }

    Ok(IconPlan { assets, renames })
}

impl IconPlan {
    /// Copy, rename, then write `browserconfig.xml`.
    pub fn apply(&self, dir: &Path, tile_color: &str, minify: bool) -> StageResult<IconReport> {
        fs::create_dir_all(dir).map_err(|e| StageError::write(dir, e))?;

        self.assets.par_iter().try_for_each(|asset| {
            fs::copy(&asset.source, &asset.destination)
                .map(|_| ())
                .map_err(|e| StageError::write(&asset.destination, e))
        })?;

        for (from, to) in &self.renames {
            // rename(2) replaces the target on unix but not on windows
            if to.exists() {
                fs::remove_file(to).map_err(|e| rename_failure(from, to, e))?;
            }
            fs::rename(from, to).map_err(|e| rename_failure(from, to, e))?;
            debug!("icons"; "{} -> {}", file_name(from), file_name(to));
        }

        let path = dir.join(BROWSERCONFIG_FILE);
        fs::write(&path, browserconfig(tile_color, minify).as_bytes())
            .map_err(|e| StageError::write(&path, e))?;

        Ok(IconReport {
            copied: self.assets.len(),
            renamed: self.renames.len(),
        })
    }
}

fn rename_failure(from: &Path, to: &Path, source: std::io::Error) -> StageError {
    StageError::RenameFailure {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source: Some(source),
    }
}

/// Plan and apply in one step.
pub fn run(
    source_root: &Path,
    dir: &Path,
    tile_color: &str,
    minify: bool,
) -> StageResult<IconReport> {
    plan(source_root, dir)?.apply(dir, tile_color, minify)
}

/// Render the Windows tile descriptor.
pub fn browserconfig(tile_color: &str, minify: bool) -> String {
    let document = format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<browserconfig>
    <msapplication>
        <tile>
            <square150x150logo src="{TILE_LOGO}"/>
            <TileColor>{}</TileColor>
        </tile>
    </msapplication>
</browserconfig>
"#,
        xml::escape(tile_color)
    );
    xml::minify(&document, minify).into_owned()
}
