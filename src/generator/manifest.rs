//! Web-app manifest generation.
//!
//! # Manifest Format
//!
//! ```json
//! {
//!   "name": "Demo",
//!   "icons": [
//!     { "src": "android-chrome-192x192.png", "sizes": "192x192", "type": "image/png" },
//!     { "src": "android-chrome-512x512.png", "sizes": "512x512", "type": "image/png" }
//!   ],
//!   "theme_color": "#112233",
//!   "background_color": "#112233",
//!   "display": "standalone"
//! }
//! ```

use crate::app::AppDescriptor;
use crate::error::{StageError, StageResult};
use crate::utils::xml::escape;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "manifest.json";

const PNG: &str = "image/png";

/// Launcher icons referenced by the manifest: (file, sizes).
pub const MANIFEST_ICONS: &[(&str, &str)] = &[
    ("android-chrome-192x192.png", "192x192"),
    ("android-chrome-512x512.png", "512x512"),
];

/// Favicons linked from the `<head>` fragment: (file, sizes).
pub const HEAD_FAVICONS: &[(&str, &str)] = &[
    ("favicon-32x32.png", "32x32"),
    ("favicon-16x16.png", "16x16"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestDescriptor {
    pub name: String,
    pub icons: Vec<ManifestIcon>,
    pub theme_color: String,
    pub background_color: String,
    pub display: Display,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    Standalone,
}

impl ManifestDescriptor {
    pub fn from_app(app: &AppDescriptor) -> Self {
        let icons = MANIFEST_ICONS
            .iter()
            .map(|(src, sizes)| ManifestIcon {
                src: (*src).to_string(),
                sizes: (*sizes).to_string(),
                mime: PNG.to_string(),
            })
            .collect();

        Self {
            name: app.title.clone(),
            icons,
            theme_color: app.icon_background_color.clone(),
            background_color: app.icon_background_color.clone(),
            display: Display::Standalone,
        }
    }

    pub fn to_json(&self, minify: bool) -> serde_json::Result<String> {
        if minify {
            serde_json::to_string(self)
        } else {
            serde_json::to_string_pretty(self)
        }
    }
}

/// Build the manifest for `app` and write `manifest.json` into `dir`.
pub fn generate(app: &AppDescriptor, dir: &Path, minify: bool) -> StageResult<ManifestDescriptor> {
    let manifest = ManifestDescriptor::from_app(app);
    let path: PathBuf = dir.join(MANIFEST_FILE);
    let json = manifest
        .to_json(minify)
        .map_err(|e| StageError::write(&path, e.into()))?;
    fs::write(&path, json).map_err(|e| StageError::write(&path, e))?;
    Ok(manifest)
}

/// `<head>` tags announcing the icons and manifest, for the page renderer.
pub fn head_tags(app: &AppDescriptor) -> String {
    let color = escape(&app.icon_background_color);
    let mut tags = format!(r#"<meta name="theme-color" content="{color}" />"#);
    tags.push_str(r#"<link rel="apple-touch-icon" sizes="180x180" href="apple-touch-icon.png" />"#);
    for (href, sizes) in HEAD_FAVICONS {
        tags.push_str(&format!(
            r#"<link rel="icon" type="image/png" href="{href}" sizes="{sizes}" />"#
        ));
    }
    tags.push_str(&format!(r#"<link rel="manifest" href="{MANIFEST_FILE}" />"#));
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn demo() -> AppDescriptor {
        AppDescriptor {
            title: "Demo".into(),
            version: "2.0.1".into(),
            icon_background_color: "#112233".into(),
        }
    }

    #[test]
    fn test_generate_manifest() {
        let tmp = TempDir::new().unwrap();
        let manifest = generate(&demo(), tmp.path(), true).unwrap();
        assert_eq!(manifest.theme_color, "#112233");

        let written = fs::read_to_string(tmp.path().join(MANIFEST_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(json["name"], "Demo");
        assert_eq!(json["theme_color"], "#112233");
        assert_eq!(json["background_color"], "#112233");
        assert_eq!(json["display"], "standalone");

        let icons = json["icons"].as_array().unwrap();
        assert_eq!(icons.len(), 2);
        assert_eq!(icons[0]["sizes"], "192x192");
        assert_eq!(icons[1]["sizes"], "512x512");
        assert_eq!(icons[1]["src"], "android-chrome-512x512.png");
        assert_eq!(icons[0]["type"], "image/png");
    }

    #[test]
    fn test_minified_is_single_line() {
        let manifest = ManifestDescriptor::from_app(&demo());
        let compact = manifest.to_json(true).unwrap();
        assert!(!compact.contains('\n'));
        assert!(manifest.to_json(false).unwrap().contains('\n'));
        assert!(compact.starts_with(r#"{"name":"Demo","icons":"#));
    }

    #[test]
    fn test_serialization_error_maps_to_write_failure() {
        let source: serde_json::Error = serde_json::from_str::<u8>("\"x\"").unwrap_err();
        let err = StageError::write(MANIFEST_FILE, source.into());
        assert!(matches!(err, StageError::WriteFailure { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_generated_file_matches_to_json() {
        let tmp = TempDir::new().unwrap();
        let manifest = generate(&demo(), tmp.path(), false).unwrap();
        assert_eq!(
            fs::read_to_string(tmp.path().join(MANIFEST_FILE)).unwrap(),
            manifest.to_json(false).unwrap()
        );
    }

    #[test]
    fn test_generate_into_missing_dir_is_write_failure() {
        let tmp = TempDir::new().unwrap();
        let err = generate(&demo(), &tmp.path().join("absent"), true).unwrap_err();
        assert!(matches!(err, StageError::WriteFailure { .. }));
    }

    #[test]
    fn test_head_tags() {
        let tags = head_tags(&demo());
        assert!(tags.starts_with(r##"<meta name="theme-color" content="#112233" />"##));
        assert!(tags.contains(r#"href="apple-touch-icon.png""#));
        assert!(tags.contains(r#"href="favicon-32x32.png" sizes="32x32""#));
        assert!(tags.contains(r#"href="favicon-16x16.png" sizes="16x16""#));
        assert!(tags.ends_with(r#"<link rel="manifest" href="manifest.json" />"#));
    }

    #[test]
    fn test_head_tags_escape_color() {
        let mut app = demo();
        app.icon_background_color = r#"red" onload="x"#.into();
        assert!(head_tags(&app).contains("red&quot; onload=&quot;x"));
    }
}
