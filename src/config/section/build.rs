//! `[build]` section: layered build options.
//!
//! The section holds one base layer and one overlay per environment. The
//! effective options for a run are `compose(base, overlay)`, where every key
//! present in the overlay wins and absent keys fall back to the base.
//!
//! # Example
//!
//! ```toml
//! [build.base]
//! source_map = true
//! gzip_extensions = ["js", "css"]
//!
//! [build.base.filenames]
//! script = "[name].[chunkhash].js"
//!
//! [build.production]
//! gzip = true
//!
//! [build.development]
//! minify = false
//! [build.development.style]
//! extract = false
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::output::VersionedOutputPath;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const DEFAULT_GZIP_THRESHOLD: u64 = 10_240;
const DEFAULT_GZIP_MIN_RATIO: f64 = 0.8;

// ============================================================================
// Environment
// ============================================================================

/// Which overlay is applied on top of the base layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

// ============================================================================
// BuildConfiguration (one layer)
// ============================================================================

/// One layer of build options. Every key is optional so layers can be
/// composed; see [`compose`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfiguration {
    /// Emit source maps for scripts and styles.
    pub source_map: Option<bool>,
    /// Minify generated JSON/XML artifacts.
    pub minify: Option<bool>,
    /// Emit `.gz` siblings for eligible assets.
    pub gzip: Option<bool>,
    /// Extensions (without dot) eligible for gzip.
    pub gzip_extensions: Option<Vec<String>>,
    /// Only assets strictly larger than this many bytes are compressed.
    pub gzip_threshold: Option<u64>,
    /// Keep a `.gz` only when `compressed < min_ratio * original`.
    pub gzip_min_ratio: Option<f64>,
    /// Bundler output filename templates.
    pub filenames: FilenameTemplates,
    /// Style loader options.
    pub style: StyleOptions,
}

/// Output filename templates handed to the bundler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilenameTemplates {
    pub script: Option<String>,
    pub chunk: Option<String>,
    pub style: Option<String>,
}

/// Style loader options (nested group, merged key by key).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    pub source_map: Option<bool>,
    pub extract: Option<bool>,
}

/// Compose a base layer with an overlay. Pure; overlay keys win, recursively
/// for the `filenames` and `style` groups.
pub fn compose(base: BuildConfiguration, overlay: BuildConfiguration) -> BuildConfiguration {
    BuildConfiguration {
        source_map: overlay.source_map.or(base.source_map),
        minify: overlay.minify.or(base.minify),
        gzip: overlay.gzip.or(base.gzip),
        gzip_extensions: overlay.gzip_extensions.or(base.gzip_extensions),
        gzip_threshold: overlay.gzip_threshold.or(base.gzip_threshold),
        gzip_min_ratio: overlay.gzip_min_ratio.or(base.gzip_min_ratio),
        filenames: FilenameTemplates {
            script: overlay.filenames.script.or(base.filenames.script),
            chunk: overlay.filenames.chunk.or(base.filenames.chunk),
            style: overlay.filenames.style.or(base.filenames.style),
        },
        style: StyleOptions {
            source_map: overlay.style.source_map.or(base.style.source_map),
            extract: overlay.style.extract.or(base.style.extract),
        },
    }
}

// ============================================================================
// [build] section
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Options shared by every environment.
    pub base: BuildConfiguration,
    /// Overlay for `--env production`.
    pub production: BuildConfiguration,
    /// Overlay for `--env development`.
    pub development: BuildConfiguration,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            base: BuildConfiguration::default(),
            production: BuildConfiguration::default(),
            development: BuildConfiguration {
                minify: Some(false),
                gzip: Some(false),
                ..BuildConfiguration::default()
            },
        }
    }
}

impl BuildSectionConfig {
    pub const fn overlay(&self, env: Environment) -> &BuildConfiguration {
        match env {
            Environment::Production => &self.production,
            Environment::Development => &self.development,
        }
    }

    /// Resolve the effective options for `env`.
    pub fn resolve(&self, env: Environment) -> ResolvedBuild {
        let composed = compose(self.base.clone(), self.overlay(env).clone());
        ResolvedBuild::new(env, &composed)
    }

    /// Validate every layer that can take effect.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for env in [Environment::Production, Environment::Development] {
            let resolved = self.resolve(env);
            resolved.validate(diag);
        }
    }
}

// ============================================================================
// ResolvedBuild (defaults applied)
// ============================================================================

/// Fully defaulted build options for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBuild {
    pub environment: Environment,
    pub source_map: bool,
    pub minify: bool,
    pub gzip: GzipOptions,
    pub script_filename: String,
    pub chunk_filename: String,
    pub style_filename: String,
    pub style_source_map: bool,
    pub style_extract: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GzipOptions {
    pub enable: bool,
    pub extensions: Vec<String>,
    pub threshold: u64,
    pub min_ratio: f64,
}

impl ResolvedBuild {
    fn new(environment: Environment, layer: &BuildConfiguration) -> Self {
        let source_map = layer.source_map.unwrap_or(true);
        Self {
            environment,
            source_map,
            minify: layer.minify.unwrap_or(true),
            gzip: GzipOptions {
                enable: layer.gzip.unwrap_or(false),
                extensions: layer
                    .gzip_extensions
                    .clone()
                    .unwrap_or_else(|| vec!["js".into(), "css".into()]),
                threshold: layer.gzip_threshold.unwrap_or(DEFAULT_GZIP_THRESHOLD),
                min_ratio: layer.gzip_min_ratio.unwrap_or(DEFAULT_GZIP_MIN_RATIO),
            },
            script_filename: layer
                .filenames
                .script
                .clone()
                .unwrap_or_else(|| "[name].[chunkhash].js".into()),
            chunk_filename: layer
                .filenames
                .chunk
                .clone()
                .unwrap_or_else(|| "[id].[chunkhash].js".into()),
            style_filename: layer
                .filenames
                .style
                .clone()
                .unwrap_or_else(|| "[name].[contenthash].css".into()),
            style_source_map: layer.style.source_map.unwrap_or(source_map),
            style_extract: layer.style.extract.unwrap_or(true),
        }
    }

    fn validate(&self, diag: &mut ConfigDiagnostics) {
        let gzip = &self.gzip;
        if !(gzip.min_ratio > 0.0 && gzip.min_ratio <= 1.0) {
            diag.error(
                FieldPath::new("build.gzip_min_ratio"),
                format!(
                    "{}: ratio must be in (0, 1], got {}",
                    self.environment.as_str(),
                    gzip.min_ratio
                ),
            );
        }
        if gzip.enable && gzip.extensions.is_empty() {
            diag.error_with_hint(
                FieldPath::new("build.gzip_extensions"),
                format!(
                    "{}: gzip is enabled but no extension is listed",
                    self.environment.as_str()
                ),
                "e.g. gzip_extensions = [\"js\", \"css\"]",
            );
        }
        for ext in &gzip.extensions {
            if ext.is_empty() || ext.starts_with('.') {
                diag.error_with_hint(
                    FieldPath::new("build.gzip_extensions"),
                    format!("invalid extension `{ext}`"),
                    "write extensions without the leading dot, e.g. \"js\"",
                );
            }
        }
    }

    /// Source-map setting in the bundler's `devtool` form.
    pub fn devtool(&self) -> Value {
        if self.source_map {
            Value::String("#source-map".into())
        } else {
            Value::Bool(false)
        }
    }

    /// File-name test the bundler's compression plugin expects.
    pub fn gzip_pattern(&self) -> String {
        let alternatives: Vec<String> = self
            .gzip
            .extensions
            .iter()
            .map(|ext| regex::escape(ext))
            .collect();
        format!(r"\.({})$", alternatives.join("|"))
    }

    /// Options for the upstream bundler, emitted by `appbake config`.
    pub fn bundler_options(&self, output: &VersionedOutputPath) -> Value {
        let compression = if self.gzip.enable {
            json!({
                "asset": "[path].gz[query]",
                "algorithm": "gzip",
                "test": self.gzip_pattern(),
                "threshold": self.gzip.threshold,
                "minRatio": self.gzip.min_ratio,
            })
        } else {
            Value::Null
        };

        json!({
            "mode": self.environment.as_str(),
            "devtool": self.devtool(),
            "output": {
                "path": output.path().display().to_string(),
                "filename": self.script_filename,
                "chunkFilename": self.chunk_filename,
            },
            "css": { "filename": self.style_filename },
            "styleLoaders": {
                "sourceMap": self.style_source_map,
                "extract": self.style_extract,
            },
            "compression": compression,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(source_map: Option<bool>, gzip: Option<bool>) -> BuildConfiguration {
        BuildConfiguration {
            source_map,
            gzip,
            ..BuildConfiguration::default()
        }
    }

    #[test]
    fn test_compose_with_itself_is_identity() {
        let base = BuildConfiguration {
            source_map: Some(false),
            gzip_extensions: Some(vec!["js".into()]),
            filenames: FilenameTemplates {
                script: Some("[name].js".into()),
                ..FilenameTemplates::default()
            },
            style: StyleOptions {
                extract: Some(true),
                source_map: None,
            },
            ..BuildConfiguration::default()
        };
        assert_eq!(compose(base.clone(), base.clone()), base);
    }

    #[test]
    fn test_compose_overlay_wins() {
        let base = layer(Some(true), Some(false));
        let overlay = layer(Some(false), None);
        let composed = compose(base, overlay);
        assert_eq!(composed.source_map, Some(false));
        assert_eq!(composed.gzip, Some(false));
    }

    #[test]
    fn test_compose_nested_groups_merge_by_key() {
        let base = BuildConfiguration {
            style: StyleOptions {
                source_map: Some(true),
                extract: Some(true),
            },
            filenames: FilenameTemplates {
                script: Some("a.js".into()),
                chunk: Some("c.js".into()),
                style: None,
            },
            ..BuildConfiguration::default()
        };
        let overlay = BuildConfiguration {
            style: StyleOptions {
                source_map: None,
                extract: Some(false),
            },
            filenames: FilenameTemplates {
                chunk: Some("[id].js".into()),
                ..FilenameTemplates::default()
            },
            ..BuildConfiguration::default()
        };
        let composed = compose(base, overlay);
        assert_eq!(composed.style.source_map, Some(true));
        assert_eq!(composed.style.extract, Some(false));
        assert_eq!(composed.filenames.script.as_deref(), Some("a.js"));
        assert_eq!(composed.filenames.chunk.as_deref(), Some("[id].js"));
        assert_eq!(composed.filenames.style, None);
    }

    #[test]
    fn test_resolve_defaults() {
        let section = BuildSectionConfig::default();
        let prod = section.resolve(Environment::Production);
        assert!(prod.source_map);
        assert!(prod.minify);
        assert!(!prod.gzip.enable);
        assert_eq!(prod.gzip.threshold, 10_240);
        assert_eq!(prod.gzip.extensions, vec!["js", "css"]);
        assert_eq!(prod.script_filename, "[name].[chunkhash].js");

        let dev = section.resolve(Environment::Development);
        assert!(!dev.minify);
    }

    #[test]
    fn test_style_source_map_follows_top_level() {
        let section = BuildSectionConfig {
            base: layer(Some(false), None),
            ..BuildSectionConfig::default()
        };
        assert!(!section.resolve(Environment::Production).style_source_map);
    }

    #[test]
    fn test_devtool_and_gzip_pattern() {
        let mut section = BuildSectionConfig::default();
        section.base.gzip_extensions = Some(vec!["js".into(), "css".into(), "svg".into()]);
        let resolved = section.resolve(Environment::Production);
        assert_eq!(resolved.devtool(), Value::String("#source-map".into()));
        assert_eq!(resolved.gzip_pattern(), r"\.(js|css|svg)$");

        section.production.source_map = Some(false);
        assert_eq!(section.resolve(Environment::Production).devtool(), Value::Bool(false));
    }

    #[test]
    fn test_validate_reports_bad_ratio_and_extension() {
        let mut section = BuildSectionConfig::default();
        section.production.gzip_min_ratio = Some(1.5);
        section.base.gzip_extensions = Some(vec![".js".into()]);
        let mut diag = ConfigDiagnostics::new();
        section.validate(&mut diag);
        // ratio fails for production only, extension fails for both environments
        assert_eq!(diag.len(), 3);
    }

    #[test]
    fn test_parse_layers_from_toml() {
        let section: BuildSectionConfig = toml::from_str(
            r#"
            [base]
            gzip_extensions = ["js"]
            [production]
            gzip = true
            [production.style]
            extract = false
            "#,
        )
        .unwrap();
        let resolved = section.resolve(Environment::Production);
        assert!(resolved.gzip.enable);
        assert!(!resolved.style_extract);
        assert_eq!(resolved.gzip.extensions, vec!["js"]);
        // development overlay falls back to built-in defaults when not configured
        assert!(!section.resolve(Environment::Development).gzip.enable);
    }
}
