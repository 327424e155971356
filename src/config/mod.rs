//! Project configuration management for `appbake.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build] base + environment overlays
//! │   ├── cleanup    # [cleanup]
//! │   ├── deploy     # [deploy]
//! │   ├── icons      # [icons]
//! │   ├── patch      # [patch]
//! │   └── paths      # [paths]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! └── mod.rs         # ProjectConfig (this file)
//! ```
//!
//! A missing config file is not an error: every section has defaults, and the
//! project root falls back to the current directory.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    BuildConfiguration, BuildSectionConfig, CleanupConfig, DeployConfig, DeploymentMode,
    Environment, GzipOptions, IconsConfig, PatchConfig, PathsConfig, ResolvedBuild,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::cli::{Cli, Commands, FinalizeArgs};
use crate::{debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing appbake.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Selected build environment (CLI only)
    #[serde(skip)]
    pub environment: Environment,

    pub paths: PathsConfig,
    pub deploy: DeployConfig,
    pub build: BuildSectionConfig,
    pub icons: IconsConfig,
    pub patch: PatchConfig,
    pub cleanup: CleanupConfig,
}

impl ProjectConfig {
    /// Load configuration for the given CLI invocation.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, root) = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                let config = Self::from_path(&path)?;
                let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                (Self { config_path: path, ..config }, root)
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                (Self::default(), cwd)
            }
        };

        config.finalize(&root, cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let (config, ignored) = Self::parse_with_ignored(content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, Path::new("appbake.toml"));
        }
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "ignoring unknown fields in {}: {}", display_path, fields.join(", "));
    }

    /// Resolve paths and apply CLI overrides.
    fn finalize(&mut self, root: &Path, cli: &Cli) {
        let root = crate::utils::path::normalize_path(root);
        self.paths.normalize(&root);
        self.root = root;
        self.environment = cli.env;

        crate::logger::set_verbose(cli.verbose);

        if let Commands::Finalize { args } = &cli.command {
            self.apply_finalize_args(args);
        }
    }

    fn apply_finalize_args(&mut self, args: &FinalizeArgs) {
        Self::update_option(&mut self.deploy.mode, args.mode.as_ref());
        if let Some(gzip) = args.gzip {
            match self.environment {
                Environment::Production => self.build.production.gzip = Some(gzip),
                Environment::Development => self.build.development.gzip = Some(gzip),
            }
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate configuration, collecting every problem before failing.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.build.validate(&mut diag);
        self.patch.validate(&mut diag);
        self.cleanup.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Effective build options for the selected environment.
    pub fn resolved_build(&self) -> ResolvedBuild {
        self.build.resolve(self.environment)
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config and resolve its paths against `root`.
/// Panics on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_config(content: &str, root: &Path) -> ProjectConfig {
    let (mut parsed, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed.paths.normalize(root);
    parsed.root = root.to_path_buf();
    parsed
}
