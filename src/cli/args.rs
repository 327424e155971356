//! Command-line interface definitions.

use crate::config::{DeploymentMode, Environment};
use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Finalize bundled web app builds into versioned artifact directories
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: appbake.toml, searched upward from cwd)
    #[arg(short = 'C', long, global = true, default_value = "appbake.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Build environment whose overlay is applied
    #[arg(short, long, global = true, value_enum, default_value_t = Environment::Production)]
    pub env: Environment,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Finalize the bundle emitted by the bundler into build-<version>
    #[command(visible_alias = "f")]
    Finalize {
        #[command(flatten)]
        args: FinalizeArgs,
    },

    /// Print the icon/manifest <head> fragment for the page renderer
    Head,

    /// Print the resolved build options as JSON for the bundler
    Config,
}

/// Arguments of the finalize command
#[derive(clap::Args, Debug, Clone)]
pub struct FinalizeArgs {
    /// Bundler stats JSON (hash, outputPath, assets). Scans the bundle when omitted.
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub stats: Option<PathBuf>,

    /// Directory the bundler emitted into (default: the versioned output path)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub bundle: Option<PathBuf>,

    /// Deployment mode (overrides `[deploy] mode`)
    #[arg(short, long, value_enum)]
    pub mode: Option<DeploymentMode>,

    /// Emit gzip siblings (overrides the build option)
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub gzip: Option<bool>,
}

impl Cli {
    pub const fn is_finalize(&self) -> bool {
        matches!(self.command, Commands::Finalize { .. })
    }
}
