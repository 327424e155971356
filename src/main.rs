//! appbake - finalize bundled web app builds into versioned artifact directories.

#![allow(dead_code)]

mod app;
mod cleanup;
mod cli;
mod compress;
mod config;
mod error;
mod generator;
mod icon;
mod logger;
mod output;
mod patch;
mod pipeline;
mod stats;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::ProjectConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = ProjectConfig::load(&cli)?;

    match &cli.command {
        Commands::Finalize { args } => cli::finalize::finalize(&config, args),
        Commands::Head => cli::head::print_head(&config),
        Commands::Config => cli::options::print_options(&config),
    }
}
