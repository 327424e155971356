//! `appbake config`: resolved build options for the bundler, as JSON.

use crate::{app::AppDescriptor, config::ProjectConfig, output};
use anyhow::{Context, Result};

pub fn print_options(config: &ProjectConfig) -> Result<()> {
    let app = AppDescriptor::load(&config.paths.descriptor())?;
    let output = output::resolve(&config.paths.output, &app.version)?;
    let options = config.resolved_build().bundler_options(&output);
    let json = serde_json::to_string_pretty(&options).context("Failed to serialize build options")?;
    println!("{json}");
    Ok(())
}
