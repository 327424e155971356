//! `appbake head`: the `<head>` fragment for the page renderer.

use crate::{app::AppDescriptor, config::ProjectConfig, generator::manifest::head_tags};
use anyhow::Result;

pub fn print_head(config: &ProjectConfig) -> Result<()> {
    let app = AppDescriptor::load(&config.paths.descriptor())?;
    println!("{}", head_tags(&app));
    Ok(())
}
