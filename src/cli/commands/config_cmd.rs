//! config command - Show or set configuration values

use anyhow::{Context as _, Result};

use super::Context;
use crate::core::config::Config;
use crate::ui::output;

/// Print the effective configuration and where it came from.
pub fn show(ctx: &Context) -> Result<()> {
    match ctx.config.loaded_from() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# defaults (no config file)"),
    }
    println!("load.fill_with_default = {}", ctx.config.fill_with_default());
    println!("output.format = {}", ctx.config.output_format());
    Ok(())
}

/// Set a value in the canonical config file.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let path = Config::config_path()?;
    let mut file = if path.exists() {
        Config::load_from(&path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?
            .file
    } else {
        Default::default()
    };

    file.set(key, value)?;
    Config::write(&path, &file).context("Failed to write config")?;

    output::status(format!("Set {} = {}", key, value), ctx.verbosity());
    Ok(())
}
