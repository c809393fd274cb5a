//! dump command - Print the document or a part of it

use std::path::Path;

use anyhow::Result;

use super::{load_case, Context};
use crate::core::config::OutputFormat;
use crate::core::document::Value;
use crate::core::store::DocumentRead;

/// Print the sub-document at `path` in `format`, or the configured format.
pub fn dump(ctx: &Context, file: &Path, path: Option<&str>, format: Option<OutputFormat>) -> Result<()> {
    let case = load_case(ctx, file)?;
    let view = case.db().get_view(path.unwrap_or(""))?;
    let format = format.unwrap_or_else(|| ctx.config.output_format());
    print!("{}", render(view.raw(), format)?);
    Ok(())
}

fn render(value: &Value, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json => serde_json::to_string_pretty(value)? + "\n",
    })
}
