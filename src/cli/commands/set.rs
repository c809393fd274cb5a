//! set command - Validate and write one value

use std::path::Path;

use anyhow::Result;

use super::{load_case, save_case, Context};
use crate::ui::output;

pub fn set(ctx: &Context, file: &Path, path: &str, value: &str) -> Result<()> {
    let mut case = load_case(ctx, file)?;
    let changed = case.edit(|db| db.set_value(path, value, None))?;
    save_case(ctx, file, &case)?;

    if changed {
        output::status(format!("Set {} = {}", path, value), ctx.verbosity());
    } else {
        output::status(format!("{} unchanged", path), ctx.verbosity());
    }
    Ok(())
}
