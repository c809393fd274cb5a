//! scalar command - Add and remove user-defined scalars

use std::path::Path;

use anyhow::Result;

use super::{load_case, save_case, Context};
use crate::ui::output;

pub fn add(
    ctx: &Context,
    file: &Path,
    field_name: &str,
    region: Option<&str>,
    material: Option<&str>,
) -> Result<()> {
    let mut case = load_case(ctx, file)?;
    let id = case.add_scalar(field_name, region, material)?;
    save_case(ctx, file, &case)?;
    output::status(format!("Added scalar {id} ({})", field_name.trim()), ctx.verbosity());
    Ok(())
}

pub fn remove(ctx: &Context, file: &Path, id: &str) -> Result<()> {
    let mut case = load_case(ctx, file)?;
    case.remove_scalar(id)?;
    save_case(ctx, file, &case)?;
    output::status(format!("Removed scalar {id}"), ctx.verbosity());
    Ok(())
}
