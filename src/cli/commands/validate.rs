//! validate command - Check a case file against the case schema

use std::path::Path;

use anyhow::Result;

use super::{load_case, Context};
use crate::core::store::DocumentRead;
use crate::ui::output;

pub fn validate(ctx: &Context, file: &Path) -> Result<()> {
    let case = load_case(ctx, file)?;
    let db = case.db();
    output::status(
        format!(
            "{} is valid: {} materials, {} regions, {} user-defined scalars",
            file.display(),
            db.element_count("materials")?,
            db.element_count("region")?,
            db.element_count("userDefinedScalars")?,
        ),
        ctx.verbosity(),
    );
    Ok(())
}
