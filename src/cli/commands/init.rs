//! init command - Create a new case file

use std::path::Path;

use anyhow::{bail, Result};

use super::{save_case, Context};
use crate::case::CaseDb;
use crate::ui::output;

/// Write a fresh case to `file`.
pub fn init(ctx: &Context, file: &Path, force: bool) -> Result<()> {
    if file.exists() && !force {
        bail!(
            "'{}' already exists. Use --force to overwrite it.",
            file.display()
        );
    }

    let case = CaseDb::initial()?;
    save_case(ctx, file, &case)?;

    output::status(format!("Created {}", file.display()), ctx.verbosity());
    Ok(())
}
