//! get command - Print one value

use std::path::Path;

use anyhow::Result;

use super::{load_case, Context};
use crate::core::store::DocumentRead;

/// Print the value at `path`. An absent optional value prints nothing.
pub fn get(ctx: &Context, file: &Path, path: &str) -> Result<()> {
    let case = load_case(ctx, file)?;
    if let Some(value) = case.db().get_value(path)? {
        println!("{}", value);
    }
    Ok(())
}
