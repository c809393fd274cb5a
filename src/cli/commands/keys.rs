//! keys command - List the keys of a collection

use std::path::Path;

use anyhow::Result;

use super::{load_case, Context};
use crate::core::store::DocumentRead;

pub fn keys(ctx: &Context, file: &Path, path: &str) -> Result<()> {
    let case = load_case(ctx, file)?;
    for key in case.db().get_keys(path)? {
        println!("{}", key);
    }
    Ok(())
}
