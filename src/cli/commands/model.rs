//! model command - Switch physics models through the case entry points

use std::path::Path;

use anyhow::Result;

use super::{load_case, save_case, Context};
use crate::case::{SpeciesModel, TurbulenceModel};
use crate::core::store::DocumentRead;
use crate::ui::output;

pub fn species(ctx: &Context, file: &Path, state: SpeciesModel) -> Result<()> {
    let mut case = load_case(ctx, file)?;
    let before = case.db().element_count("materials")?;
    if !case.set_species_model(state)? {
        output::status(format!("Species model already {state}"), ctx.verbosity());
        return Ok(());
    }
    let removed = before - case.db().element_count("materials")?;
    save_case(ctx, file, &case)?;

    if removed > 0 {
        output::status(
            format!("Species model {state}; removed {removed} mixture and specie entries"),
            ctx.verbosity(),
        );
    } else {
        output::status(format!("Species model {state}"), ctx.verbosity());
    }
    Ok(())
}

pub fn turbulence(ctx: &Context, file: &Path, model: TurbulenceModel) -> Result<()> {
    let mut case = load_case(ctx, file)?;
    if case.set_turbulence_model(model)? {
        save_case(ctx, file, &case)?;
        output::status(format!("Turbulence model {model}"), ctx.verbosity());
    } else {
        output::status(format!("Turbulence model already {model}"), ctx.verbosity());
    }
    Ok(())
}
