//! material command - Add and remove materials through the case entry points

use std::path::Path;

use anyhow::Result;

use super::{load_case, save_case, Context};
use crate::case::{MaterialType, Phase, TransportSpecification};
use crate::core::store::DocumentRead;
use crate::ui::output;

pub fn add(ctx: &Context, file: &Path, name: &str, phase: Phase) -> Result<()> {
    let mut case = load_case(ctx, file)?;
    let mid = case.add_non_mixture(name, phase)?;
    save_case(ctx, file, &case)?;
    output::status(format!("Added material {mid}"), ctx.verbosity());
    Ok(())
}

pub fn add_mixture(ctx: &Context, file: &Path, name: &str, species: &[String], phase: Phase) -> Result<()> {
    let mut case = load_case(ctx, file)?;
    let species: Vec<&str> = species.iter().map(String::as_str).collect();
    let mid = case.add_mixture(name, phase, &species)?;
    let sids = case.species(&mid)?;
    save_case(ctx, file, &case)?;
    output::status(
        format!("Added mixture {mid} with species {}", sids.join(", ")),
        ctx.verbosity(),
    );
    Ok(())
}

pub fn add_specie(ctx: &Context, file: &Path, mixture: &str, name: &str) -> Result<()> {
    let mut case = load_case(ctx, file)?;
    let sid = case.add_specie(mixture, name)?;
    save_case(ctx, file, &case)?;
    output::status(format!("Added specie {sid} to mixture {mixture}"), ctx.verbosity());
    Ok(())
}

/// Remove a material, or a specie when `id` names one.
pub fn remove(ctx: &Context, file: &Path, id: &str) -> Result<()> {
    let mut case = load_case(ctx, file)?;
    let kind = case.db().get_enum::<MaterialType>(&format!("materials/{id}/type"))?;
    let what = match kind {
        MaterialType::Specie => {
            case.remove_specie(id)?;
            "specie"
        }
        MaterialType::Nonmixture | MaterialType::Mixture => {
            case.remove_material(id)?;
            "material"
        }
    };
    save_case(ctx, file, &case)?;
    output::status(format!("Removed {what} {id}"), ctx.verbosity());
    Ok(())
}

pub fn set_transport(
    ctx: &Context,
    file: &Path,
    id: &str,
    specification: TransportSpecification,
) -> Result<()> {
    let mut case = load_case(ctx, file)?;
    if case.set_transport_specification(id, specification)? {
        save_case(ctx, file, &case)?;
        output::status(format!("Material {id} viscosity is {specification}"), ctx.verbosity());
    } else {
        output::status(format!("Material {id} viscosity unchanged"), ctx.verbosity());
    }
    Ok(())
}
