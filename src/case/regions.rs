//! case::regions
//!
//! Region entry points and the guard that keeps region materials alive.
//!
//! The guard also keeps the species model on while a region is made of a
//! mixture.

use std::collections::BTreeSet;

use tracing::debug;

use crate::core::store::{DocumentRead, SimpleDb, StoreError};
use crate::integrity::{
    Channel, IntegrityRejected, MaterialObserver, ModelObserver, ObserverError, RegionMaterials,
};

use super::cell_zones::insert_cell_zone;
use super::materials::{material_name, material_type, mixture_species};
use super::schema::{MaterialType, CELL_ZONE_NAME_FOR_REGION};
use super::{CaseDb, CaseError};

pub const REGIONS: &str = "region";

impl CaseDb {
    /// Add a region named `name` made of `material`, with one cell zone
    /// covering all of it.
    pub fn add_region(&mut self, name: &str, material: &str) -> Result<(), CaseError> {
        self.stage(|db, _| {
            ensure_region_material(db, material)?;
            db.add_new_element(REGIONS, Some(name))?;
            db.set_value(&format!("{REGIONS}/{name}/material"), material, Some("Material"))?;
            insert_cell_zone(db, name, CELL_ZONE_NAME_FOR_REGION)?;
            debug!(region = name, material, "region added");
            Ok(())
        })
    }

    /// Reassign the primary and secondary materials of `region`.
    ///
    /// Returns `false` without dispatching when neither the primary nor the
    /// set of secondaries changes.
    pub fn update_region_materials(
        &mut self,
        region: &str,
        primary: &str,
        secondaries: &[&str],
    ) -> Result<bool, CaseError> {
        let base = format!("{REGIONS}/{region}");
        let current_primary = self.db.get_value(&format!("{base}/material"))?;
        let current: BTreeSet<&str> = self
            .db
            .get_array(&format!("{base}/secondaryMaterials"))?
            .into_iter()
            .flatten()
            .collect();
        let requested: BTreeSet<&str> = secondaries.iter().copied().collect();
        if current_primary == Some(primary) && current == requested {
            return Ok(false);
        }

        self.stage(|db, registry| {
            ensure_region_material(db, primary)?;
            for secondary in &requested {
                ensure_region_material(db, secondary)?;
                if *secondary == primary {
                    return Err(StoreError::lookup_str(
                        &format!("{base}/secondaryMaterials"),
                        format!("material {primary} is already the primary material"),
                    )
                    .into());
                }
            }

            let mut seen = BTreeSet::new();
            let secondaries: Vec<String> = secondaries
                .iter()
                .filter(|s| seen.insert(**s))
                .map(|s| s.to_string())
                .collect();
            let species = mixture_species(db, primary)?;
            registry.materials_updating(
                db,
                &RegionMaterials {
                    region,
                    primary,
                    secondaries: &secondaries,
                    species: &species,
                },
            )?;

            db.set_value(&format!("{base}/material"), primary, Some("Material"))?;
            let items: Vec<&str> = secondaries.iter().map(String::as_str).collect();
            db.set_array(&format!("{base}/secondaryMaterials"), &items, Some("Secondary Materials"))?;
            Ok(true)
        })
    }

    pub fn region_names(&self) -> Result<Vec<String>, CaseError> {
        Ok(self.db.get_keys(REGIONS)?)
    }
}

/// A region can only be made of an existing material that is not a specie.
fn ensure_region_material(db: &SimpleDb, mid: &str) -> Result<(), StoreError> {
    if material_type(db, mid)? == MaterialType::Specie {
        return Err(StoreError::lookup_str(
            &format!("materials/{mid}"),
            "a specie cannot be the material of a region",
        ));
    }
    Ok(())
}

/// Vetoes removal of a material that a region is made of.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionMaterialGuard;

impl MaterialObserver for RegionMaterialGuard {
    fn material_removing(&self, db: &mut SimpleDb, mid: &str) -> Result<(), ObserverError> {
        let users = db.get_keys_by(REGIONS, |_, region| {
            region.text("material") == Some(mid)
                || region
                    .field("secondaryMaterials")
                    .and_then(|s| s.as_array())
                    .is_some_and(|items| items.iter().any(|item| item.as_str() == Some(mid)))
        })?;
        if let Some(region) = users.first() {
            return Err(IntegrityRejected::new(
                Channel::MaterialRemoving,
                format!("{} is set as material of region {region}", material_name(db, mid)?),
            )
            .into());
        }
        Ok(())
    }
}

impl ModelObserver for RegionMaterialGuard {
    fn species_model_turning_off(
        &self,
        db: &mut SimpleDb,
        mixtures: &[String],
    ) -> Result<(), ObserverError> {
        let users = db.get_keys_by(REGIONS, |_, region| {
            region
                .text("material")
                .is_some_and(|m| mixtures.iter().any(|mixture| mixture == m))
        })?;
        let Some(region) = users.first() else {
            return Ok(());
        };
        let mid = db
            .get_value(&format!("{REGIONS}/{region}/material"))?
            .unwrap_or_default()
            .to_string();
        Err(IntegrityRejected::new(
            Channel::SpeciesModelTurningOff,
            format!(
                "Cannot turn off specie model, Mixture {} is material of region {region}.",
                material_name(db, &mid)?
            ),
        )
        .into())
    }
}
