//! case::scalars
//!
//! User-defined scalar entry points and the guard that keeps scalar
//! materials alive.

use crate::core::store::{DocumentRead, SimpleDb, StoreError};
use crate::integrity::{Channel, IntegrityRejected, MaterialObserver, ObserverError};

use super::materials::{material_name, material_path, material_type, mixture_species};
use super::schema::MaterialType;
use super::regions::REGIONS;
use super::{CaseDb, CaseError};

pub const SCALARS: &str = "userDefinedScalars";

impl CaseDb {
    /// Add a user-defined scalar, optionally bound to a region and a
    /// material. Returns the scalar id.
    ///
    /// Every cell zone and boundary receives entries for the new scalar.
    pub fn add_scalar(
        &mut self,
        field_name: &str,
        region: Option<&str>,
        material: Option<&str>,
    ) -> Result<String, CaseError> {
        self.stage(|db, registry| {
            if db.element_count_by(SCALARS, |_, s| s.text("fieldName") == Some(field_name.trim()))? > 0 {
                return Err(IntegrityRejected::refused(format!(
                    "Field name {} is already in use.",
                    field_name.trim()
                ))
                .into());
            }
            if let Some(region) = region {
                if !db.has_element(REGIONS, region)? {
                    return Err(StoreError::key(REGIONS, region, "not found").into());
                }
            }
            if let Some(material) = material {
                if material_type(db, material)? == MaterialType::Specie {
                    return Err(StoreError::lookup_str(
                        &material_path(material),
                        "a specie cannot be the material of a user-defined scalar",
                    )
                    .into());
                }
            }

            let mut scalar = db.new_element(SCALARS)?;
            scalar.set_text("fieldName", field_name, Some("Field Name"))?;
            if let Some(region) = region {
                scalar.set_value("region", region, Some("Region"))?;
            }
            if let Some(material) = material {
                scalar.set_value("material", material, Some("Material"))?;
            }
            let id = db.add_element(SCALARS, scalar, None)?;

            registry.scalar_added(db, &id)?;
            Ok(id)
        })
    }

    /// Remove a user-defined scalar and every entry that refers to it.
    pub fn remove_scalar(&mut self, id: &str) -> Result<(), CaseError> {
        self.stage(|db, registry| {
            if !db.has_element(SCALARS, id)? {
                return Err(StoreError::key(SCALARS, id, "not found").into());
            }
            registry.scalar_removing(db, id)?;
            db.remove_element(SCALARS, id)?;
            Ok(())
        })
    }

    /// Remove every user-defined scalar. Returns whether any existed.
    pub fn clear_scalars(&mut self) -> Result<bool, CaseError> {
        self.stage(|db, registry| {
            let ids = db.get_keys(SCALARS)?;
            for id in &ids {
                registry.scalar_removing(db, id)?;
            }
            db.remove_all_elements(SCALARS)?;
            Ok(!ids.is_empty())
        })
    }
}

/// Vetoes removal of a material that a user-defined scalar is bound to.
///
/// A mixture counts as bound when a scalar names it or one of its species.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarMaterialGuard;

impl ScalarMaterialGuard {
    fn refuse_if_bound(
        db: &SimpleDb,
        channel: Channel,
        mid: &str,
        bound: &[String],
    ) -> Result<(), ObserverError> {
        let users: Vec<String> = db
            .get_elements_by(SCALARS, |_, s| {
                s.text("material").is_some_and(|m| bound.iter().any(|b| b == m))
            })?
            .values()
            .filter_map(|s| s.raw().text("fieldName").map(str::to_string))
            .collect();
        if users.is_empty() {
            return Ok(());
        }
        Err(IntegrityRejected::new(
            channel,
            format!(
                "{} is referenced by user-defined scalars {}",
                material_name(db, mid)?,
                users.join(" ")
            ),
        )
        .into())
    }
}

impl MaterialObserver for ScalarMaterialGuard {
    fn material_removing(&self, db: &mut SimpleDb, mid: &str) -> Result<(), ObserverError> {
        let mut bound = mixture_species(db, mid)?;
        bound.push(mid.to_string());
        Self::refuse_if_bound(db, Channel::MaterialRemoving, mid, &bound)
    }

    fn specie_removing(
        &self,
        db: &mut SimpleDb,
        mid: &str,
        _primary_specie: Option<&str>,
    ) -> Result<(), ObserverError> {
        Self::refuse_if_bound(db, Channel::SpecieRemoving, mid, &[mid.to_string()])
    }
}
