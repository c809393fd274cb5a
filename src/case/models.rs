//! case::models
//!
//! Physics model switches, and the guard that keeps material transport
//! settings valid for the turbulence model.
//!
//! Turning the species model off removes every mixture with its species.
//! Non-Newtonian viscosity models are only allowed for liquids while the
//! flow is laminar.

use crate::core::store::{DocumentRead, SimpleDb};
use crate::core::types::DbEnum;
use crate::integrity::{Channel, IntegrityRejected, ModelObserver, ObserverError};

use super::materials::{drop_material, ensure_materials_remain, material_path, MATERIALS};
use super::schema::{MaterialType, Phase, SpeciesModel, TransportSpecification, TurbulenceModel};
use super::{CaseDb, CaseError};

pub const SPECIES_MODEL: &str = "models/speciesModels";
pub const TURBULENCE_MODEL: &str = "models/turbulenceModels/model";

const NON_NEWTONIAN_NEEDS_LAMINAR: &str =
    "Non-newtonian material is configured, and turbulence model must be laminar.";
const NON_NEWTONIAN_NEEDS_LIQUID: &str = "Non-newtonian viscosity is only available for liquids.";

impl CaseDb {
    pub fn species_model(&self) -> Result<SpeciesModel, CaseError> {
        Ok(self.db.get_enum(SPECIES_MODEL)?)
    }

    /// Turn the species model on or off. Returns whether it changed.
    ///
    /// # Errors
    ///
    /// - `Rejected` if a region is made of a mixture, a scalar is bound to
    ///   one, or the mixtures are the only materials left
    pub fn set_species_model(&mut self, model: SpeciesModel) -> Result<bool, CaseError> {
        if self.species_model()? == model {
            return Ok(false);
        }

        self.stage(|db, registry| {
            if model == SpeciesModel::Off {
                let mixtures = db.get_keys_by(MATERIALS, |_, m| {
                    m.text("type") == Some(MaterialType::Mixture.value())
                })?;
                registry.species_model_turning_off(db, &mixtures)?;

                let ids: Vec<&str> = mixtures.iter().map(String::as_str).collect();
                if !ids.is_empty() {
                    ensure_materials_remain(db, &ids)?;
                }
                for mid in &ids {
                    drop_material(db, registry, mid, MaterialType::Mixture)?;
                }
            }
            db.set_enum(SPECIES_MODEL, model)?;
            Ok(true)
        })
    }

    pub fn turbulence_model(&self) -> Result<TurbulenceModel, CaseError> {
        Ok(self.db.get_enum(TURBULENCE_MODEL)?)
    }

    /// Select the turbulence model. Returns whether it changed.
    pub fn set_turbulence_model(&mut self, model: TurbulenceModel) -> Result<bool, CaseError> {
        if self.turbulence_model()? == model {
            return Ok(false);
        }

        self.stage(|db, registry| {
            registry.turbulence_model_updating(db, model)?;
            db.set_enum(TURBULENCE_MODEL, model)?;
            Ok(true)
        })
    }

    /// Set how the viscosity of material `mid` is specified. Returns
    /// whether it changed.
    pub fn set_transport_specification(
        &mut self,
        mid: &str,
        specification: TransportSpecification,
    ) -> Result<bool, CaseError> {
        self.stage(|db, _| {
            let base = material_path(mid);
            let phase = db.get_enum::<Phase>(&format!("{base}/phase"))?;
            if specification.is_non_newtonian() {
                if phase != Phase::Liquid {
                    return Err(IntegrityRejected::refused(NON_NEWTONIAN_NEEDS_LIQUID).into());
                }
                if db.get_enum::<TurbulenceModel>(TURBULENCE_MODEL)? != TurbulenceModel::Laminar {
                    return Err(IntegrityRejected::refused(NON_NEWTONIAN_NEEDS_LAMINAR).into());
                }
            }
            Ok(db.set_enum(&format!("{base}/transport/specification"), specification)?)
        })
    }
}

/// Vetoes leaving laminar flow while a material uses a non-Newtonian
/// viscosity model.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportGuard;

impl ModelObserver for TransportGuard {
    fn turbulence_model_updating(
        &self,
        db: &mut SimpleDb,
        model: TurbulenceModel,
    ) -> Result<(), ObserverError> {
        if model == TurbulenceModel::Laminar {
            return Ok(());
        }
        let non_newtonian = db.element_count_by(MATERIALS, |_, m| {
            m.field("transport")
                .and_then(|t| t.text("specification"))
                .and_then(TransportSpecification::parse)
                .is_some_and(TransportSpecification::is_non_newtonian)
        })?;
        if non_newtonian > 0 {
            return Err(
                IntegrityRejected::new(Channel::TurbulenceModelUpdating, NON_NEWTONIAN_NEEDS_LAMINAR).into(),
            );
        }
        Ok(())
    }
}
