//! case::materials
//!
//! Material entry points.
//!
//! Mixtures own their species: each specie is a separate `materials` member
//! whose `specie/mixture` names the mixture, and the mixture's
//! `mixture/primarySpecie` names one of them. A mixture always keeps at
//! least two species, and adding one turns the species model on.
//!
//! The last material check counts mixtures and non-mixtures only. Species
//! go with their mixture, so they never keep a case from running out of
//! materials.

use crate::core::document::Value;
use crate::core::store::{DocumentRead, SimpleDb, StoreError};
use crate::core::types::DbEnum;
use crate::integrity::{IntegrityRegistry, IntegrityRejected};

use super::models::SPECIES_MODEL;
use super::schema::{MaterialType, Phase, SpeciesModel};
use super::{CaseDb, CaseError};

pub const MATERIALS: &str = "materials";

const LAST_MATERIAL: &str = "Material cannot be removed. At least one material is required.";
const TOO_FEW_SPECIES: &str = "A mixture requires at least two species.";

impl CaseDb {
    /// Add a single-substance material named after `base`.
    ///
    /// Returns the new material id.
    pub fn add_non_mixture(&mut self, base: &str, phase: Phase) -> Result<String, CaseError> {
        self.stage(|db, _| Ok(insert_material(db, base, MaterialType::Nonmixture, phase, None)?))
    }

    /// Add a mixture and one specie per entry of `species`.
    ///
    /// The first specie becomes the primary specie and the species model is
    /// turned on. Returns the mixture id.
    pub fn add_mixture(&mut self, name: &str, phase: Phase, species: &[&str]) -> Result<String, CaseError> {
        if species.len() < 2 {
            return Err(IntegrityRejected::refused(TOO_FEW_SPECIES).into());
        }

        self.stage(|db, _| {
            let mid = insert_material(db, name, MaterialType::Mixture, phase, None)?;
            let sids = species
                .iter()
                .map(|base| insert_material(db, base, MaterialType::Specie, phase, Some(&mid)))
                .collect::<Result<Vec<_>, _>>()?;
            if let Some(primary) = sids.first() {
                db.set_value(&format!("{MATERIALS}/{mid}/mixture/primarySpecie"), primary, None)?;
            }
            db.set_enum(SPECIES_MODEL, SpeciesModel::On)?;
            Ok(mid)
        })
    }

    /// Add a specie to an existing mixture. Returns the specie id.
    pub fn add_specie(&mut self, mixture: &str, base: &str) -> Result<String, CaseError> {
        self.stage(|db, registry| {
            if material_type(db, mixture)? != MaterialType::Mixture {
                return Err(StoreError::lookup_str(&material_path(mixture), "not a mixture").into());
            }
            let phase = db.get_enum::<Phase>(&format!("{}/phase", material_path(mixture)))?;
            let sid = insert_material(db, base, MaterialType::Specie, phase, Some(mixture))?;
            registry.specie_added(db, &sid, mixture)?;
            Ok(sid)
        })
    }

    /// Remove a non-mixture or a mixture together with its species.
    ///
    /// # Errors
    ///
    /// - `Store(Lookup)` if `mid` is unknown or names a specie
    /// - `Rejected` if it is the last material, or an observer vetoes
    pub fn remove_material(&mut self, mid: &str) -> Result<(), CaseError> {
        self.stage(|db, registry| {
            let kind = material_type(db, mid)?;
            if kind == MaterialType::Specie {
                return Err(StoreError::lookup_str(
                    &material_path(mid),
                    "species are removed with remove_specie",
                )
                .into());
            }
            ensure_materials_remain(db, &[mid])?;
            drop_material(db, registry, mid, kind)
        })
    }

    /// Remove one specie from its mixture.
    ///
    /// When the specie is the mixture's primary specie, the first remaining
    /// specie takes over that role.
    pub fn remove_specie(&mut self, sid: &str) -> Result<(), CaseError> {
        self.stage(|db, registry| {
            if material_type(db, sid)? != MaterialType::Specie {
                return Err(StoreError::lookup_str(&material_path(sid), "not a specie").into());
            }
            let mixture = db
                .get_value(&format!("{}/specie/mixture", material_path(sid)))?
                .map(str::to_string)
                .ok_or_else(|| StoreError::lookup_str(&material_path(sid), "specie has no mixture"))?;

            let species = species_of(db, &mixture)?;
            if species.len() <= 2 {
                return Err(IntegrityRejected::refused(TOO_FEW_SPECIES).into());
            }

            let primary_path = format!("{}/mixture/primarySpecie", material_path(&mixture));
            let new_primary = if db.get_value(&primary_path)? == Some(sid) {
                species.iter().find(|s| *s != sid).cloned()
            } else {
                None
            };

            registry.specie_removing(db, sid, new_primary.as_deref())?;

            if let Some(primary) = &new_primary {
                db.set_value(&primary_path, primary, None)?;
            }
            db.remove_element(MATERIALS, sid)?;
            Ok(())
        })
    }

    /// Ids of the species of `mixture`, primary specie first.
    pub fn species(&self, mixture: &str) -> Result<Vec<String>, CaseError> {
        Ok(mixture_species(&self.db, mixture)?)
    }
}

pub(crate) fn material_path(mid: &str) -> String {
    format!("{MATERIALS}/{mid}")
}

/// Type of material `mid`; `Lookup` if there is no such material.
pub(crate) fn material_type(db: &impl DocumentRead, mid: &str) -> Result<MaterialType, StoreError> {
    db.get_enum::<MaterialType>(&format!("{}/type", material_path(mid)))
}

pub(crate) fn material_name(db: &impl DocumentRead, mid: &str) -> Result<String, StoreError> {
    Ok(db
        .get_value(&format!("{}/name", material_path(mid)))?
        .unwrap_or_default()
        .to_string())
}

fn is_specie(member: &Value) -> bool {
    member.text("type") == Some(MaterialType::Specie.value())
}

fn specie_mixture(member: &Value) -> Option<&str> {
    member.field("specie").and_then(|s| s.text("mixture"))
}

/// Species of `mixture` in document order.
fn species_of(db: &impl DocumentRead, mixture: &str) -> Result<Vec<String>, StoreError> {
    db.get_keys_by(MATERIALS, |_, m| is_specie(m) && specie_mixture(m) == Some(mixture))
}

/// Species of `mid`, primary first, or nothing when `mid` is not a mixture.
pub(crate) fn mixture_species(db: &impl DocumentRead, mid: &str) -> Result<Vec<String>, StoreError> {
    if material_type(db, mid)? != MaterialType::Mixture {
        return Ok(Vec::new());
    }
    let mut species = species_of(db, mid)?;
    let primary = db.get_value(&format!("{}/mixture/primarySpecie", material_path(mid)))?;
    if let Some(index) = primary.and_then(|p| species.iter().position(|s| s == p)) {
        let primary = species.remove(index);
        species.insert(0, primary);
    }
    Ok(species)
}

/// Refuse when removing `mids` would leave no mixture or non-mixture.
pub(crate) fn ensure_materials_remain(db: &SimpleDb, mids: &[&str]) -> Result<(), CaseError> {
    let remaining = db.element_count_by(MATERIALS, |key, m| {
        !is_specie(m) && !mids.iter().any(|mid| *mid == key)
    })?;
    if remaining == 0 {
        return Err(IntegrityRejected::refused(LAST_MATERIAL).into());
    }
    Ok(())
}

/// Dispatch `material removing` for `mid`, then remove it and, for a
/// mixture, its species.
pub(crate) fn drop_material(
    db: &mut SimpleDb,
    registry: &IntegrityRegistry,
    mid: &str,
    kind: MaterialType,
) -> Result<(), CaseError> {
    registry.material_removing(db, mid)?;

    if kind == MaterialType::Mixture {
        db.remove_elements_by(MATERIALS, |_, m| specie_mixture(m) == Some(mid))?;
    }
    db.remove_element(MATERIALS, mid)?;
    Ok(())
}

fn insert_material(
    db: &mut SimpleDb,
    base: &str,
    kind: MaterialType,
    phase: Phase,
    mixture: Option<&str>,
) -> Result<String, StoreError> {
    let name = db.get_unique_value(MATERIALS, "name", base)?;
    let mut element = db.new_element(MATERIALS)?;
    element.set_text("name", &name, Some("Name"))?;
    element.set_enum("type", kind)?;
    element.set_enum("phase", phase)?;
    if let Some(mixture) = mixture {
        element.set_value("specie/mixture", mixture, None)?;
    }
    db.add_element(MATERIALS, element, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case() -> CaseDb {
        CaseDb::initial().unwrap()
    }

    #[test]
    fn names_are_made_unique() {
        let mut case = case();
        let a = case.add_non_mixture("water", Phase::Liquid).unwrap();
        let b = case.add_non_mixture("water", Phase::Liquid).unwrap();
        assert_eq!(material_name(case.db(), &a).unwrap(), "water");
        assert_eq!(material_name(case.db(), &b).unwrap(), "water1");
    }

    #[test]
    fn mixture_owns_species() {
        let mut case = case();
        let mix = case.add_mixture("fuel", Phase::Gas, &["CH4", "O2"]).unwrap();
        let species = case.species(&mix).unwrap();
        assert_eq!(species.len(), 2);
        assert_eq!(
            case.db()
                .get_value(&format!("materials/{mix}/mixture/primarySpecie"))
                .unwrap(),
            Some(species[0].as_str())
        );
        assert_eq!(material_type(case.db(), &species[1]).unwrap(), MaterialType::Specie);
    }

    #[test]
    fn mixture_needs_two_species() {
        let mut case = case();
        let err = case.add_mixture("fuel", Phase::Gas, &["CH4"]).unwrap_err();
        assert!(matches!(err, CaseError::Rejected(ref r) if r.channel.is_none()));
    }

    #[test]
    fn add_specie_requires_mixture() {
        let mut case = case();
        assert!(matches!(case.add_specie("1", "N2"), Err(CaseError::Store(_))));
        assert!(matches!(case.add_specie("99", "N2"), Err(CaseError::Store(_))));
    }

    #[test]
    fn removing_mixture_removes_species() {
        let mut case = case();
        let mix = case.add_mixture("fuel", Phase::Gas, &["CH4", "O2"]).unwrap();
        case.remove_material(&mix).unwrap();
        assert_eq!(case.db().get_keys("materials").unwrap(), vec!["1"]);
    }

    #[test]
    fn specie_cannot_be_removed_as_material() {
        let mut case = case();
        let mix = case.add_mixture("fuel", Phase::Gas, &["CH4", "O2"]).unwrap();
        let sid = case.species(&mix).unwrap()[0].clone();
        assert!(matches!(
            case.remove_material(&sid),
            Err(CaseError::Store(StoreError::Lookup { .. }))
        ));
    }

    #[test]
    fn last_material_stays() {
        let mut case = CaseDb::new().unwrap();
        let only = case.add_non_mixture("air", Phase::Gas).unwrap();
        let err = case.remove_material(&only).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Material cannot be removed. At least one material is required.");
    }

    #[test]
    fn species_do_not_count_as_remaining_materials() {
        let mut case = CaseDb::new().unwrap();
        let mix = case.add_mixture("fuel", Phase::Gas, &["CH4", "O2"]).unwrap();
        let before = case.to_yaml().unwrap();

        let err = case.remove_material(&mix).unwrap_err();
        assert!(matches!(err, CaseError::Rejected(ref r) if r.channel.is_none()));
        assert_eq!(case.to_yaml().unwrap(), before);
    }

    #[test]
    fn adding_a_mixture_turns_species_on() {
        let mut case = case();
        assert_eq!(case.db().get_enum::<SpeciesModel>(SPECIES_MODEL).unwrap(), SpeciesModel::Off);
        case.add_mixture("fuel", Phase::Gas, &["CH4", "O2"]).unwrap();
        assert_eq!(case.db().get_enum::<SpeciesModel>(SPECIES_MODEL).unwrap(), SpeciesModel::On);
    }

    #[test]
    fn removing_primary_specie_promotes_next() {
        let mut case = case();
        let mix = case.add_mixture("fuel", Phase::Gas, &["CH4", "O2", "N2"]).unwrap();
        let species = case.species(&mix).unwrap();

        case.remove_specie(&species[0]).unwrap();
        assert_eq!(case.species(&mix).unwrap(), species[1..].to_vec());

        let err = case.remove_specie(&species[1]).unwrap_err();
        assert!(matches!(err, CaseError::Rejected(_)));
    }
}
