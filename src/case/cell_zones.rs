//! case::cell_zones
//!
//! Cell zones and the observer that keeps their per-material and
//! per-scalar entries in step with the rest of the case.
//!
//! Every zone carries
//! - `sourceTerms/materials/<mid>` for each secondary material and each
//!   specie of its region's mixture,
//! - `fixedValues/species/<mid>` for each specie of that mixture,
//! - `sourceTerms/userDefinedScalars/<id>` and
//!   `fixedValues/userDefinedScalars/<id>` for every scalar.

use std::collections::BTreeSet;

use tracing::debug;

use crate::core::store::{DocumentRead, SimpleDb, StoreError};
use crate::integrity::{
    MaterialObserver, ObserverError, RegionMaterialObserver, RegionMaterials, ScalarObserver,
};

use super::materials::mixture_species;
use super::regions::REGIONS;
use super::{
    add_if_missing, all_regions, edit_region_members, remove_if_present, scalar_ids,
    secondary_materials, CaseDb, CaseError,
};

const CELL_ZONES: &str = "cellZones";
const MATERIAL_SOURCES: &str = "sourceTerms/materials";
const SCALAR_SOURCES: &str = "sourceTerms/userDefinedScalars";
const SPECIE_VALUES: &str = "fixedValues/species";
const SCALAR_VALUES: &str = "fixedValues/userDefinedScalars";

impl CaseDb {
    /// Add a cell zone to `region`. Returns the zone id.
    pub fn add_cell_zone(&mut self, region: &str, name: &str) -> Result<String, CaseError> {
        self.stage(|db, _| Ok(insert_cell_zone(db, region, name)?))
    }
}

/// Insert a zone into `region` with every entry the case currently calls for.
///
/// Zone names are unique within their region.
pub(crate) fn insert_cell_zone(db: &mut SimpleDb, region: &str, name: &str) -> Result<String, StoreError> {
    let zones = format!("{REGIONS}/{region}/{CELL_ZONES}");
    if db.element_count_by(&zones, |_, zone| zone.text("name") == Some(name))? > 0 {
        return Err(StoreError::key(&zones, name, "already exists"));
    }

    let mut zone = db.new_element(&zones)?;
    zone.set_text("name", name, Some("Name"))?;
    let czid = db.add_element(&zones, zone, None)?;

    let primary = db
        .get_value(&format!("{REGIONS}/{region}/material"))?
        .map(str::to_string)
        .unwrap_or_default();
    let species = mixture_species(db, &primary)?;
    let secondaries = secondary_materials(db, region)?;
    let scalars = scalar_ids(db)?;

    let mut zone = db.checkout(&format!("{zones}/{czid}"))?;
    for mid in secondaries.iter().chain(&species) {
        add_if_missing(&mut zone, MATERIAL_SOURCES, mid)?;
    }
    for mid in &species {
        add_if_missing(&mut zone, SPECIE_VALUES, mid)?;
    }
    for id in &scalars {
        add_scalar_entries(&mut zone, id)?;
    }
    db.commit(zone)?;

    debug!(region, zone = %czid, name, "cell zone added");
    Ok(czid)
}

fn add_scalar_entries(zone: &mut SimpleDb, scalar_id: &str) -> Result<(), StoreError> {
    add_if_missing(zone, SCALAR_SOURCES, scalar_id)?;
    add_if_missing(zone, SCALAR_VALUES, scalar_id)
}

/// Keeps cell zone entries aligned with materials, species and scalars.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellZoneObserver;

impl MaterialObserver for CellZoneObserver {
    fn specie_added(&self, db: &mut SimpleDb, mid: &str, mixture: &str) -> Result<(), ObserverError> {
        edit_region_members(
            db,
            CELL_ZONES,
            |_, region| region.text("material") == Some(mixture),
            |zone| {
                add_if_missing(zone, MATERIAL_SOURCES, mid)?;
                add_if_missing(zone, SPECIE_VALUES, mid)
            },
        )?;
        Ok(())
    }

    fn specie_removing(
        &self,
        db: &mut SimpleDb,
        mid: &str,
        _primary_specie: Option<&str>,
    ) -> Result<(), ObserverError> {
        edit_region_members(db, CELL_ZONES, all_regions, |zone| {
            remove_if_present(zone, MATERIAL_SOURCES, mid)?;
            remove_if_present(zone, SPECIE_VALUES, mid)
        })?;
        Ok(())
    }
}

impl RegionMaterialObserver for CellZoneObserver {
    fn materials_updating(&self, db: &mut SimpleDb, update: &RegionMaterials<'_>) -> Result<(), ObserverError> {
        let wanted: BTreeSet<&str> = update
            .secondaries
            .iter()
            .chain(update.species)
            .map(String::as_str)
            .collect();

        edit_region_members(
            db,
            CELL_ZONES,
            |name, _| name == update.region,
            |zone| {
                zone.remove_elements_by(MATERIAL_SOURCES, |mid, _| !wanted.contains(mid))?;
                for mid in update.secondaries.iter().chain(update.species) {
                    add_if_missing(zone, MATERIAL_SOURCES, mid)?;
                }

                zone.remove_all_elements(SPECIE_VALUES)?;
                for mid in update.species {
                    add_if_missing(zone, SPECIE_VALUES, mid)?;
                }
                Ok(())
            },
        )?;
        Ok(())
    }
}

impl ScalarObserver for CellZoneObserver {
    fn scalar_added(&self, db: &mut SimpleDb, scalar_id: &str) -> Result<(), ObserverError> {
        edit_region_members(db, CELL_ZONES, all_regions, |zone| {
            add_scalar_entries(zone, scalar_id)
        })?;
        Ok(())
    }

    fn scalar_removing(&self, db: &mut SimpleDb, scalar_id: &str) -> Result<(), ObserverError> {
        edit_region_members(db, CELL_ZONES, all_regions, |zone| {
            remove_if_present(zone, SCALAR_SOURCES, scalar_id)?;
            remove_if_present(zone, SCALAR_VALUES, scalar_id)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::Phase;

    fn zone_keys(case: &CaseDb, zone: &str, collection: &str) -> Vec<String> {
        case.db()
            .get_keys(&format!("region/region0/cellZones/{zone}/{collection}"))
            .unwrap()
    }

    fn mixture_case() -> (CaseDb, String, Vec<String>) {
        let mut case = CaseDb::initial().unwrap();
        let mix = case.add_mixture("fuel", Phase::Gas, &["CH4", "O2", "N2"]).unwrap();
        case.update_region_materials("region0", &mix, &[]).unwrap();
        let species = case.species(&mix).unwrap();
        (case, mix, species)
    }

    #[test]
    fn zone_names_unique_per_region() {
        let mut case = CaseDb::initial().unwrap();
        assert_eq!(case.add_cell_zone("region0", "inner").unwrap(), "2");
        let err = case.add_cell_zone("region0", "inner").unwrap_err();
        assert!(matches!(err, CaseError::Store(StoreError::Key { .. })));
    }

    #[test]
    fn mixture_region_gets_specie_entries() {
        let (case, _, species) = mixture_case();
        assert_eq!(zone_keys(&case, "1", MATERIAL_SOURCES), species);
        assert_eq!(zone_keys(&case, "1", SPECIE_VALUES), species);
        assert!(case
            .db()
            .get_bool(&format!("region/region0/cellZones/1/{SPECIE_VALUES}/{}/disabled", species[0]))
            .unwrap());
    }

    #[test]
    fn new_zone_copies_current_entries() {
        let (mut case, _, species) = mixture_case();
        let scalar = case.add_scalar("age", None, None).unwrap();
        let czid = case.add_cell_zone("region0", "porous").unwrap();
        assert_eq!(zone_keys(&case, &czid, SPECIE_VALUES), species);
        assert_eq!(zone_keys(&case, &czid, SCALAR_SOURCES), vec![scalar.clone()]);
        assert_eq!(zone_keys(&case, &czid, SCALAR_VALUES), vec![scalar]);
    }

    #[test]
    fn specie_lifecycle_follows_zones() {
        let (mut case, mix, species) = mixture_case();
        let added = case.add_specie(&mix, "H2O").unwrap();
        assert!(zone_keys(&case, "1", SPECIE_VALUES).contains(&added));

        case.remove_specie(&species[1]).unwrap();
        let sources = zone_keys(&case, "1", MATERIAL_SOURCES);
        assert!(!sources.contains(&species[1]));
        assert!(sources.contains(&added));
    }

    #[test]
    fn switching_to_plain_material_prunes_species() {
        let (mut case, _, _) = mixture_case();
        let water = case.add_non_mixture("water", Phase::Liquid).unwrap();
        case.update_region_materials("region0", "1", &[&water]).unwrap();
        assert_eq!(zone_keys(&case, "1", MATERIAL_SOURCES), vec![water]);
        assert!(zone_keys(&case, "1", SPECIE_VALUES).is_empty());
    }

    #[test]
    fn changing_secondaries_keeps_species() {
        let (mut case, mix, species) = mixture_case();
        let water = case.add_non_mixture("water", Phase::Liquid).unwrap();
        case.update_region_materials("region0", &mix, &[&water]).unwrap();
        assert_eq!(zone_keys(&case, "1", SPECIE_VALUES), species);
        assert!(zone_keys(&case, "1", MATERIAL_SOURCES).contains(&water));
    }
}
