//! case::boundaries
//!
//! Boundary conditions and the observer that keeps their specie and scalar
//! values in step with the case.

use tracing::debug;

use crate::core::store::{DocumentRead, SimpleDb, StoreError};
use crate::integrity::{
    MaterialObserver, ObserverError, RegionMaterialObserver, RegionMaterials, ScalarObserver,
};

use super::materials::mixture_species;
use super::regions::REGIONS;
use super::schema::BoundaryType;
use super::{
    add_if_missing, all_regions, edit_region_members, remove_if_present, scalar_ids, CaseDb,
    CaseError,
};

const BOUNDARIES: &str = "boundaryConditions";
const SPECIES: &str = "species";
const SCALARS: &str = "userDefinedScalars";

impl CaseDb {
    /// Add a boundary condition to `region`. Returns the boundary id.
    pub fn add_boundary(&mut self, region: &str, name: &str, kind: BoundaryType) -> Result<String, CaseError> {
        self.stage(|db, _| {
            let path = format!("{REGIONS}/{region}/{BOUNDARIES}");
            if db.element_count_by(&path, |_, bc| bc.text("name") == Some(name))? > 0 {
                return Err(StoreError::key(&path, name, "already exists").into());
            }

            let mut boundary = db.new_element(&path)?;
            boundary.set_text("name", name, Some("Name"))?;
            boundary.set_enum("physicalType", kind)?;
            let bcid = db.add_element(&path, boundary, None)?;

            let primary = db
                .get_value(&format!("{REGIONS}/{region}/material"))?
                .map(str::to_string)
                .unwrap_or_default();
            let species = mixture_species(db, &primary)?;
            let scalars = scalar_ids(db)?;

            let mut boundary = db.checkout(&format!("{path}/{bcid}"))?;
            for mid in &species {
                add_if_missing(&mut boundary, SPECIES, mid)?;
            }
            for id in &scalars {
                add_if_missing(&mut boundary, SCALARS, id)?;
            }
            db.commit(boundary)?;

            debug!(region, boundary = %bcid, name, "boundary added");
            Ok(bcid)
        })
    }
}

/// Keeps boundary specie and scalar values aligned with the case.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryObserver;

impl MaterialObserver for BoundaryObserver {
    fn specie_added(&self, db: &mut SimpleDb, mid: &str, mixture: &str) -> Result<(), ObserverError> {
        edit_region_members(
            db,
            BOUNDARIES,
            |_, region| region.text("material") == Some(mixture),
            |bc| add_if_missing(bc, SPECIES, mid),
        )?;
        Ok(())
    }

    fn specie_removing(
        &self,
        db: &mut SimpleDb,
        mid: &str,
        _primary_specie: Option<&str>,
    ) -> Result<(), ObserverError> {
        edit_region_members(db, BOUNDARIES, all_regions, |bc| remove_if_present(bc, SPECIES, mid))?;
        Ok(())
    }
}

impl RegionMaterialObserver for BoundaryObserver {
    fn materials_updating(&self, db: &mut SimpleDb, update: &RegionMaterials<'_>) -> Result<(), ObserverError> {
        edit_region_members(
            db,
            BOUNDARIES,
            |name, _| name == update.region,
            |bc| {
                bc.remove_elements_by(SPECIES, |mid, _| !update.species.iter().any(|s| s == mid))?;
                for mid in update.species {
                    add_if_missing(bc, SPECIES, mid)?;
                }
                Ok(())
            },
        )?;
        Ok(())
    }
}

impl ScalarObserver for BoundaryObserver {
    fn scalar_added(&self, db: &mut SimpleDb, scalar_id: &str) -> Result<(), ObserverError> {
        edit_region_members(db, BOUNDARIES, all_regions, |bc| add_if_missing(bc, SCALARS, scalar_id))?;
        Ok(())
    }

    fn scalar_removing(&self, db: &mut SimpleDb, scalar_id: &str) -> Result<(), ObserverError> {
        edit_region_members(db, BOUNDARIES, all_regions, |bc| {
            remove_if_present(bc, SCALARS, scalar_id)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::Phase;

    fn keys(case: &CaseDb, bcid: &str, collection: &str) -> Vec<String> {
        case.db()
            .get_keys(&format!("region/region0/boundaryConditions/{bcid}/{collection}"))
            .unwrap()
    }

    #[test]
    fn boundary_records_type() {
        let mut case = CaseDb::initial().unwrap();
        let bcid = case.add_boundary("region0", "inlet", BoundaryType::VelocityInlet).unwrap();
        assert_eq!(
            case.db()
                .get_enum::<BoundaryType>(&format!("region/region0/boundaryConditions/{bcid}/physicalType"))
                .unwrap(),
            BoundaryType::VelocityInlet
        );
        assert!(case.add_boundary("region0", "inlet", BoundaryType::Wall).is_err());
        assert!(case.add_boundary("nowhere", "outlet", BoundaryType::Wall).is_err());
    }

    #[test]
    fn species_follow_region_mixture() {
        let mut case = CaseDb::initial().unwrap();
        let bcid = case.add_boundary("region0", "inlet", BoundaryType::VelocityInlet).unwrap();
        let mix = case.add_mixture("fuel", Phase::Gas, &["CH4", "O2"]).unwrap();

        case.update_region_materials("region0", &mix, &[]).unwrap();
        let species = case.species(&mix).unwrap();
        assert_eq!(keys(&case, &bcid, SPECIES), species);

        let added = case.add_specie(&mix, "N2").unwrap();
        assert_eq!(keys(&case, &bcid, SPECIES).last(), Some(&added));

        case.update_region_materials("region0", "1", &[]).unwrap();
        assert!(keys(&case, &bcid, SPECIES).is_empty());
    }

    #[test]
    fn scalars_reach_every_boundary() {
        let mut case = CaseDb::initial().unwrap();
        let wall = case.add_boundary("region0", "wall", BoundaryType::Wall).unwrap();
        let id = case.add_scalar("age", None, None).unwrap();
        let outlet = case.add_boundary("region0", "outlet", BoundaryType::PressureOutlet).unwrap();
        assert_eq!(keys(&case, &wall, SCALARS), vec![id.clone()]);
        assert_eq!(keys(&case, &outlet, SCALARS), vec![id.clone()]);

        case.remove_scalar(&id).unwrap();
        assert!(keys(&case, &wall, SCALARS).is_empty());
    }
}
