//! case
//!
//! The CFD case document and its mutation entry points.
//!
//! # Overview
//!
//! A [`CaseDb`] owns the live case [`SimpleDb`] and the
//! [`IntegrityRegistry`] wired for it. Structural mutations go through the
//! entry points on `CaseDb` (in [`materials`], [`models`], [`regions`],
//! [`cell_zones`], [`boundaries`] and [`scalars`]):
//!
//! 1. Stage: check out the whole document.
//! 2. Dispatch: run every observer registered for the channel against the
//!    staged copy. Observers may veto or write compensating entries.
//! 3. Apply the primary change to the staged copy.
//! 4. Commit the staged copy into the live store.
//!
//! Any failure before step 4 drops the staged copy, so a rejected mutation
//! leaves the live document exactly as it was.
//!
//! # Example
//!
//! ```
//! use casedb::case::{CaseDb, Phase};
//! use casedb::core::store::DocumentRead;
//!
//! let mut case = CaseDb::initial().unwrap();
//! let water = case.add_non_mixture("water", Phase::Liquid).unwrap();
//! case.remove_material(&water).unwrap();
//!
//! // The region still uses air, so it cannot go.
//! assert!(case.remove_material("1").is_err());
//! assert_eq!(case.db().get_value("materials/1/name").unwrap(), Some("air"));
//! ```

pub mod boundaries;
pub mod cell_zones;
pub mod materials;
pub mod models;
pub mod regions;
pub mod scalars;
pub mod schema;

pub use boundaries::BoundaryObserver;
pub use cell_zones::CellZoneObserver;
pub use models::TransportGuard;
pub use regions::RegionMaterialGuard;
pub use scalars::ScalarMaterialGuard;
pub use schema::{
    case_schema, BoundaryType, MaterialType, Phase, ScalarSpecificationMethod, SourceUnit,
    SpeciesModel, TemporalProfile, TransportSpecification, TurbulenceModel, ZoneType,
    CELL_ZONE_NAME_FOR_REGION, DEFAULT_REGION_NAME,
};

use thiserror::Error;
use tracing::debug;

use crate::core::document::Value;
use crate::core::schema::ValidationError;
use crate::core::store::{DocumentRead, SimpleDb, StoreError};
use crate::integrity::{IntegrityRegistry, IntegrityRejected, ObserverError};

/// Errors from case entry points.
///
/// `Rejected` means the mutation is structurally disallowed right now;
/// `Store` means the input or a path was wrong.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error(transparent)]
    Rejected(#[from] IntegrityRejected),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ObserverError> for CaseError {
    fn from(err: ObserverError) -> Self {
        match err {
            ObserverError::Rejected(rejected) => CaseError::Rejected(rejected),
            ObserverError::Store(store) => CaseError::Store(store),
        }
    }
}

impl From<ValidationError> for CaseError {
    fn from(err: ValidationError) -> Self {
        CaseError::Store(StoreError::Validation(err))
    }
}

/// The live case document and its integrity registry.
#[derive(Debug)]
pub struct CaseDb {
    db: SimpleDb,
    registry: IntegrityRegistry,
}

impl CaseDb {
    /// Empty case with the shipped observers.
    pub fn new() -> Result<Self, CaseError> {
        let schema = case_schema()?;
        Ok(Self::with_db(SimpleDb::new(&schema)))
    }

    /// New case holding one gas material and the default region.
    pub fn initial() -> Result<Self, CaseError> {
        let mut case = Self::new()?;
        let air = case.add_non_mixture("air", Phase::Gas)?;
        case.add_region(DEFAULT_REGION_NAME, &air)?;
        Ok(case)
    }

    /// Case loaded from YAML text.
    pub fn from_yaml(text: &str, fill_with_default: bool) -> Result<Self, CaseError> {
        let schema = case_schema()?;
        Ok(Self::with_db(SimpleDb::from_yaml(&schema, text, fill_with_default)?))
    }

    /// Wrap a case store with the shipped observers.
    pub fn with_db(db: SimpleDb) -> Self {
        Self::with_registry(db, IntegrityRegistry::for_case())
    }

    /// Wrap a case store with a custom registry.
    pub fn with_registry(db: SimpleDb, registry: IntegrityRegistry) -> Self {
        Self { db, registry }
    }

    /// The live store. Read-only; mutate through the entry points or
    /// [`edit`](Self::edit).
    pub fn db(&self) -> &SimpleDb {
        &self.db
    }

    pub fn registry(&self) -> &IntegrityRegistry {
        &self.registry
    }

    pub fn into_db(self) -> SimpleDb {
        self.db
    }

    pub fn to_yaml(&self) -> Result<String, CaseError> {
        Ok(self.db.to_yaml()?)
    }

    /// Apply a plain edit with no observer dispatch.
    ///
    /// The closure works on a staged copy of the whole document; nothing
    /// reaches the live store unless it returns `Ok`.
    pub fn edit<T>(
        &mut self,
        f: impl FnOnce(&mut SimpleDb) -> Result<T, StoreError>,
    ) -> Result<T, CaseError> {
        self.stage(|db, _| Ok(f(db)?))
    }

    /// Run `f` against a staged checkout of the whole document and commit
    /// it if `f` succeeds.
    fn stage<T>(
        &mut self,
        f: impl FnOnce(&mut SimpleDb, &IntegrityRegistry) -> Result<T, CaseError>,
    ) -> Result<T, CaseError> {
        let mut staged = self.db.checkout("")?;
        let result = f(&mut staged, &self.registry)?;
        if self.db.commit(staged)? {
            debug!("staged mutation committed");
        }
        Ok(result)
    }
}

/// Add an empty member under `key` unless one exists.
///
/// `key` is an id owned by another collection, so it may come back after
/// an earlier entry under it was removed.
pub(crate) fn add_if_missing(db: &mut SimpleDb, path: &str, key: &str) -> Result<(), StoreError> {
    if !db.has_element(path, key)? {
        db.add_new_element(path, Some(key))?;
    }
    Ok(())
}

/// Remove the member under `key` if there is one.
pub(crate) fn remove_if_present(db: &mut SimpleDb, path: &str, key: &str) -> Result<(), StoreError> {
    if db.has_element(path, key)? {
        db.remove_element(path, key)?;
    }
    Ok(())
}

/// Run `edit` on a checkout of every member of the `members` collection
/// (`cellZones` or `boundaryConditions`) of the regions accepted by
/// `select`, committing each one back.
pub(crate) fn edit_region_members<P, F>(
    db: &mut SimpleDb,
    members: &str,
    select: P,
    mut edit: F,
) -> Result<(), StoreError>
where
    P: Fn(&str, &Value) -> bool,
    F: FnMut(&mut SimpleDb) -> Result<(), StoreError>,
{
    for region in db.get_keys_by(regions::REGIONS, select)? {
        let path = format!("{}/{region}/{members}", regions::REGIONS);
        for key in db.get_keys(&path)? {
            let mut member = db.checkout(&format!("{path}/{key}"))?;
            edit(&mut member)?;
            db.commit(member)?;
        }
    }
    Ok(())
}

/// Every region.
pub(crate) fn all_regions(_: &str, _: &Value) -> bool {
    true
}

/// Ids of every user-defined scalar.
pub(crate) fn scalar_ids(db: &impl DocumentRead) -> Result<Vec<String>, StoreError> {
    db.get_keys(scalars::SCALARS)
}

/// Secondary material ids of a region.
pub(crate) fn secondary_materials(db: &impl DocumentRead, region: &str) -> Result<Vec<String>, StoreError> {
    Ok(db
        .get_array(&format!("{}/{region}/secondaryMaterials", regions::REGIONS))?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect())
}
