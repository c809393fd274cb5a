//! integrity
//!
//! Referential-integrity observer protocol.
//!
//! # Overview
//!
//! Structural mutations of a case (removing a material, adding a specie,
//! switching a physics model, ...) are announced on named
//! [`Channel`]s. Each concern registers handlers for the channels it cares
//! about in an [`IntegrityRegistry`]. A handler either vetoes the mutation
//! with an [`IntegrityRejected`] or performs compensating writes so that no
//! reference dangles afterwards.
//!
//! # Dispatch
//!
//! Handlers run synchronously in registration order. The first failure
//! stops dispatch; later handlers do not run. Handlers write into the staged
//! checkout they are given, so a rejection discards their writes along with
//! everything else staged for the mutation.
//!
//! # Example
//!
//! ```
//! use casedb::integrity::{Channel, IntegrityRegistry};
//!
//! let registry = IntegrityRegistry::for_case();
//! assert!(registry.observer_count(Channel::MaterialRemoving) >= 2);
//! ```

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::case::{
    BoundaryObserver, CellZoneObserver, RegionMaterialGuard, ScalarMaterialGuard, TransportGuard,
    TurbulenceModel,
};
use crate::core::store::{SimpleDb, StoreError};

/// A named structural mutation that observers can hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    MaterialRemoving,
    SpecieAdded,
    SpecieRemoving,
    RegionMaterialsUpdating,
    ScalarAdded,
    ScalarRemoving,
    SpeciesModelTurningOff,
    TurbulenceModelUpdating,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::MaterialRemoving => "material removing",
            Channel::SpecieAdded => "specie added",
            Channel::SpecieRemoving => "specie removing",
            Channel::RegionMaterialsUpdating => "region materials updating",
            Channel::ScalarAdded => "scalar added",
            Channel::ScalarRemoving => "scalar removing",
            Channel::SpeciesModelTurningOff => "species model turning off",
            Channel::TurbulenceModelUpdating => "turbulence model updating",
        };
        f.write_str(name)
    }
}

/// A mutation vetoed for domain reasons.
///
/// Carries a message ready to show to a user. `channel` names the observer
/// channel that rejected, or is `None` when the entry point itself refused
/// before dispatching.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct IntegrityRejected {
    pub channel: Option<Channel>,
    pub message: String,
}

impl IntegrityRejected {
    /// Rejection raised by an observer on `channel`.
    pub fn new(channel: Channel, message: impl Into<String>) -> Self {
        Self {
            channel: Some(channel),
            message: message.into(),
        }
    }

    /// Rejection raised by an entry point before any observer ran.
    pub fn refused(message: impl Into<String>) -> Self {
        Self {
            channel: None,
            message: message.into(),
        }
    }
}

/// Failure of an observer.
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error(transparent)]
    Rejected(#[from] IntegrityRejected),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Observes material and specie lifecycle.
pub trait MaterialObserver {
    /// Name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Material `mid` is about to be removed.
    fn material_removing(&self, _db: &mut SimpleDb, _mid: &str) -> Result<(), ObserverError> {
        Ok(())
    }

    /// Specie `mid` was added to mixture `mixture`.
    fn specie_added(&self, _db: &mut SimpleDb, _mid: &str, _mixture: &str) -> Result<(), ObserverError> {
        Ok(())
    }

    /// Specie `mid` is about to be removed. `primary_specie` is the
    /// mixture's new primary specie when `mid` currently holds that role.
    fn specie_removing(
        &self,
        _db: &mut SimpleDb,
        _mid: &str,
        _primary_specie: Option<&str>,
    ) -> Result<(), ObserverError> {
        Ok(())
    }
}

/// New material assignment of a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMaterials<'a> {
    pub region: &'a str,
    pub primary: &'a str,
    pub secondaries: &'a [String],
    /// Species of `primary` when it is a mixture, primary specie first
    pub species: &'a [String],
}

/// Observes reassignment of a region's materials.
pub trait RegionMaterialObserver {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn materials_updating(&self, db: &mut SimpleDb, update: &RegionMaterials<'_>) -> Result<(), ObserverError>;
}

/// Observes user-defined scalar lifecycle.
pub trait ScalarObserver {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn scalar_added(&self, _db: &mut SimpleDb, _scalar_id: &str) -> Result<(), ObserverError> {
        Ok(())
    }

    fn scalar_removing(&self, _db: &mut SimpleDb, _scalar_id: &str) -> Result<(), ObserverError> {
        Ok(())
    }
}

/// Observes switches of the case's physics models.
pub trait ModelObserver {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The species model is about to be turned off, which removes
    /// `mixtures` together with their species.
    fn species_model_turning_off(
        &self,
        _db: &mut SimpleDb,
        _mixtures: &[String],
    ) -> Result<(), ObserverError> {
        Ok(())
    }

    /// The turbulence model is about to change to `model`.
    fn turbulence_model_updating(
        &self,
        _db: &mut SimpleDb,
        _model: TurbulenceModel,
    ) -> Result<(), ObserverError> {
        Ok(())
    }
}

/// Ordered handler lists, one per concern.
///
/// There is no unregistration; a registry is populated once and then only
/// dispatched.
#[derive(Default)]
pub struct IntegrityRegistry {
    material: Vec<Box<dyn MaterialObserver>>,
    region_material: Vec<Box<dyn RegionMaterialObserver>>,
    scalar: Vec<Box<dyn ScalarObserver>>,
    model: Vec<Box<dyn ModelObserver>>,
}

impl fmt::Debug for IntegrityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrityRegistry")
            .field("material", &self.material.iter().map(|o| o.name()).collect::<Vec<_>>())
            .field(
                "region_material",
                &self.region_material.iter().map(|o| o.name()).collect::<Vec<_>>(),
            )
            .field("scalar", &self.scalar.iter().map(|o| o.name()).collect::<Vec<_>>())
            .field("model", &self.model.iter().map(|o| o.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl IntegrityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry wired with every handler the case domain ships.
    ///
    /// Guards are registered before the cascading observers so a veto is
    /// raised before any compensating write is staged.
    pub fn for_case() -> Self {
        let mut registry = Self::new();
        registry.register_material_observer(RegionMaterialGuard);
        registry.register_material_observer(ScalarMaterialGuard);
        registry.register_material_observer(CellZoneObserver);
        registry.register_material_observer(BoundaryObserver);
        registry.register_region_material_observer(CellZoneObserver);
        registry.register_region_material_observer(BoundaryObserver);
        registry.register_scalar_observer(CellZoneObserver);
        registry.register_scalar_observer(BoundaryObserver);
        registry.register_model_observer(RegionMaterialGuard);
        registry.register_model_observer(TransportGuard);
        registry
    }

    pub fn register_material_observer(&mut self, observer: impl MaterialObserver + 'static) {
        self.material.push(Box::new(observer));
    }

    pub fn register_region_material_observer(&mut self, observer: impl RegionMaterialObserver + 'static) {
        self.region_material.push(Box::new(observer));
    }

    pub fn register_scalar_observer(&mut self, observer: impl ScalarObserver + 'static) {
        self.scalar.push(Box::new(observer));
    }

    pub fn register_model_observer(&mut self, observer: impl ModelObserver + 'static) {
        self.model.push(Box::new(observer));
    }

    /// Number of handlers that receive `channel`.
    pub fn observer_count(&self, channel: Channel) -> usize {
        match channel {
            Channel::MaterialRemoving | Channel::SpecieAdded | Channel::SpecieRemoving => {
                self.material.len()
            }
            Channel::RegionMaterialsUpdating => self.region_material.len(),
            Channel::ScalarAdded | Channel::ScalarRemoving => self.scalar.len(),
            Channel::SpeciesModelTurningOff | Channel::TurbulenceModelUpdating => self.model.len(),
        }
    }

    pub fn material_removing(&self, db: &mut SimpleDb, mid: &str) -> Result<(), ObserverError> {
        dispatch(Channel::MaterialRemoving, &self.material, |o| o.name(), |o| {
            o.material_removing(db, mid)
        })
    }

    pub fn specie_added(&self, db: &mut SimpleDb, mid: &str, mixture: &str) -> Result<(), ObserverError> {
        dispatch(Channel::SpecieAdded, &self.material, |o| o.name(), |o| {
            o.specie_added(db, mid, mixture)
        })
    }

    pub fn specie_removing(
        &self,
        db: &mut SimpleDb,
        mid: &str,
        primary_specie: Option<&str>,
    ) -> Result<(), ObserverError> {
        dispatch(Channel::SpecieRemoving, &self.material, |o| o.name(), |o| {
            o.specie_removing(db, mid, primary_specie)
        })
    }

    pub fn materials_updating(
        &self,
        db: &mut SimpleDb,
        update: &RegionMaterials<'_>,
    ) -> Result<(), ObserverError> {
        dispatch(
            Channel::RegionMaterialsUpdating,
            &self.region_material,
            |o| o.name(),
            |o| o.materials_updating(db, update),
        )
    }

    pub fn scalar_added(&self, db: &mut SimpleDb, scalar_id: &str) -> Result<(), ObserverError> {
        dispatch(Channel::ScalarAdded, &self.scalar, |o| o.name(), |o| {
            o.scalar_added(db, scalar_id)
        })
    }

    pub fn scalar_removing(&self, db: &mut SimpleDb, scalar_id: &str) -> Result<(), ObserverError> {
        dispatch(Channel::ScalarRemoving, &self.scalar, |o| o.name(), |o| {
            o.scalar_removing(db, scalar_id)
        })
    }

    pub fn species_model_turning_off(
        &self,
        db: &mut SimpleDb,
        mixtures: &[String],
    ) -> Result<(), ObserverError> {
        dispatch(Channel::SpeciesModelTurningOff, &self.model, |o| o.name(), |o| {
            o.species_model_turning_off(db, mixtures)
        })
    }

    pub fn turbulence_model_updating(
        &self,
        db: &mut SimpleDb,
        model: TurbulenceModel,
    ) -> Result<(), ObserverError> {
        dispatch(Channel::TurbulenceModelUpdating, &self.model, |o| o.name(), |o| {
            o.turbulence_model_updating(db, model)
        })
    }
}

/// Run `call` on each observer in order, stopping at the first failure.
fn dispatch<O: ?Sized>(
    channel: Channel,
    observers: &[Box<O>],
    name: impl Fn(&O) -> &'static str,
    mut call: impl FnMut(&O) -> Result<(), ObserverError>,
) -> Result<(), ObserverError> {
    for observer in observers {
        let observer = observer.as_ref();
        debug!(%channel, observer = name(observer), "dispatch");
        if let Err(err) = call(observer) {
            if let ObserverError::Rejected(rejected) = &err {
                info!(%channel, observer = name(observer), reason = %rejected, "mutation rejected");
            }
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::core::schema::{Group, Primitive, Schema};

    fn db() -> SimpleDb {
        let schema = Schema::new(Group::new().field("log", Primitive::text().optional())).unwrap();
        SimpleDb::new(&schema).checkout("").unwrap()
    }

    struct Recorder {
        tag: &'static str,
        seen: Rc<RefCell<Vec<&'static str>>>,
        reject: bool,
    }

    impl MaterialObserver for Recorder {
        fn material_removing(&self, db: &mut SimpleDb, _mid: &str) -> Result<(), ObserverError> {
            self.seen.borrow_mut().push(self.tag);
            if self.reject {
                return Err(IntegrityRejected::new(Channel::MaterialRemoving, "in use").into());
            }
            db.set_value("log", self.tag, None)?;
            Ok(())
        }
    }

    #[test]
    fn dispatch_runs_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = IntegrityRegistry::new();
        for tag in ["first", "second"] {
            registry.register_material_observer(Recorder {
                tag,
                seen: Rc::clone(&seen),
                reject: false,
            });
        }

        let mut db = db();
        registry.material_removing(&mut db, "1").unwrap();
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn first_rejection_stops_dispatch() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = IntegrityRegistry::new();
        for (tag, reject) in [("a", false), ("b", true), ("c", false)] {
            registry.register_material_observer(Recorder {
                tag,
                seen: Rc::clone(&seen),
                reject,
            });
        }

        let mut db = db();
        let err = registry.material_removing(&mut db, "1").unwrap_err();
        match err {
            ObserverError::Rejected(r) => {
                assert_eq!(r.channel, Some(Channel::MaterialRemoving));
                assert_eq!(r.to_string(), "in use");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*seen.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn unhooked_channels_pass() {
        let registry = IntegrityRegistry::new();
        let mut db = db();
        registry.specie_added(&mut db, "2", "1").unwrap();
        registry.scalar_removing(&mut db, "1").unwrap();
        assert_eq!(registry.observer_count(Channel::ScalarAdded), 0);
    }

    #[test]
    fn case_registry_wiring() {
        let registry = IntegrityRegistry::for_case();
        assert_eq!(registry.observer_count(Channel::MaterialRemoving), 4);
        assert_eq!(registry.observer_count(Channel::RegionMaterialsUpdating), 2);
        assert_eq!(registry.observer_count(Channel::ScalarRemoving), 2);
        assert_eq!(registry.observer_count(Channel::TurbulenceModelUpdating), 2);
    }

    #[test]
    fn channel_names() {
        insta::assert_snapshot!(Channel::RegionMaterialsUpdating.to_string(), @"region materials updating");
    }
}
