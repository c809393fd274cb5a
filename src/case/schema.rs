//! case::schema
//!
//! Schema of a CFD case document.
//!
//! # Layout
//!
//! ```text
//! models
//!     speciesModels                    off | on
//!     turbulenceModels/model
//! materials/<mid>                      int-keyed
//!     name, type, phase, chemicalFormula, density, viscosity
//!     transport/specification
//!     mixture/primarySpecie            set on mixtures
//!     specie/mixture                   set on species
//! region/<rname>                       text-keyed by region name
//!     material, secondaryMaterials
//!     cellZones/<czid>
//!         name, zoneType
//!         sourceTerms/materials/<mid>
//!         sourceTerms/userDefinedScalars/<scalarID>
//!         fixedValues/species/<mid>
//!         fixedValues/userDefinedScalars/<scalarID>
//!     boundaryConditions/<bcid>
//!         name, physicalType
//!         species/<mid>
//!         userDefinedScalars/<scalarID>
//! userDefinedScalars/<scalarID>       int-keyed
//!     fieldName, region, material, diffusivity/...
//! ```

use crate::core::schema::{
    Collection, Group, Primitive, Schema, SimpleArray, ValidationError,
};
use crate::db_enum;

/// Name of the cell zone that covers a whole region.
pub const CELL_ZONE_NAME_FOR_REGION: &str = "All";

/// Name given to the first region of a new case.
pub const DEFAULT_REGION_NAME: &str = "region0";

db_enum! {
    /// Kind of material entry.
    pub enum MaterialType("MaterialType") {
        Nonmixture = "nonmixture",
        Mixture = "mixture",
        Specie = "specie",
    }
}

db_enum! {
    /// Material phase.
    pub enum Phase("Phase") {
        Gas = "gas",
        Liquid = "liquid",
        Solid = "solid",
    }
}

db_enum! {
    /// How a material's viscosity is specified.
    pub enum TransportSpecification("TransportSpecification") {
        Constant = "constant",
        Sutherland = "sutherland",
        Polynomial = "polynomial",
        CrossPowerLaw = "crossPowerLaw",
        HerschelBulkley = "herschelBulkley",
        BirdCarreau = "birdCarreau",
        PowerLaw = "powerLaw",
    }
}

impl TransportSpecification {
    /// Viscosity models that only hold for laminar liquid flow.
    pub fn is_non_newtonian(self) -> bool {
        matches!(
            self,
            Self::CrossPowerLaw | Self::HerschelBulkley | Self::BirdCarreau | Self::PowerLaw
        )
    }
}

db_enum! {
    /// Species transport switch.
    pub enum SpeciesModel("SpeciesModel") {
        Off = "off",
        On = "on",
    }
}

db_enum! {
    /// Turbulence model of the case.
    pub enum TurbulenceModel("TurbulenceModel") {
        Laminar = "laminar",
        Inviscid = "inviscid",
        SpalartAllmaras = "spalartAllmaras",
        KEpsilon = "k-epsilon",
        KOmega = "k-omega",
        Des = "des",
        Les = "les",
    }
}

db_enum! {
    /// Cell zone model.
    pub enum ZoneType("ZoneType") {
        None = "none",
        Mrf = "mrf",
        Porous = "porous",
        SlidingMesh = "slidingMesh",
        ActuatorDisk = "actuatorDisk",
    }
}

db_enum! {
    /// How a source term value is applied.
    pub enum SourceUnit("SourceUnit") {
        ValueForEntireCellZone = "valueForEntireCellZone",
        ValuePerUnitVolume = "valuePerUnitVolume",
    }
}

db_enum! {
    /// Time dependence of a source term.
    pub enum TemporalProfile("TemporalProfile") {
        Constant = "constant",
        PiecewiseLinear = "piecewiseLinear",
        Polynomial = "polynomial",
    }
}

db_enum! {
    /// Physical type of a boundary.
    pub enum BoundaryType("BoundaryType") {
        Wall = "wall",
        VelocityInlet = "velocityInlet",
        PressureInlet = "pressureInlet",
        PressureOutlet = "pressureOutlet",
        Symmetry = "symmetry",
        Interface = "interface",
    }
}

db_enum! {
    /// Diffusivity model of a user-defined scalar.
    pub enum ScalarSpecificationMethod("ScalarSpecificationMethod") {
        Constant = "constant",
        LaminarAndTurbulentViscosity = "laminarAndTurbulentViscosity",
    }
}

fn material() -> Group {
    Group::new()
        .field("name", Primitive::text())
        .field("type", Primitive::enumeration::<MaterialType>())
        .field("phase", Primitive::enumeration::<Phase>())
        .field("chemicalFormula", Primitive::text().optional())
        .field("density", Primitive::float().low_limit(0.0, false).with_default("1.225"))
        .field("viscosity", Primitive::float().low_limit(0.0, true).with_default("1.79e-05"))
        .field(
            "mixture",
            Group::new().field("primarySpecie", Primitive::int().optional()),
        )
        .field("specie", Group::new().field("mixture", Primitive::int().optional()))
        .field(
            "transport",
            Group::new().field("specification", Primitive::enumeration::<TransportSpecification>()),
        )
}

fn models() -> Group {
    Group::new()
        .field("speciesModels", Primitive::enumeration::<SpeciesModel>())
        .field(
            "turbulenceModels",
            Group::new().field("model", Primitive::enumeration::<TurbulenceModel>()),
        )
}

/// Source term entry; disabled until a user turns it on.
fn source_term() -> Group {
    Group::new()
        .field("disabled", Primitive::bool(true))
        .field("unit", Primitive::enumeration::<SourceUnit>())
        .field("specification", Primitive::enumeration::<TemporalProfile>())
        .field("constant", Primitive::float())
}

/// Fixed value entry; disabled until a user turns it on.
fn fixed_value() -> Group {
    Group::new()
        .field("disabled", Primitive::bool(true))
        .field("value", Primitive::float())
}

fn cell_zone() -> Group {
    Group::new()
        .field("name", Primitive::text())
        .field("zoneType", Primitive::enumeration::<ZoneType>())
        .field(
            "sourceTerms",
            Group::new()
                .field("materials", Collection::int_keyed(source_term()))
                .field("userDefinedScalars", Collection::int_keyed(source_term())),
        )
        .field(
            "fixedValues",
            Group::new()
                .field("species", Collection::int_keyed(fixed_value()))
                .field("userDefinedScalars", Collection::int_keyed(fixed_value())),
        )
}

fn boundary_condition() -> Group {
    Group::new()
        .field("name", Primitive::text())
        .field("physicalType", Primitive::enumeration::<BoundaryType>())
        .field(
            "species",
            Collection::int_keyed(Group::new().field("value", Primitive::float())),
        )
        .field(
            "userDefinedScalars",
            Collection::int_keyed(Group::new().field("value", Primitive::float())),
        )
}

fn region() -> Group {
    Group::new()
        .field("material", Primitive::int().low_limit(1.0, true).with_default("1"))
        .field("secondaryMaterials", SimpleArray::new(Primitive::int(), 0))
        .field("cellZones", Collection::int_keyed(cell_zone()))
        .field("boundaryConditions", Collection::int_keyed(boundary_condition()))
}

fn user_defined_scalar() -> Group {
    Group::new()
        .field("fieldName", Primitive::text())
        .field("region", Primitive::text().optional())
        .field("material", Primitive::int().optional())
        .field(
            "diffusivity",
            Group::new()
                .field("specificationMethod", Primitive::enumeration::<ScalarSpecificationMethod>())
                .field("constant", Primitive::float().low_limit(0.0, true))
                .field(
                    "laminarAndTurbulentViscosity",
                    Group::new()
                        .field("laminarViscosityCoefficient", Primitive::float().with_default("1"))
                        .field("turbulentViscosityCoefficient", Primitive::float().with_default("1")),
                ),
        )
}

/// Build the case schema.
pub fn case_schema() -> Result<Schema, ValidationError> {
    Schema::new(
        Group::new()
            .field("models", models())
            .field("materials", Collection::int_keyed(material()))
            .field("region", Collection::text_keyed(region()))
            .field("userDefinedScalars", Collection::int_keyed(user_defined_scalar())),
    )
}
