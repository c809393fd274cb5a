//! casedb - A schema-validated case database for CFD setups
//!
//! casedb holds a simulation case as one hierarchical document validated
//! against a declarative schema. Edits happen in isolated checkouts that are
//! committed back as a unit, and structural changes are announced to
//! integrity observers that veto them or keep cross-references consistent.
//!
//! # Architecture
//!
//! - [`core`] - Schema, document tree, store, checkouts and configuration
//! - [`integrity`] - Observer channels and the registry that dispatches them
//! - [`case`] - The CFD case schema, its entry points and shipped observers
//! - [`cli`] - Command-line interface layer
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. Validation is the only gate that produces a document
//! 2. The live store only changes through a committed checkout
//! 3. A rejected mutation leaves the live document unchanged
//! 4. No collection key is issued twice within one collection

pub mod case;
pub mod cli;
pub mod core;
pub mod integrity;
pub mod ui;
