//! core
//!
//! Core types, schemas and the document store.
//!
//! # Modules
//!
//! - [`types`] - Strong types: DbPath, DbEnum, EnumDef
//! - [`schema`] - Declarative schema tree and validators
//! - [`document`] - In-memory document tree
//! - [`store`] - Schema-bound store with checkout/commit
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Validation is the only gate that produces a document
//! - Paths are resolved by one walker shared by every accessor
//! - The live store is never edited in place; edits go through checkouts

pub mod config;
pub mod document;
pub mod schema;
pub mod store;
pub mod types;
