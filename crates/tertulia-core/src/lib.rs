//! tertulia-core: Domain model for the Tertulia book-club graph.
//!
//! This crate provides the closed registries every other crate builds on:
//! - Node labels (Persona, Libro, Autor, Club) with their fixed property schemas
//! - Relationship kinds (autoria, lectura, membresia, recomendacion)
//! - Validated property payloads, keyed only by registered property names
//! - Common error types

pub mod error;
pub mod properties;
pub mod types;

pub use error::ModelError;
pub use properties::{Properties, PropertyValue};
pub use types::{Label, PropertyDef, PropertyKind, RelationKind};
