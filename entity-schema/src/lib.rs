//! Property schemas for the entity types Sailor queries.
//!
//! A [`PropertySchema`] maps the property names used in filters to the
//! backend's names and tells the filter compiler how to render values for
//! each field. Schemas are served through the [`SchemaProvider`] trait so
//! that callers can inject fixed test schemas or a [`SchemaRegistry`]
//! loaded from YAML or JSON.

mod builtin;
pub mod errors;
pub mod field;
pub mod registry;
pub mod schema;

pub use errors::SchemaError;
pub use field::{FieldSpec, FieldType};
pub use registry::SchemaRegistry;
pub use schema::{PropertySchema, SchemaProvider};
