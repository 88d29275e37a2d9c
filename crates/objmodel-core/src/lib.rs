//! Core types and traits for ObjModel.
//!
//! This crate provides the foundational abstractions the query layer is
//! built from:
//!
//! - `Value` and `Record` for dynamically-typed object-database rows
//! - `Error`/`Result` for the whole workspace
//! - `TypeTag`/`TypeSpec` for polymorphic-column type inference
//! - naming conventions (`schema_to_id`, `schema_to_title`)
//! - `RelationDef` relationship metadata
//! - the `Store`/`Collection` collaborator contract

// Re-export asupersync primitives for the store-acquisition boundary
pub use asupersync::{Cx, Outcome};

pub mod error;
pub mod naming;
pub mod record;
pub mod relation;
pub mod store;
pub mod types;
pub mod value;

pub use error::{
    ConfigError, Error, QueryError, QueryErrorKind, Result, StoreError, StoreErrorKind,
};
pub use naming::{schema_to_id, schema_to_title};
pub use record::Record;
pub use relation::{RecordMapFn, RelationDef, RelationKind};
pub use store::{Collection, SortKey, Store, StoreConfig, StoreHandle, UpdateMode};
pub use types::{TypeSpec, TypeTag, is_date_like};
pub use value::Value;
