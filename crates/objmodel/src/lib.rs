//! ObjModel - fluent query builder and lightweight ORM for embedded
//! object databases.
//!
//! ObjModel sits in front of an embedded object store and provides:
//!
//! - A fluent builder that renders chained calls into the store's textual
//!   predicate grammar
//! - Relationship resolution (belongs-to, has-many, ...) via one secondary
//!   query plus an in-memory equi-join
//! - Count/sum/avg aggregates over dot-delimited paths that may cross
//!   one-to-many joins
//! - A `Model` trait so query chains can start from a record type
//!
//! # Quick Start
//!
//! ```ignore
//! use objmodel::prelude::*;
//! use objmodel_memory::MemoryStore;
//!
//! struct Category {
//!     id: i64,
//!     title: String,
//! }
//!
//! impl Model for Category {
//!     const SCHEMA: &'static str = "categories";
//!
//!     fn from_record(record: &Record) -> Result<Self> {
//!         Ok(Self {
//!             id: record.get_i64("id").unwrap_or_default(),
//!             title: record.get_str("title").unwrap_or_default().to_string(),
//!         })
//!     }
//!
//!     fn to_record(&self) -> Record {
//!         record! { "id" => self.id, "title" => self.title.as_str() }
//!     }
//! }
//!
//! async fn example(cx: &Cx) -> Result<()> {
//!     let store: StoreHandle = match MemoryStore::open(cx, StoreConfig::named("app")).await {
//!         Outcome::Ok(store) => std::sync::Arc::new(store),
//!         other => panic!("open failed: {other:?}"),
//!     };
//!
//!     let androids = Category::filter(&store, ("title", Compare::Contains, "android"))
//!         .sort("id", Direction::Desc)
//!         .get()?;
//!
//!     let joined = QueryBuilder::new(store.clone(), "categories")
//!         .has_many("brands")
//!         .get()?;
//!     let per_category = QueryBuilder::new(store, "categories")
//!         .has_many("brands")
//!         .avg("brands.count")?;
//!     Ok(())
//! }
//! ```

pub mod default_store;
pub mod model;

// Re-export all public types from sub-crates
pub use objmodel_core::{
    Collection,
    ConfigError,
    // asupersync re-exports
    Cx,
    Error,
    Outcome,
    QueryError,
    QueryErrorKind,
    Record,
    RecordMapFn,
    RelationDef,
    RelationKind,
    Result,
    SortKey,
    Store,
    StoreConfig,
    StoreError,
    StoreErrorKind,
    StoreHandle,
    TypeSpec,
    TypeTag,
    UpdateMode,
    Value,
    is_date_like,
    record,
    schema_to_id,
    schema_to_title,
};
pub use objmodel_query::{
    Compare, Direction, FilterArg, Leaves, Predicate, QueryBuilder, Token, render_value,
};

pub use default_store::{default_store, query, set_default_store, try_default_store};
pub use model::{Model, ModelQueries, ModelRelations};

/// Commonly used imports.
pub mod prelude {
    pub use crate::default_store::{default_store, set_default_store};
    pub use crate::model::{Model, ModelQueries, ModelRelations};
    pub use objmodel_core::{
        Collection, Cx, Error, Outcome, Record, RelationDef, RelationKind, Result, SortKey, Store,
        StoreConfig, StoreHandle, TypeTag, UpdateMode, Value, record,
    };
    pub use objmodel_query::{Compare, Direction, Predicate, QueryBuilder};
}
