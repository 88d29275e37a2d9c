//! Storage collaborator contracts.
//!
//! The embedded database itself is an external collaborator: it owns the
//! on-disk format, transactions, and the predicate grammar its filter
//! engine evaluates. This module defines the narrow contract the query
//! layer needs from it. The traits are object-safe on purpose: builders
//! hold a [`StoreHandle`] (`Arc<dyn Store>`) injected at construction, so
//! no global state is required for correctness and tests can swap in any
//! backend.

use crate::error::Result;
use crate::record::Record;
use std::sync::Arc;

/// A sort key applied by the store's native sorter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Property to sort by.
    pub property: String,
    /// Descending when true, ascending otherwise.
    pub descending: bool,
}

impl SortKey {
    /// Create an ascending sort key.
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            descending: false,
        }
    }

    /// Create a descending sort key.
    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            descending: true,
        }
    }
}

/// Conflict behavior for [`Store::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Insert only; an existing primary key is an error.
    #[default]
    Never,
    /// Insert, or update the existing record with the supplied properties.
    Modified,
    /// Insert, or replace the existing record wholesale.
    All,
}

/// An ordered set of records, as handed out by the store.
///
/// `filtered` and `sorted` return new collections; the receiver is never
/// modified. Predicate strings are evaluated by the store's own filter
/// engine, which is where malformed predicates surface as errors.
pub trait Collection {
    /// Narrow to records matching a predicate string.
    fn filtered(&self, predicate: &str) -> Result<Box<dyn Collection>>;

    /// Reorder by the given keys, primary key first.
    fn sorted(&self, keys: &[SortKey]) -> Box<dyn Collection>;

    /// Materialize a half-open `[start, end)` window of records.
    fn slice(&self, start: usize, end: Option<usize>) -> Vec<Record>;

    /// Materialize every record.
    fn records(&self) -> Vec<Record>;

    /// Number of records in the collection.
    fn len(&self) -> usize;

    /// Check if the collection is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The embedded database handle this layer queries through.
///
/// Read access goes through [`Store::objects`]; the write helpers exist
/// only for insert/clear conveniences and test fixtures. Transactional
/// discipline is entirely the store's concern; this layer takes no locks.
pub trait Store: std::fmt::Debug + Send + Sync {
    /// The ordered collection of records for a schema.
    fn objects(&self, schema: &str) -> Result<Box<dyn Collection>>;

    /// Insert (or upsert, per `mode`) one record into a schema.
    fn create(&self, schema: &str, record: Record, mode: UpdateMode) -> Result<()>;

    /// Remove every record of a schema.
    fn delete_all(&self, schema: &str) -> Result<()>;
}

/// Shared handle to a store, injected into every builder.
pub type StoreHandle = Arc<dyn Store>;

/// Configuration for opening a store.
///
/// Mirrors the embedded database's open options at the granularity this
/// layer cares about; backends may extend it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Store identifier (a path for on-disk backends, a label otherwise).
    pub name: String,
    /// Schema version, bumped by the application on layout changes.
    pub schema_version: u32,
}

impl StoreConfig {
    /// Create a config with the given name and schema version 1.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_version: 1,
        }
    }

    /// Set the schema version.
    #[must_use]
    pub fn schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::named("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_constructors() {
        let key = SortKey::desc("id");
        assert_eq!(key.property, "id");
        assert!(key.descending);
        assert!(!SortKey::asc("title").descending);
    }

    #[test]
    fn test_store_config_builder() {
        let config = StoreConfig::named("catalog").schema_version(3);
        assert_eq!(config.name, "catalog");
        assert_eq!(config.schema_version, 3);
    }
}
