//! Optional process-wide default store handle.
//!
//! The core never consults this: every builder takes its store handle at
//! construction. This module is a convenience for applications that open
//! one store at startup and would rather not thread the handle through
//! every call site.
//!
//! # Precedence
//!
//! 1. Explicit handle passed to a builder or model starter
//! 2. The default handle set here via [`set_default_store`]
//!
//! There is no third fallback; querying without either is a
//! configuration error.

use objmodel_core::error::{Error, Result};
use objmodel_core::store::StoreHandle;
use objmodel_query::QueryBuilder;
use std::sync::OnceLock;

static DEFAULT_STORE: OnceLock<StoreHandle> = OnceLock::new();

/// Set the default store handle. Can only be set once per process;
/// subsequent calls are silently ignored.
pub fn set_default_store(store: StoreHandle) {
    let _ = DEFAULT_STORE.set(store);
}

/// The default store handle, if one was set.
pub fn default_store() -> Option<StoreHandle> {
    DEFAULT_STORE.get().cloned()
}

/// The default store handle, or a configuration error when unset.
pub fn try_default_store() -> Result<StoreHandle> {
    default_store().ok_or_else(|| Error::config("no default store configured"))
}

/// Start a query against the default store.
pub fn query(schema: impl Into<String>) -> Result<QueryBuilder> {
    Ok(QueryBuilder::new(try_default_store()?, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use objmodel_core::store::{Store, StoreConfig, UpdateMode};
    use objmodel_core::{Record, record};
    use objmodel_memory::MemoryStore;
    use std::sync::Arc;

    // OnceLock is process-global, so unset-then-set is covered in one test.
    #[test]
    fn test_default_store_lifecycle() {
        assert!(default_store().is_none());
        assert!(try_default_store().is_err());
        assert!(query("categories").is_err());

        let store = MemoryStore::new(StoreConfig::named("default-test"));
        store
            .create("categories", record! { "id" => 1 }, UpdateMode::Never)
            .unwrap();
        set_default_store(Arc::new(store));

        assert!(default_store().is_some());
        let records: Vec<Record> = query("categories").unwrap().get().unwrap();
        assert_eq!(records.len(), 1);

        // second set is ignored, first handle stays
        set_default_store(Arc::new(MemoryStore::new(StoreConfig::named("other"))));
        assert_eq!(query("categories").unwrap().get().unwrap().len(), 1);
    }
}
