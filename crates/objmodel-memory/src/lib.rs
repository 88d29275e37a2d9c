//! In-memory reference store for ObjModel.
//!
//! `objmodel-memory` implements the `Store`/`Collection` contract against
//! plain vectors of records, including a full parser and evaluator for the
//! predicate grammar the query layer renders. It exists so the stack can
//! be exercised end-to-end (tests, examples, prototyping) without an
//! embedded database on disk; it is not a storage engine.
//!
//! Opening the store is the single asynchronous boundary, matching the
//! acquisition contract of real embedded backends; everything after the
//! handle is held runs synchronously.

pub mod filter;

use filter::Filter;
use objmodel_core::error::{Error, Result};
use objmodel_core::record::Record;
use objmodel_core::store::{Collection, SortKey, Store, StoreConfig, UpdateMode};
use objmodel_core::value::Value;
use objmodel_core::{Cx, Outcome};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

/// An in-memory store: named collections of records behind a lock.
///
/// Reads hand out snapshots, so a collection obtained from
/// [`Store::objects`] is unaffected by later writes. Write helpers are
/// individually atomic; there is no multi-operation transaction.
#[derive(Debug)]
pub struct MemoryStore {
    config: StoreConfig,
    collections: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryStore {
    /// Create a store synchronously.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Acquire a store handle.
    ///
    /// This is the one-time async boundary; all subsequent operations are
    /// synchronous.
    pub async fn open(_cx: &Cx, config: StoreConfig) -> Outcome<Self, Error> {
        tracing::debug!(name = %config.name, version = config.schema_version, "opened in-memory store");
        Outcome::Ok(Self::new(config))
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Vec<Record>>> {
        self.collections.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Vec<Record>>> {
        self.collections.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Store for MemoryStore {
    fn objects(&self, schema: &str) -> Result<Box<dyn Collection>> {
        let collections = self.read();
        let records = collections
            .get(schema)
            .ok_or_else(|| Error::unknown_schema(schema))?
            .clone();
        Ok(Box::new(MemoryCollection { records }))
    }

    fn create(&self, schema: &str, record: Record, mode: UpdateMode) -> Result<()> {
        let mut collections = self.write();
        let records = collections.entry(schema.to_string()).or_default();

        let id = record.get("id").cloned();
        let existing = id
            .as_ref()
            .filter(|id| !id.is_null())
            .and_then(|id| records.iter().position(|r| r.get("id") == Some(id)));

        match (existing, mode) {
            (Some(_), UpdateMode::Never) => {
                let id = id.unwrap_or(Value::Null);
                Err(Error::duplicate_key(schema, display_value(&id)))
            }
            (Some(index), UpdateMode::Modified) => {
                // merge the supplied properties into the stored record
                let mut merged = records[index].clone();
                for (name, value) in record.iter() {
                    merged.set(name, value.clone());
                }
                records[index] = merged;
                Ok(())
            }
            (Some(index), UpdateMode::All) => {
                records[index] = record;
                Ok(())
            }
            (None, _) => {
                records.push(record);
                Ok(())
            }
        }
    }

    fn delete_all(&self, schema: &str) -> Result<()> {
        let mut collections = self.write();
        // clearing also registers the schema, so a fresh store can be
        // initialized with empty collections
        collections.entry(schema.to_string()).or_default().clear();
        Ok(())
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Text(s) => format!("'{s}'"),
        other => format!("{other:?}"),
    }
}

/// Snapshot of one schema's records.
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    records: Vec<Record>,
}

impl Collection for MemoryCollection {
    fn filtered(&self, predicate: &str) -> Result<Box<dyn Collection>> {
        let filter = Filter::parse(predicate)?;
        let records: Vec<Record> = self
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        tracing::trace!(predicate = %predicate, matched = records.len(), "filtered collection");
        Ok(Box::new(MemoryCollection { records }))
    }

    fn sorted(&self, keys: &[SortKey]) -> Box<dyn Collection> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| compare_records(a, b, keys));
        Box::new(MemoryCollection { records })
    }

    fn slice(&self, start: usize, end: Option<usize>) -> Vec<Record> {
        let end = end.unwrap_or(self.records.len()).min(self.records.len());
        let start = start.min(end);
        self.records[start..end].to_vec()
    }

    fn records(&self) -> Vec<Record> {
        self.records.clone()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

fn compare_records(a: &Record, b: &Record, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let left = a.get(&key.property).unwrap_or(&Value::Null);
        let right = b.get(&key.property).unwrap_or(&Value::Null);
        let mut ordering = value_cmp(left, right);
        if key.descending {
            ordering = ordering.reverse();
        }
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Total order over values for sorting: nulls first, then bools, numbers,
/// text; mixed kinds order by that rank.
fn value_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        _ if a.is_numeric() && b.is_numeric() => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => value_rank(a).cmp(&value_rank(b)),
    }
}

fn value_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) | Value::Double(_) => 2,
        Value::Text(_) => 3,
        Value::List(_) => 4,
        Value::Record(_) => 5,
    }
}
