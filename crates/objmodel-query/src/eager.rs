//! Relationship resolution.
//!
//! Joining is a two-step affair: one secondary query fetches every related
//! record whose child key matches any owner-side value in the base set,
//! then an in-memory nested-loop pass attaches the matches per base
//! record. One query per declared relationship per `get()`, regardless of
//! base-set size; the stored records are never touched, attachment happens
//! on shallow-merged copies.

use crate::builder::QueryBuilder;
use objmodel_core::error::Result;
use objmodel_core::record::Record;
use objmodel_core::relation::RelationDef;
use objmodel_core::store::StoreHandle;
use objmodel_core::value::Value;

/// Resolve one relationship against a base result set.
#[tracing::instrument(level = "trace", skip(store, base), fields(child = %def.child_schema))]
pub fn resolve(store: &StoreHandle, def: &RelationDef, base: Vec<Record>) -> Result<Vec<Record>> {
    if base.is_empty() {
        return Ok(base);
    }

    let owner_key = def.resolved_owner_key();
    let child_key = def.resolved_child_key();
    let attach_name = def.resolved_attach_name();

    // Distinct owner-side join values across the whole base set.
    let mut join_values: Vec<Value> = Vec::new();
    for record in &base {
        if let Some(value) = record.get(&owner_key) {
            if !value.is_null() && !join_values.contains(value) {
                join_values.push(value.clone());
            }
        }
    }

    let related: Vec<Record> = if join_values.is_empty() {
        Vec::new()
    } else {
        QueryBuilder::new(store.clone(), def.child_schema.clone())
            .filter((child_key.as_str(), Value::List(join_values)))
            .get()?
    };

    tracing::debug!(
        relation = %attach_name,
        base = base.len(),
        related = related.len(),
        "resolved relationship"
    );

    let joined = base
        .into_iter()
        .map(|record| {
            let matches = matching_children(&record, &owner_key, &child_key, &related, def);
            let attached = if def.kind.is_many() {
                Value::List(matches.into_iter().map(Value::Record).collect())
            } else {
                matches
                    .into_iter()
                    .next()
                    .map_or(Value::Null, Value::Record)
            };
            record.with_property(attach_name.clone(), attached)
        })
        .collect();

    Ok(joined)
}

fn matching_children(
    record: &Record,
    owner_key: &str,
    child_key: &str,
    related: &[Record],
    def: &RelationDef,
) -> Vec<Record> {
    let Some(owner_value) = record.get(owner_key) else {
        return Vec::new();
    };
    if owner_value.is_null() {
        return Vec::new();
    }
    related
        .iter()
        .filter(|child| child.get(child_key) == Some(owner_value))
        .cloned()
        .map(|child| match def.map {
            Some(map) => map(child),
            None => child,
        })
        .collect()
}
