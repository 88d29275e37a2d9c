//! End-to-end pipeline coverage: open, seed, filter, sort, page.

use asupersync::runtime::RuntimeBuilder;
use objmodel::prelude::*;
use objmodel_memory::MemoryStore;
use std::sync::Arc;

fn open_store() -> StoreHandle {
    let rt = RuntimeBuilder::current_thread()
        .build()
        .expect("create asupersync runtime");
    let cx = Cx::for_testing();

    rt.block_on(async {
        match MemoryStore::open(&cx, StoreConfig::named("round-trip")).await {
            Outcome::Ok(store) => Arc::new(store) as StoreHandle,
            other => panic!("open failed: {other:?}"),
        }
    })
}

fn seeded_store() -> StoreHandle {
    let store = open_store();
    for id in 1..=10 {
        store
            .create(
                "items",
                record! { "id" => id, "title" => format!("item {id}") },
                UpdateMode::Never,
            )
            .expect("seed item");
    }
    store
}

fn ids(records: &[Record]) -> Vec<i64> {
    records.iter().filter_map(|r| r.get_i64("id")).collect()
}

#[test]
fn between_round_trip_returns_inclusive_range() {
    let store = seeded_store();
    let records = QueryBuilder::new(store, "items")
        .between("id", 2, 5)
        .get()
        .unwrap();
    assert_eq!(ids(&records), vec![2, 3, 4, 5]);
}

#[test]
fn limit_with_offset_windows_the_filtered_set() {
    let store = seeded_store();
    let records = QueryBuilder::new(store, "items")
        .between("id", 2, 5)
        .limit_from(2, 1)
        .get()
        .unwrap();
    assert_eq!(ids(&records), vec![3, 4]);
}

#[test]
fn sort_applies_before_paging() {
    let store = seeded_store();
    let records = QueryBuilder::new(store, "items")
        .sort("id", Direction::Desc)
        .limit(3)
        .get()
        .unwrap();
    assert_eq!(ids(&records), vec![10, 9, 8]);
}

#[test]
fn filter_list_value_matches_any_element() {
    let store = seeded_store();
    let records = QueryBuilder::new(store, "items")
        .filter(("id", vec![1, 3]))
        .get()
        .unwrap();
    assert_eq!(ids(&records), vec![1, 3]);
}

#[test]
fn optional_filters_compose_through_when() {
    let store = seeded_store();

    let all = QueryBuilder::new(store.clone(), "items")
        .when(None::<i64>, |q, id| q.filter(("id", id)))
        .get()
        .unwrap();
    assert_eq!(all.len(), 10);

    let one = QueryBuilder::new(store, "items")
        .when(Some(7), |q, id| q.filter(("id", id)))
        .get()
        .unwrap();
    assert_eq!(ids(&one), vec![7]);
}

#[test]
fn raw_fragment_reaches_the_evaluator_unchanged() {
    let store = seeded_store();
    let records = QueryBuilder::new(store, "items")
        .filter_raw("title contains '1' and (id = 1 or id = 10)")
        .get()
        .unwrap();
    assert_eq!(ids(&records), vec![1, 10]);
}

#[test]
fn malformed_chain_fails_at_the_evaluator() {
    let store = seeded_store();
    // unmatched group end renders a stray ')'
    let err = QueryBuilder::new(store, "items")
        .filter(("id", 1))
        .group_end()
        .get()
        .unwrap_err();
    assert!(matches!(err, Error::Query(_)));
}

#[test]
fn first_variants_cover_the_not_found_taxonomy() {
    let store = seeded_store();

    let missing = QueryBuilder::new(store.clone(), "items")
        .filter(("id", 99))
        .first()
        .unwrap();
    assert!(missing.is_none());

    let fallback = QueryBuilder::new(store.clone(), "items")
        .filter(("id", 99))
        .first_or(record! { "id" => -1 })
        .unwrap();
    assert_eq!(fallback.get_i64("id"), Some(-1));

    let err = QueryBuilder::new(store, "items")
        .filter(("id", 99))
        .first_or_fail()
        .unwrap_err();
    assert!(matches!(err, Error::NotFound));
}

#[test]
fn find_leaves_the_builder_state_unchanged() {
    let store = seeded_store();
    let mut q = QueryBuilder::new(store, "items").filter(("id", Compare::Gt, 5));

    let found = q.find(8).unwrap().unwrap();
    assert_eq!(found.get_i64("id"), Some(8));

    // the lookup token was popped; the declared chain still applies
    assert_eq!(q.predicate(), "id > 5");
    let remaining = q.get().unwrap();
    assert_eq!(ids(&remaining), vec![6, 7, 8, 9, 10]);
}

#[test]
fn find_respects_the_declared_chain() {
    let store = seeded_store();
    let mut q = QueryBuilder::new(store, "items").filter(("id", Compare::Gt, 5));
    // id 3 exists but is excluded by the declared predicate
    assert!(q.find(3).unwrap().is_none());
}
