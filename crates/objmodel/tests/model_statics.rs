//! Model trait coverage: static query starters and per-record
//! relationship lookups.

use objmodel::prelude::*;
use objmodel_memory::MemoryStore;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct Category {
    id: i64,
    title: String,
}

impl Model for Category {
    const SCHEMA: &'static str = "categories";

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.get_i64("id").unwrap_or_default(),
            title: record.get_str("title").unwrap_or_default().to_string(),
        })
    }

    fn to_record(&self) -> Record {
        record! { "id" => self.id, "title" => self.title.as_str() }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Brand {
    id: i64,
    category_id: i64,
    count: i64,
    title: String,
}

impl Model for Brand {
    const SCHEMA: &'static str = "brands";

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.get_i64("id").unwrap_or_default(),
            category_id: record.get_i64("category_id").unwrap_or_default(),
            count: record.get_i64("count").unwrap_or_default(),
            title: record.get_str("title").unwrap_or_default().to_string(),
        })
    }

    fn to_record(&self) -> Record {
        record! {
            "id" => self.id,
            "category_id" => self.category_id,
            "count" => self.count,
            "title" => self.title.as_str(),
        }
    }
}

fn seeded_store() -> StoreHandle {
    let store = MemoryStore::new(StoreConfig::named("models"));

    let categories = [
        (1, "windows", "2012/12/12 12:12:12"),
        (2, "android", "12/12/12"),
        (3, "ios", "later"),
    ];
    for (id, title, created_at) in categories {
        store
            .create(
                "categories",
                record! { "id" => id, "title" => title, "created_at" => created_at },
                UpdateMode::Never,
            )
            .expect("seed category");
    }

    let brands = [
        (1, 1, 6, "microsoft"),
        (2, 2, 2, "samsung"),
        (3, 2, 3, "sony"),
    ];
    for (id, category_id, count, title) in brands {
        store
            .create(
                "brands",
                record! { "id" => id, "category_id" => category_id, "count" => count, "title" => title },
                UpdateMode::Never,
            )
            .expect("seed brand");
    }

    Arc::new(store)
}

#[test]
fn static_get_maps_records_to_models() {
    let store = seeded_store();
    let categories = Category::get(&store).unwrap();
    assert_eq!(categories.len(), 3);
    assert_eq!(categories[1].title, "android");
}

#[test]
fn static_filter_starts_a_chain_from_the_type() {
    let store = seeded_store();
    let matched = Category::filter(&store, ("title", Compare::Contains, "s"))
        .sort("id", Direction::Desc)
        .get()
        .unwrap();
    let titles: Vec<&str> = matched.iter().filter_map(|r| r.get_str("title")).collect();
    assert_eq!(titles, vec!["ios", "windows"]);
}

#[test]
fn static_between_and_when_compose() {
    let store = seeded_store();
    let records = Category::between(&store, "id", 1, 2)
        .when(Some("android"), |q, title| q.filter(("title", title)))
        .get()
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get_i64("id"), Some(2));
}

#[test]
fn static_of_type_filters_polymorphic_column() {
    let store = seeded_store();
    let dated = Category::of_type(&store, "created_at", TypeTag::Date)
        .get()
        .unwrap();
    let ids: Vec<i64> = dated.iter().filter_map(|r| r.get_i64("id")).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn static_prefix_and_suffix_starters() {
    let store = seeded_store();
    let windows = Category::starts_with(&store, "title", "win", false)
        .get()
        .unwrap();
    assert_eq!(windows.len(), 1);

    let insensitive = Category::ends_with(&store, "title", "OID", true)
        .get()
        .unwrap();
    assert_eq!(insensitive[0].get_str("title"), Some("android"));
}

#[test]
fn static_find_variants() {
    let store = seeded_store();

    let found = Category::find(&store, 2).unwrap().unwrap();
    assert_eq!(found.title, "android");

    assert!(Category::find(&store, 99).unwrap().is_none());

    let fallback = Category::find_or(
        &store,
        99,
        Category {
            id: -1,
            title: "default".into(),
        },
    )
    .unwrap();
    assert_eq!(fallback.id, -1);

    assert!(matches!(
        Category::find_or_fail(&store, 99),
        Err(Error::NotFound)
    ));
}

#[test]
fn static_first_and_count_and_aggregates() {
    let store = seeded_store();

    let first = Category::first(&store).unwrap().unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(Category::count(&store).unwrap(), 3);
    assert_eq!(Brand::sum(&store, "count").unwrap(), 11.0);
    let avg = Brand::avg(&store, "count").unwrap();
    assert!((avg - 11.0 / 3.0).abs() < 1e-12);
}

#[test]
fn save_upserts_and_clear_empties_the_schema() {
    let store = seeded_store();

    let mut android = Category::find(&store, 2).unwrap().unwrap();
    android.title = "android 15".to_string();
    android.save(&store).unwrap();

    let reloaded = Category::find(&store, 2).unwrap().unwrap();
    assert_eq!(reloaded.title, "android 15");
    assert_eq!(Category::count(&store).unwrap(), 3);

    let fresh = Category {
        id: 4,
        title: "mac".into(),
    };
    fresh.save(&store).unwrap();
    assert_eq!(Category::count(&store).unwrap(), 4);

    Category::clear(&store).unwrap();
    assert_eq!(Category::count(&store).unwrap(), 0);
}

#[test]
fn instance_belong_to_resolves_through_own_foreign_key() {
    let store = seeded_store();
    let samsung = Brand::find(&store, 2).unwrap().unwrap();

    let category: Option<Category> = samsung.belong_to(&store).unwrap();
    assert_eq!(category.unwrap().title, "android");
}

#[test]
fn instance_has_many_resolves_through_conventional_child_key() {
    let store = seeded_store();
    let android = Category::find(&store, 2).unwrap().unwrap();

    let brands: Vec<Brand> = android.has_many(&store).unwrap();
    let titles: Vec<&str> = brands.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["samsung", "sony"]);
}

#[test]
fn instance_has_one_takes_first_match() {
    let store = seeded_store();
    let android = Category::find(&store, 2).unwrap().unwrap();

    let brand: Option<Brand> = android.has_one(&store).unwrap();
    assert_eq!(brand.unwrap().title, "samsung");
}

#[test]
fn instance_lookup_with_missing_join_value_matches_nothing() {
    let store = seeded_store();
    // no category_id property on Category records at all
    let windows = Category::find(&store, 1).unwrap().unwrap();
    let none: Option<Category> = windows.belong_to(&store).unwrap();
    assert!(none.is_none());
}

#[test]
fn instance_lookup_with_explicit_keys() {
    let store = seeded_store();
    let sony = Brand::find(&store, 3).unwrap().unwrap();

    let category: Option<Category> = sony
        .belong_to_with(&store, "id", "category_id")
        .unwrap();
    assert_eq!(category.unwrap().id, 2);
}
