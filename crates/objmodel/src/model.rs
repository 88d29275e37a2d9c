//! Model trait and query/relationship convenience mixins.
//!
//! Any record type that can name its schema and convert to/from a
//! [`Record`] gets, through blanket extension traits, the full set of
//! static query starters and per-record relationship lookups. No base
//! class, no inheritance: schema-name capability is the whole contract.

use objmodel_core::error::{Error, Result};
use objmodel_core::naming::schema_to_id;
use objmodel_core::record::Record;
use objmodel_core::store::{Store, StoreHandle, UpdateMode};
use objmodel_core::types::TypeSpec;
use objmodel_core::value::Value;
use objmodel_query::{FilterArg, QueryBuilder};

/// A typed view over records of one schema.
pub trait Model: Sized {
    /// The schema this type maps to.
    const SCHEMA: &'static str;

    /// Construct an instance from a stored record.
    fn from_record(record: &Record) -> Result<Self>;

    /// Convert this instance to a record.
    fn to_record(&self) -> Record;
}

fn from_records<M: Model>(records: Vec<Record>) -> Result<Vec<M>> {
    records.iter().map(M::from_record).collect()
}

/// Static query starters bound to a model's schema.
///
/// These exist so query chains can start from the record type instead of
/// a schema string literal; each constructs a fresh builder against the
/// injected store handle.
pub trait ModelQueries: Model {
    /// Start an empty query against this model's schema.
    fn query(store: &StoreHandle) -> QueryBuilder {
        QueryBuilder::new(store.clone(), Self::SCHEMA)
    }

    /// Start a query with one comparison appended.
    fn filter(store: &StoreHandle, arg: impl Into<FilterArg>) -> QueryBuilder {
        Self::query(store).filter(arg)
    }

    /// Start a query with a range appended.
    fn between(
        store: &StoreHandle,
        property: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> QueryBuilder {
        Self::query(store).between(property, low, high)
    }

    /// Start a query with a runtime-type constraint appended.
    fn of_type(
        store: &StoreHandle,
        property: impl Into<String>,
        spec: impl Into<TypeSpec>,
    ) -> QueryBuilder {
        Self::query(store).of_type(property, spec)
    }

    /// Start a query with a prefix match appended.
    fn starts_with(
        store: &StoreHandle,
        property: impl Into<String>,
        value: impl Into<String>,
        case_insensitive: bool,
    ) -> QueryBuilder {
        Self::query(store).starts_with(property, value, case_insensitive)
    }

    /// Start a query with a suffix match appended.
    fn ends_with(
        store: &StoreHandle,
        property: impl Into<String>,
        value: impl Into<String>,
        case_insensitive: bool,
    ) -> QueryBuilder {
        Self::query(store).ends_with(property, value, case_insensitive)
    }

    /// Start a query, invoking `f` only when `value` is present.
    fn when<V>(
        store: &StoreHandle,
        value: Option<V>,
        f: impl FnOnce(QueryBuilder, V) -> QueryBuilder,
    ) -> QueryBuilder {
        Self::query(store).when(value, f)
    }

    /// Look up one instance by id.
    fn find(store: &StoreHandle, id: impl Into<Value>) -> Result<Option<Self>> {
        Self::query(store)
            .find(id)?
            .map(|record| Self::from_record(&record))
            .transpose()
    }

    /// Look up by id, falling back to `default`.
    fn find_or(store: &StoreHandle, id: impl Into<Value>, default: Self) -> Result<Self> {
        Ok(Self::find(store, id)?.unwrap_or(default))
    }

    /// Look up by id, failing when absent.
    fn find_or_fail(store: &StoreHandle, id: impl Into<Value>) -> Result<Self> {
        Self::find(store, id)?.ok_or(Error::NotFound)
    }

    /// First instance of the schema, if any.
    fn first(store: &StoreHandle) -> Result<Option<Self>> {
        Self::query(store)
            .first()?
            .map(|record| Self::from_record(&record))
            .transpose()
    }

    /// First instance, or `default` when the schema is empty.
    fn first_or(store: &StoreHandle, default: Self) -> Result<Self> {
        Ok(Self::first(store)?.unwrap_or(default))
    }

    /// First instance, failing when the schema is empty.
    fn first_or_fail(store: &StoreHandle) -> Result<Self> {
        Self::first(store)?.ok_or(Error::NotFound)
    }

    /// Every instance of the schema.
    fn get(store: &StoreHandle) -> Result<Vec<Self>> {
        from_records(Self::query(store).get()?)
    }

    /// Number of records in the schema.
    fn count(store: &StoreHandle) -> Result<usize> {
        Self::query(store).count()
    }

    /// Sum a dot-delimited path over the schema.
    fn sum(store: &StoreHandle, path: &str) -> Result<f64> {
        Self::query(store).sum(path)
    }

    /// Average a dot-delimited path over the schema.
    fn avg(store: &StoreHandle, path: &str) -> Result<f64> {
        Self::query(store).avg(path)
    }

    /// Insert this instance, or update the stored record with its
    /// properties when one with the same id exists.
    fn save(&self, store: &StoreHandle) -> Result<()> {
        store.create(Self::SCHEMA, self.to_record(), UpdateMode::Modified)
    }

    /// Remove every record of this model's schema.
    fn clear(store: &StoreHandle) -> Result<()> {
        store.delete_all(Self::SCHEMA)
    }
}

impl<M: Model> ModelQueries for M {}

/// Per-record relationship lookups.
///
/// Each method builds a one-shot query against the related model's schema
/// using this record's own field value as the join value, with key names
/// defaulted through the naming conventions. A missing join value falls
/// back to `-1`, which matches nothing.
pub trait ModelRelations: Model {
    /// The single related record this one belongs to
    /// (`brand.belong_to::<Category>()`).
    fn belong_to<P: Model>(&self, store: &StoreHandle) -> Result<Option<P>> {
        self.belong_to_with(store, "id", &schema_to_id(P::SCHEMA))
    }

    /// Belongs-to lookup with explicit key names.
    fn belong_to_with<P: Model>(
        &self,
        store: &StoreHandle,
        child_key: &str,
        owner_key: &str,
    ) -> Result<Option<P>> {
        QueryBuilder::new(store.clone(), P::SCHEMA)
            .filter((child_key, self.join_value(owner_key)))
            .first()?
            .map(|record| P::from_record(&record))
            .transpose()
    }

    /// Every related record this one belongs to.
    fn belong_to_many<P: Model>(&self, store: &StoreHandle) -> Result<Vec<P>> {
        self.belong_to_many_with(store, "id", &schema_to_id(P::SCHEMA))
    }

    /// Belongs-to-many lookup with explicit key names.
    fn belong_to_many_with<P: Model>(
        &self,
        store: &StoreHandle,
        child_key: &str,
        owner_key: &str,
    ) -> Result<Vec<P>> {
        from_records(
            QueryBuilder::new(store.clone(), P::SCHEMA)
                .filter((child_key, self.join_value(owner_key)))
                .get()?,
        )
    }

    /// The single related record keyed by this schema's foreign key
    /// (`category.has_one::<Brand>()`).
    fn has_one<P: Model>(&self, store: &StoreHandle) -> Result<Option<P>> {
        self.has_one_with(store, &schema_to_id(Self::SCHEMA), "id")
    }

    /// Has-one lookup with explicit key names.
    fn has_one_with<P: Model>(
        &self,
        store: &StoreHandle,
        child_key: &str,
        owner_key: &str,
    ) -> Result<Option<P>> {
        QueryBuilder::new(store.clone(), P::SCHEMA)
            .filter((child_key, self.join_value(owner_key)))
            .first()?
            .map(|record| P::from_record(&record))
            .transpose()
    }

    /// Every related record keyed by this schema's foreign key
    /// (`category.has_many::<Brand>()`).
    fn has_many<P: Model>(&self, store: &StoreHandle) -> Result<Vec<P>> {
        self.has_many_with(store, &schema_to_id(Self::SCHEMA), "id")
    }

    /// Has-many lookup with explicit key names.
    fn has_many_with<P: Model>(
        &self,
        store: &StoreHandle,
        child_key: &str,
        owner_key: &str,
    ) -> Result<Vec<P>> {
        from_records(
            QueryBuilder::new(store.clone(), P::SCHEMA)
                .filter((child_key, self.join_value(owner_key)))
                .get()?,
        )
    }

    /// This record's value for `owner_key`, or the never-matching `-1`.
    fn join_value(&self, owner_key: &str) -> Value {
        self.to_record()
            .get(owner_key)
            .cloned()
            .unwrap_or(Value::Int(-1))
    }
}

impl<M: Model> ModelRelations for M {}
