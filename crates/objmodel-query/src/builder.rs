//! The fluent query builder.
//!
//! A builder is created per query against one schema, mutated by chained
//! calls, and consumed by a terminal operation (`get`, `first`, `find`,
//! `count`, `sum`, `avg`). The store handle is injected at construction;
//! there is no hidden global state.

use crate::aggregate;
use crate::eager;
use crate::expr::{self, Compare, FilterArg, Predicate, Token};
use objmodel_core::error::{Error, Result};
use objmodel_core::record::Record;
use objmodel_core::relation::RelationDef;
use objmodel_core::store::{SortKey, StoreHandle};
use objmodel_core::types::{TypeSpec, TypeTag};
use objmodel_core::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Fluent query builder bound to one schema of one store.
///
/// # Example
///
/// ```ignore
/// let androids = QueryBuilder::new(store, "categories")
///     .filter(("title", Compare::Contains, "android"))
///     .sort("id", Direction::Desc)
///     .get()?;
/// ```
#[derive(Debug)]
pub struct QueryBuilder {
    store: StoreHandle,
    schema: String,
    tokens: Vec<Token>,
    sorts: Vec<SortKey>,
    relations: Vec<RelationDef>,
    offset: i64,
    limit: i64,
}

impl QueryBuilder {
    /// Create a builder for `schema`, querying through `store`.
    pub fn new(store: StoreHandle, schema: impl Into<String>) -> Self {
        Self {
            store,
            schema: schema.into(),
            tokens: Vec::new(),
            sorts: Vec::new(),
            relations: Vec::new(),
            offset: -1,
            limit: -1,
        }
    }

    /// The schema this builder queries.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// The accumulated predicate tokens, in call order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    // ==================== Predicate operations ====================

    /// Append a comparison, AND-chained by default.
    ///
    /// Accepts a structured [`Predicate`] or positional tuples:
    /// `("id", 2)` (equality) and `("title", Compare::Contains, "an")`.
    /// A list value renders as an implicitly-grouped disjunction. A
    /// type-asserting operator wraps the comparison and its implied type
    /// check together in one group.
    pub fn filter(self, arg: impl Into<FilterArg>) -> Self {
        self.push_filter(arg.into(), false)
    }

    /// Append a comparison, OR-chained into the predicate.
    pub fn or_filter(self, arg: impl Into<FilterArg>) -> Self {
        self.push_filter(arg.into(), true)
    }

    /// Append a literal predicate fragment, unvalidated.
    pub fn filter_raw(mut self, fragment: impl Into<String>) -> Self {
        self.tokens.push(Token::Raw {
            or: false,
            fragment: fragment.into(),
        });
        self
    }

    /// Append a literal predicate fragment, OR-chained.
    pub fn or_filter_raw(mut self, fragment: impl Into<String>) -> Self {
        self.tokens.push(Token::Raw {
            or: true,
            fragment: fragment.into(),
        });
        self
    }

    /// Append a `property BETWEEN { low,high }` range.
    pub fn between(self, property: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.push_between(property.into(), low.into(), high.into(), false)
    }

    /// Append a range, OR-chained.
    pub fn or_between(self, property: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.push_between(property.into(), low.into(), high.into(), true)
    }

    /// Append a prefix match (`BEGINSWITH`, or `BEGINSWITH[c]` when
    /// `case_insensitive` is set).
    pub fn starts_with(
        self,
        property: impl Into<String>,
        value: impl Into<String>,
        case_insensitive: bool,
    ) -> Self {
        let op = if case_insensitive {
            Compare::BeginsWithCi
        } else {
            Compare::BeginsWith
        };
        self.push_filter(FilterArg::from((property.into(), op, value.into())), false)
    }

    /// Append a prefix match, OR-chained.
    pub fn or_starts_with(
        self,
        property: impl Into<String>,
        value: impl Into<String>,
        case_insensitive: bool,
    ) -> Self {
        let op = if case_insensitive {
            Compare::BeginsWithCi
        } else {
            Compare::BeginsWith
        };
        self.push_filter(FilterArg::from((property.into(), op, value.into())), true)
    }

    /// Append a suffix match (`ENDSWITH`, or `ENDSWITH[c]`).
    pub fn ends_with(
        self,
        property: impl Into<String>,
        value: impl Into<String>,
        case_insensitive: bool,
    ) -> Self {
        let op = if case_insensitive {
            Compare::EndsWithCi
        } else {
            Compare::EndsWith
        };
        self.push_filter(FilterArg::from((property.into(), op, value.into())), false)
    }

    /// Append a suffix match, OR-chained.
    pub fn or_ends_with(
        self,
        property: impl Into<String>,
        value: impl Into<String>,
        case_insensitive: bool,
    ) -> Self {
        let op = if case_insensitive {
            Compare::EndsWithCi
        } else {
            Compare::EndsWith
        };
        self.push_filter(FilterArg::from((property.into(), op, value.into())), true)
    }

    /// Constrain a polymorphic column's runtime type.
    ///
    /// Accepts explicit tag(s) or a literal to infer from; an ambiguous
    /// inference (several candidate tags) is wrapped in a group so its
    /// internal OR cannot leak into the surrounding chain.
    pub fn of_type(mut self, property: impl Into<String>, spec: impl Into<TypeSpec>) -> Self {
        self.push_type_check(property.into(), spec.into().tags(), false);
        self
    }

    /// Constrain a runtime type, OR-chained.
    pub fn or_of_type(mut self, property: impl Into<String>, spec: impl Into<TypeSpec>) -> Self {
        self.push_type_check(property.into(), spec.into().tags(), true);
        self
    }

    /// Open a parenthesized sub-expression.
    pub fn group_start(mut self) -> Self {
        self.tokens.push(Token::GroupStart { typed: false });
        self
    }

    /// Close a parenthesized sub-expression.
    pub fn group_end(mut self) -> Self {
        self.tokens.push(Token::GroupEnd);
        self
    }

    /// Append a parenthesized sub-expression built by `f`; the group is
    /// closed when `f` returns.
    pub fn group(self, f: impl FnOnce(Self) -> Self) -> Self {
        f(self.group_start()).group_end()
    }

    /// Insert an explicit AND connector.
    pub fn and(mut self) -> Self {
        self.tokens.push(Token::And);
        self
    }

    /// Insert an explicit OR connector.
    pub fn or(mut self) -> Self {
        self.tokens.push(Token::Or);
        self
    }

    /// Invoke `f` with the builder only when `value` is present.
    ///
    /// The primary mechanism for optional-filter composition: a `None`
    /// leaves the builder provably untouched.
    pub fn when<V>(self, value: Option<V>, f: impl FnOnce(Self, V) -> Self) -> Self {
        match value {
            Some(value) => f(self, value),
            None => self,
        }
    }

    // ==================== Sort and paging ====================

    /// Append a sort key; multiple calls compose a multi-key sort in
    /// insertion order, primary key first.
    pub fn sort(mut self, property: impl Into<String>, direction: Direction) -> Self {
        self.sorts.push(SortKey {
            property: property.into(),
            descending: direction == Direction::Desc,
        });
        self
    }

    /// Set the result offset. Negative values mean unset.
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Set the result limit. Negative values mean unset.
    pub fn limit(mut self, count: i64) -> Self {
        self.limit = count;
        self
    }

    /// Set limit and offset together.
    pub fn limit_from(mut self, count: i64, offset: i64) -> Self {
        if offset > 0 {
            self.offset = offset;
        }
        self.limit = count;
        self
    }

    // ==================== Relationships ====================

    /// Register a relationship to resolve during `get()`.
    pub fn with(mut self, def: RelationDef) -> Self {
        self.relations.push(def);
        self
    }

    /// Register a conventional has-many join to `child_schema`.
    pub fn has_many(self, child_schema: impl Into<String>) -> Self {
        let def = RelationDef::has_many(self.schema.clone(), child_schema);
        self.with(def)
    }

    /// Register a conventional has-one join to `child_schema`.
    pub fn has_one(self, child_schema: impl Into<String>) -> Self {
        let def = RelationDef::has_one(self.schema.clone(), child_schema);
        self.with(def)
    }

    /// Register a conventional belongs-to join to `child_schema`.
    pub fn belongs_to(self, child_schema: impl Into<String>) -> Self {
        let def = RelationDef::belongs_to(self.schema.clone(), child_schema);
        self.with(def)
    }

    /// Register a conventional belongs-to-many join to `child_schema`.
    pub fn belongs_to_many(self, child_schema: impl Into<String>) -> Self {
        let def = RelationDef::belongs_to_many(self.schema.clone(), child_schema);
        self.with(def)
    }

    // ==================== Terminals ====================

    /// Render the accumulated tokens into the predicate string.
    pub fn predicate(&self) -> String {
        expr::render(&self.tokens)
    }

    /// Execute the query: predicate, sort, relationship joins, then the
    /// offset/limit window, in that fixed order.
    pub fn get(self) -> Result<Vec<Record>> {
        self.run()
    }

    /// Execute and return the first record, if any.
    pub fn first(self) -> Result<Option<Record>> {
        Ok(self.run()?.into_iter().next())
    }

    /// Execute and return the first record, or `default` when none matched.
    pub fn first_or(self, default: Record) -> Result<Record> {
        Ok(self.first()?.unwrap_or(default))
    }

    /// Execute and return the first record, failing when none matched.
    pub fn first_or_fail(self) -> Result<Record> {
        self.first()?.ok_or(Error::NotFound)
    }

    /// Look up one record by `id` equality on the `id` property.
    ///
    /// The equality token is appended for the lookup and popped afterwards,
    /// leaving the declared predicate chain unchanged.
    pub fn find(&mut self, id: impl Into<Value>) -> Result<Option<Record>> {
        self.find_by("id", id)
    }

    /// Look up one record by equality on an arbitrary key.
    pub fn find_by(&mut self, key: &str, id: impl Into<Value>) -> Result<Option<Record>> {
        self.tokens.push(Token::Where {
            or: false,
            predicate: Predicate::eq(key, id),
        });
        let result = self.run();
        self.tokens.pop();
        Ok(result?.into_iter().next())
    }

    /// Look up by id, falling back to `default` when absent.
    pub fn find_or(&mut self, id: impl Into<Value>, default: Record) -> Result<Record> {
        Ok(self.find(id)?.unwrap_or(default))
    }

    /// Look up by id, failing when absent.
    pub fn find_or_fail(&mut self, id: impl Into<Value>) -> Result<Record> {
        self.find(id)?.ok_or(Error::NotFound)
    }

    /// Count top-level results.
    pub fn count(self) -> Result<usize> {
        Ok(self.run()?.len())
    }

    /// Count the leaves reached by a dot-delimited path.
    pub fn count_of(self, path: &str) -> Result<usize> {
        Ok(aggregate::count(path, &self.run()?))
    }

    /// Sum the numeric leaves reached by a dot-delimited path.
    pub fn sum(self, path: &str) -> Result<f64> {
        Ok(aggregate::sum(path, &self.run()?))
    }

    /// Average the numeric leaves reached by a dot-delimited path.
    ///
    /// A zero-leaf average is NaN, not an error.
    pub fn avg(self, path: &str) -> Result<f64> {
        Ok(aggregate::avg(path, &self.run()?))
    }

    // ==================== Internals ====================

    fn push_filter(mut self, arg: FilterArg, or: bool) -> Self {
        let predicate = arg.into_predicate();
        if predicate.op.is_typed() {
            // bind the comparison and its implied type check in one group
            let tags = TypeTag::infer(&predicate.value);
            let property = predicate.property.clone();
            self.tokens.push(Token::GroupStart { typed: true });
            self.tokens.push(Token::Where { or, predicate });
            self.push_type_check(property, tags, false);
            self.tokens.push(Token::GroupEnd);
        } else {
            self.tokens.push(Token::Where { or, predicate });
        }
        self
    }

    fn push_between(mut self, property: String, low: Value, high: Value, or: bool) -> Self {
        self.tokens.push(Token::Between {
            or,
            property,
            low,
            high,
        });
        self
    }

    fn push_type_check(&mut self, property: String, tags: Vec<TypeTag>, or: bool) {
        if tags.len() > 1 {
            self.tokens.push(Token::GroupStart { typed: false });
            self.tokens.push(Token::TypeCheck { or, property, tags });
            self.tokens.push(Token::GroupEnd);
        } else {
            self.tokens.push(Token::TypeCheck { or, property, tags });
        }
    }

    #[tracing::instrument(level = "debug", skip(self), fields(schema = %self.schema))]
    fn run(&self) -> Result<Vec<Record>> {
        let mut collection = self.store.objects(&self.schema)?;

        let predicate = self.predicate();
        if !predicate.is_empty() {
            tracing::trace!(predicate = %predicate, "applying predicate");
            collection = collection.filtered(&predicate)?;
        }

        if !self.sorts.is_empty() {
            collection = collection.sorted(&self.sorts);
        }

        let (start, end) = self.window();
        if self.relations.is_empty() {
            return Ok(collection.slice(start, end));
        }

        let mut records = collection.records();
        for def in &self.relations {
            records = eager::resolve(&self.store, def, records)?;
        }

        let end = end.unwrap_or(records.len()).min(records.len());
        let start = start.min(end);
        Ok(records[start..end].to_vec())
    }

    /// The half-open paging window, honoring the `-1` unset sentinels.
    fn window(&self) -> (usize, Option<usize>) {
        if self.limit < 0 && self.offset < 0 {
            return (0, None);
        }
        let start = if self.offset > 0 { self.offset as usize } else { 0 };
        let end = if self.limit > 0 {
            Some(start + self.limit as usize)
        } else {
            None
        };
        (start, end)
    }
}
