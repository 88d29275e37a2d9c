//! Fluent query builder for ObjModel.
//!
//! `objmodel-query` is the **query construction layer**. It turns a chain
//! of builder calls into the textual predicate the storage collaborator's
//! filter engine evaluates, resolves declared relationships with one
//! secondary query plus an in-memory equi-join, and reduces dot-delimited
//! paths to count/sum/avg aggregates.
//!
//! # Role In The Architecture
//!
//! - **Tokens**: builder calls accumulate [`Token`]s; order is meaning.
//! - **Rendering**: [`expr::render`] produces one predicate string with
//!   implicit-AND/explicit-OR connector placement.
//! - **Pipeline**: `get()` applies predicate, sort, joins, then paging, in
//!   that fixed order.
//!
//! Builders execute through the `Store` trait from `objmodel-core`. Most
//! users reach this crate via the `objmodel` facade.

pub mod aggregate;
pub mod builder;
pub mod eager;
pub mod expr;

pub use aggregate::Leaves;
pub use builder::{Direction, QueryBuilder};
pub use eager::resolve;
pub use expr::{Compare, FilterArg, Predicate, Token, render, render_value};
