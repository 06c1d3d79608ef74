//! # strata-query - Backend-Neutral Query Model
//!
//! This crate is the storage-agnostic half of the Strata JSON:API server:
//! it defines how an intended storage operation is *described*, leaving the
//! question of how it is *executed* to pluggable adapters.
//!
//! ## Components
//!
//! - [`criteria`] - an immutable, recursively composable filter expression
//!   tree (field comparisons plus `and`/`or` combinators)
//! - [`query`] - five immutable query value objects, one per operation
//!   kind, with copy-on-write mutators
//! - [`resource`] - the wire-level resource shapes crossing the adapter
//!   boundary
//! - [`sort`] - sort clauses in JSON:API `-field` syntax
//! - [`error`] - the structured error model and multi-error aggregation
//! - [`adapter`] - the [`Adapter`](adapter::Adapter) trait and the
//!   type-to-adapter registry
//!
//! ## Immutability
//!
//! Query value objects are constructed once per request and never mutated;
//! methods that "change" a query return a new value. This is what makes a
//! query safe to hand simultaneously to an adapter, a logging tap, and a
//! `returning` hook while the request pipeline is still running.
//!
//! ## Example
//!
//! ```rust
//! use strata_query::{FieldExpression, FindQuery};
//! use serde_json::json;
//!
//! let query = FindQuery::new("articles")
//!     .filtered_by(FieldExpression::eq("published", json!(true)).into())
//!     .matching_id_or_ids(Some("42".into()));
//!
//! assert!(query.is_singular());
//! assert_eq!(query.criteria.clauses.clauses.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod adapter;
pub mod criteria;
pub mod error;
pub mod query;
pub mod resource;
pub mod sort;

pub use adapter::{
    Adapter, AdapterRegistry, CreateOutcome, DeleteOutcome, FindOutcome, RelationshipOutcome,
    UpdateOutcome,
};
pub use criteria::{
    AndExpression, ComparisonOperator, Expression, FieldExpression, FieldRef, OrExpression,
};
pub use error::{ApiResult, Error, ErrorDocument};
pub use query::{
    AddToRelationshipQuery, CatchFn, CreateQuery, Criteria, DeleteQuery, FindQuery, IdOrIds, Page,
    Query, RemoveFromRelationshipQuery, ReturningFn, UpdateQuery,
};
pub use resource::{Data, Relationship, Resource, ResourceIdentifier, ResourceInput};
pub use sort::{SortClause, SortDirection};
