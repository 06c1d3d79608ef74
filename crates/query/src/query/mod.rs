//! Query value objects.
//!
//! One immutable descriptor per storage operation. A query is built once per
//! request from validated request data and never mutated afterwards: methods
//! like [`Criteria::matching_id_or_ids`] return a *new* value, so the same
//! query can be read concurrently by the adapter, logging taps, and
//! transform hooks without shared-mutation hazards.

mod create;
mod delete;
mod find;
mod relationship;
mod update;

pub use create::CreateQuery;
pub use delete::DeleteQuery;
pub use find::{FindQuery, Page};
pub use relationship::{AddToRelationshipQuery, RemoveFromRelationshipQuery};
pub use update::UpdateQuery;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::criteria::{AndExpression, Expression, FieldExpression};
use crate::error::{ApiResult, Error};

/// One id or several, as extracted from a request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdOrIds {
    /// Several ids.
    Many(Vec<String>),
    /// A single id.
    One(String),
}

impl From<&str> for IdOrIds {
    fn from(id: &str) -> Self {
        IdOrIds::One(id.to_string())
    }
}

impl From<Vec<String>> for IdOrIds {
    fn from(ids: Vec<String>) -> Self {
        IdOrIds::Many(ids)
    }
}

/// Transforms an error before it propagates out of a query's execution.
pub type CatchFn = Arc<dyn Fn(Error) -> Error + Send + Sync>;

/// Post-processes an adapter outcome once it resolves.
pub type ReturningFn<T> = Arc<dyn Fn(T) -> ApiResult<T> + Send + Sync>;

/// Compares two optional hooks by pointer identity.
///
/// Closures have no structural equality; identity is enough to make cloned
/// queries deep-equal, which the copy-on-write mutators rely on.
pub(crate) fn hooks_eq<T: ?Sized>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

/// The filter state shared by every query: a root conjunction of criteria
/// plus the tri-state singular flag.
///
/// `singular` is `None` until something decides whether the query addresses
/// exactly one resource; [`Criteria::is_singular`] reads it as `false` until
/// then.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Criteria {
    /// The root conjunction. Filters only ever narrow it.
    pub clauses: AndExpression,
    /// Whether exactly one result is expected; `None` while undecided.
    pub singular: Option<bool>,
}

impl Criteria {
    /// Creates empty criteria (matches everything, plural).
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether exactly one result is expected.
    pub fn is_singular(&self) -> bool {
        self.singular.unwrap_or(false)
    }

    /// Returns new criteria with `clause` conjoined to the existing ones.
    pub fn with_clause(&self, clause: Expression) -> Self {
        Self {
            clauses: self.clauses.with_clause(clause),
            singular: self.singular,
        }
    }

    /// Merges a path-level id constraint into the criteria.
    ///
    /// A single id appends `id eq <id>` and marks the criteria singular. A
    /// list of ids appends `id in <ids>`; an explicit plural marker is
    /// preserved, otherwise the criteria become singular-compatible. `None`
    /// returns structurally equal criteria.
    ///
    /// Constraints synthesized here are *appended*: request-supplied filters
    /// and path ids always narrow each other, and repeated calls append
    /// duplicate clauses rather than deduplicate.
    pub fn matching_id_or_ids(&self, id_or_ids: Option<IdOrIds>) -> Self {
        match id_or_ids {
            None => self.clone(),
            Some(IdOrIds::One(id)) => Self {
                clauses: self
                    .clauses
                    .with_clause(FieldExpression::eq("id", Value::String(id)).into()),
                singular: Some(true),
            },
            Some(IdOrIds::Many(ids)) => {
                let values = ids.into_iter().map(Value::String).collect();
                Self {
                    clauses: self
                        .clauses
                        .with_clause(FieldExpression::one_of("id", values).into()),
                    singular: match self.singular {
                        Some(false) => Some(false),
                        _ => Some(true),
                    },
                }
            }
        }
    }
}

/// A query value object of any operation kind, for uniform dispatch.
#[derive(Clone)]
pub enum Query {
    /// Fetch resources.
    Find(FindQuery),
    /// Create resources.
    Create(CreateQuery),
    /// Update resources.
    Update(UpdateQuery),
    /// Delete resources.
    Delete(DeleteQuery),
    /// Add members to a to-many relationship.
    AddToRelationship(AddToRelationshipQuery),
    /// Remove members from a to-many relationship.
    RemoveFromRelationship(RemoveFromRelationshipQuery),
}

impl Query {
    /// The resource type this query addresses.
    pub fn resource_type(&self) -> &str {
        match self {
            Query::Find(q) => &q.resource_type,
            Query::Create(q) => &q.resource_type,
            Query::Update(q) => &q.resource_type,
            Query::Delete(q) => &q.resource_type,
            Query::AddToRelationship(q) => &q.resource_type,
            Query::RemoveFromRelationship(q) => &q.resource_type,
        }
    }
}
