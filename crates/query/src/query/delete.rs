//! The delete query.

use std::fmt;

use crate::adapter::DeleteOutcome;
use crate::criteria::Expression;
use crate::query::{CatchFn, Criteria, IdOrIds, ReturningFn, hooks_eq};

/// An immutable description of a delete operation.
///
/// The records to remove are identified entirely by the criteria, which may
/// carry an explicit id set, request filters, or both; bulk deletion is the
/// plural case of the same shape.
#[derive(Clone, Default)]
pub struct DeleteQuery {
    /// The resource type being deleted from.
    pub resource_type: String,
    /// Filter criteria identifying the records to remove.
    pub criteria: Criteria,
    /// Post-processing hook applied to the adapter's outcome.
    pub returning: Option<ReturningFn<DeleteOutcome>>,
    /// Error transform applied before an adapter failure propagates.
    pub catch: Option<CatchFn>,
}

impl DeleteQuery {
    /// Creates a delete query over the given resource type.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Self::default()
        }
    }

    /// Returns a copy narrowed by a path-level id constraint.
    pub fn matching_id_or_ids(&self, id_or_ids: Option<IdOrIds>) -> Self {
        Self {
            criteria: self.criteria.matching_id_or_ids(id_or_ids),
            ..self.clone()
        }
    }

    /// Returns a copy with `clause` conjoined to the filter criteria.
    pub fn filtered_by(&self, clause: Expression) -> Self {
        Self {
            criteria: self.criteria.with_clause(clause),
            ..self.clone()
        }
    }

    /// Returns a copy with the given outcome transform.
    pub fn returning(&self, hook: ReturningFn<DeleteOutcome>) -> Self {
        Self {
            returning: Some(hook),
            ..self.clone()
        }
    }

    /// Returns a copy with the given error transform.
    pub fn catching(&self, hook: CatchFn) -> Self {
        Self {
            catch: Some(hook),
            ..self.clone()
        }
    }
}

impl fmt::Debug for DeleteQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeleteQuery")
            .field("resource_type", &self.resource_type)
            .field("criteria", &self.criteria)
            .field("returning", &self.returning.is_some())
            .field("catch", &self.catch.is_some())
            .finish()
    }
}

impl PartialEq for DeleteQuery {
    fn eq(&self, other: &Self) -> bool {
        self.resource_type == other.resource_type
            && self.criteria == other.criteria
            && hooks_eq(&self.returning, &other.returning)
            && hooks_eq(&self.catch, &other.catch)
    }
}
