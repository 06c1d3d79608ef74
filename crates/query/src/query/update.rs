//! The update query.

use std::fmt;

use crate::adapter::UpdateOutcome;
use crate::query::{CatchFn, Criteria, IdOrIds, ReturningFn, hooks_eq};
use crate::resource::ResourceInput;

/// An immutable description of an update operation.
///
/// Bulk updates carry several records; each record names the resource it
/// updates through its `id`.
#[derive(Clone, Default)]
pub struct UpdateQuery {
    /// The resource type being updated.
    pub resource_type: String,
    /// Filter criteria and the singular flag.
    pub criteria: Criteria,
    /// The resources to update.
    pub records: Vec<ResourceInput>,
    /// Post-processing hook applied to the adapter's outcome.
    pub returning: Option<ReturningFn<UpdateOutcome>>,
    /// Error transform applied before an adapter failure propagates.
    pub catch: Option<CatchFn>,
}

impl UpdateQuery {
    /// Creates an update query over the given resource type.
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

    /// Returns a copy carrying the given records.
    pub fn with_records(&self, records: Vec<ResourceInput>) -> Self {
        Self {
            records,
            ..self.clone()
        }
    }

    /// Returns a copy with the given outcome transform.
    pub fn returning(&self, hook: ReturningFn<UpdateOutcome>) -> Self {
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

impl fmt::Debug for UpdateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateQuery")
            .field("resource_type", &self.resource_type)
            .field("criteria", &self.criteria)
            .field("records", &self.records)
            .field("returning", &self.returning.is_some())
            .field("catch", &self.catch.is_some())
            .finish()
    }
}

impl PartialEq for UpdateQuery {
    fn eq(&self, other: &Self) -> bool {
        self.resource_type == other.resource_type
            && self.criteria == other.criteria
            && self.records == other.records
            && hooks_eq(&self.returning, &other.returning)
            && hooks_eq(&self.catch, &other.catch)
    }
}
