//! The create query.

use std::fmt;

use crate::adapter::CreateOutcome;
use crate::query::{CatchFn, Criteria, ReturningFn, hooks_eq};
use crate::resource::ResourceInput;

/// An immutable description of a create operation.
///
/// `records` always holds every resource to create; a bulk request is the
/// same shape as a single-resource request with more entries.
#[derive(Clone, Default)]
pub struct CreateQuery {
    /// The resource type being created.
    pub resource_type: String,
    /// Filter criteria; unused by create itself but part of the common
    /// query shape.
    pub criteria: Criteria,
    /// The resources to create.
    pub records: Vec<ResourceInput>,
    /// Post-processing hook applied to the adapter's outcome.
    pub returning: Option<ReturningFn<CreateOutcome>>,
    /// Error transform applied before an adapter failure propagates.
    pub catch: Option<CatchFn>,
}

impl CreateQuery {
    /// Creates a create query over the given resource type.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Self::default()
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
    pub fn returning(&self, hook: ReturningFn<CreateOutcome>) -> Self {
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

impl fmt::Debug for CreateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateQuery")
            .field("resource_type", &self.resource_type)
            .field("criteria", &self.criteria)
            .field("records", &self.records)
            .field("returning", &self.returning.is_some())
            .field("catch", &self.catch.is_some())
            .finish()
    }
}

impl PartialEq for CreateQuery {
    fn eq(&self, other: &Self) -> bool {
        self.resource_type == other.resource_type
            && self.criteria == other.criteria
            && self.records == other.records
            && hooks_eq(&self.returning, &other.returning)
            && hooks_eq(&self.catch, &other.catch)
    }
}
