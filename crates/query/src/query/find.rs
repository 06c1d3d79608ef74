//! The find query.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::adapter::FindOutcome;
use crate::criteria::Expression;
use crate::query::{CatchFn, Criteria, IdOrIds, ReturningFn, hooks_eq};
use crate::sort::SortClause;

/// Pagination state for a find query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    /// Offset/limit pagination.
    Offset {
        /// Number of records to skip.
        offset: u64,
        /// Maximum number of records to return.
        limit: u64,
    },
    /// Cursor pagination.
    Cursor {
        /// Return records after this cursor.
        after: Option<String>,
        /// Return records before this cursor.
        before: Option<String>,
    },
}

/// An immutable description of a fetch operation.
#[derive(Clone, Default)]
pub struct FindQuery {
    /// The resource type to fetch.
    pub resource_type: String,
    /// Filter criteria and the singular flag.
    pub criteria: Criteria,
    /// Relationship paths to include alongside the primary data.
    pub populates: Vec<String>,
    /// Sparse fieldsets, keyed by resource type.
    pub select: HashMap<String, Vec<String>>,
    /// Sort clauses, in significance order.
    pub sort: Vec<SortClause>,
    /// Pagination, if requested.
    pub page: Option<Page>,
    /// Post-processing hook applied to the adapter's outcome.
    pub returning: Option<ReturningFn<FindOutcome>>,
    /// Error transform applied before an adapter failure propagates.
    pub catch: Option<CatchFn>,
}

impl FindQuery {
    /// Creates a find query over the given resource type.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Self::default()
        }
    }

    /// Whether exactly one primary resource is expected.
    pub fn is_singular(&self) -> bool {
        self.criteria.is_singular()
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

    /// Returns a copy including the given relationship paths.
    pub fn with_populates(&self, populates: Vec<String>) -> Self {
        Self {
            populates,
            ..self.clone()
        }
    }

    /// Returns a copy with the given sparse fieldsets.
    pub fn with_select(&self, select: HashMap<String, Vec<String>>) -> Self {
        Self {
            select,
            ..self.clone()
        }
    }

    /// Returns a copy sorted by the given clauses.
    pub fn with_sort(&self, sort: Vec<SortClause>) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }

    /// Returns a copy with the given pagination.
    pub fn with_page(&self, page: Page) -> Self {
        Self {
            page: Some(page),
            ..self.clone()
        }
    }

    /// Returns a copy with the given outcome transform.
    pub fn returning(&self, hook: ReturningFn<FindOutcome>) -> Self {
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

impl fmt::Debug for FindQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FindQuery")
            .field("resource_type", &self.resource_type)
            .field("criteria", &self.criteria)
            .field("populates", &self.populates)
            .field("select", &self.select)
            .field("sort", &self.sort)
            .field("page", &self.page)
            .field("returning", &self.returning.is_some())
            .field("catch", &self.catch.is_some())
            .finish()
    }
}

impl PartialEq for FindQuery {
    fn eq(&self, other: &Self) -> bool {
        self.resource_type == other.resource_type
            && self.criteria == other.criteria
            && self.populates == other.populates
            && self.select == other.select
            && self.sort == other.sort
            && self.page == other.page
            && hooks_eq(&self.returning, &other.returning)
            && hooks_eq(&self.catch, &other.catch)
    }
}
