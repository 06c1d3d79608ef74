//! Sort clauses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::criteria::FieldRef;

/// The direction of a sort clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    Ascending,
    /// Descending order.
    Descending,
}

/// A single sort clause over one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortClause {
    /// The field to sort by.
    pub field: FieldRef,
    /// The sort direction.
    pub direction: SortDirection,
}

impl SortClause {
    /// Creates an ascending clause.
    pub fn ascending(field: impl Into<FieldRef>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Creates a descending clause.
    pub fn descending(field: impl Into<FieldRef>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parses a clause from JSON:API sort syntax, where a leading `-`
    /// selects descending order.
    pub fn parse(field: &str) -> Self {
        match field.strip_prefix('-') {
            Some(name) => Self::descending(name),
            None => Self::ascending(field),
        }
    }

    /// Parses a comma-separated list of sort fields.
    pub fn parse_list(fields: &str) -> Vec<Self> {
        fields
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(Self::parse)
            .collect()
    }
}

impl fmt::Display for SortClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => write!(f, "{}", self.field),
            SortDirection::Descending => write!(f, "-{}", self.field),
        }
    }
}
