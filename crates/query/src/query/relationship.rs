//! Relationship mutation queries.

use std::fmt;

use crate::adapter::RelationshipOutcome;
use crate::query::{CatchFn, Criteria, ReturningFn, hooks_eq};
use crate::resource::ResourceIdentifier;

macro_rules! relationship_query {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Default)]
        pub struct $name {
            /// The resource type owning the relationship.
            pub resource_type: String,
            /// Filter criteria; part of the common query shape.
            pub criteria: Criteria,
            /// The id of the resource owning the relationship.
            pub id: String,
            /// The relationship being mutated.
            pub relationship_name: String,
            /// The linkage to add or remove.
            pub linkage: Vec<ResourceIdentifier>,
            /// Post-processing hook applied to the adapter's outcome.
            pub returning: Option<ReturningFn<RelationshipOutcome>>,
            /// Error transform applied before an adapter failure propagates.
            pub catch: Option<CatchFn>,
        }

        impl $name {
            /// Creates a query over the named relationship of one resource.
            pub fn new(
                resource_type: impl Into<String>,
                id: impl Into<String>,
                relationship_name: impl Into<String>,
            ) -> Self {
                Self {
                    resource_type: resource_type.into(),
                    id: id.into(),
                    relationship_name: relationship_name.into(),
                    ..Self::default()
                }
            }

            /// Returns a copy carrying the given linkage.
            pub fn with_linkage(&self, linkage: Vec<ResourceIdentifier>) -> Self {
                Self {
                    linkage,
                    ..self.clone()
                }
            }

            /// Returns a copy with the given outcome transform.
            pub fn returning(&self, hook: ReturningFn<RelationshipOutcome>) -> Self {
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

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("resource_type", &self.resource_type)
                    .field("id", &self.id)
                    .field("relationship_name", &self.relationship_name)
                    .field("linkage", &self.linkage)
                    .field("returning", &self.returning.is_some())
                    .field("catch", &self.catch.is_some())
                    .finish()
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.resource_type == other.resource_type
                    && self.criteria == other.criteria
                    && self.id == other.id
                    && self.relationship_name == other.relationship_name
                    && self.linkage == other.linkage
                    && hooks_eq(&self.returning, &other.returning)
                    && hooks_eq(&self.catch, &other.catch)
            }
        }
    };
}

relationship_query! {
    /// An immutable description of adding members to a to-many relationship.
    AddToRelationshipQuery
}

relationship_query! {
    /// An immutable description of removing members from a to-many
    /// relationship.
    RemoveFromRelationshipQuery
}
