//! The storage adapter contract.
//!
//! This module defines the [`Adapter`] trait, the seam at which a storage
//! backend plugs into the query layer. Adapters receive fully built,
//! immutable query value objects and return neutral outcome shapes; they
//! never see HTTP concerns, and the query layer never sees storage
//! semantics.
//!
//! # Error Mapping
//!
//! Adapter failures are reported as [`Error`](crate::Error) values and pass
//! through to the response unchanged:
//!
//! | Condition | HTTP Status |
//! |-----------|-------------|
//! | Queried-for id not found | 404 |
//! | Constraint violation | 409 |
//! | Anything unexpected | 500 via `Error::from_unexpected` |
//!
//! # Immutability
//!
//! Every operation takes its query by shared reference. A query may also be
//! read concurrently by logging taps and transform hooks, so an adapter
//! must treat it as frozen; the type system enforces this.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::{ApiResult, Error};
use crate::query::{
    AddToRelationshipQuery, CreateQuery, DeleteQuery, FindQuery, RemoveFromRelationshipQuery,
    UpdateQuery,
};
use crate::resource::{Data, Relationship, Resource};

/// The result of a find operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindOutcome {
    /// The primary data.
    pub primary: Data<Resource>,
    /// Side-loaded resources for the query's `populates` paths.
    pub included: Option<Vec<Resource>>,
    /// Total collection size before pagination, when the adapter knows it.
    pub collection_size: Option<u64>,
}

/// The result of a create operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOutcome {
    /// The created resources.
    pub created: Data<Resource>,
}

/// The result of an update operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateOutcome {
    /// The updated resources.
    pub updated: Data<Resource>,
}

/// The result of a delete operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteOutcome {
    /// The removed resources, when the adapter reports them.
    pub deleted: Option<Data<Resource>>,
}

/// The result of a relationship mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipOutcome {
    /// The relationship before the mutation, when the adapter reports it.
    pub before: Option<Relationship>,
    /// The relationship after the mutation.
    pub after: Option<Relationship>,
}

/// The capability set a storage backend exposes to the query layer.
///
/// Every call is asynchronous and is the only I/O suspension point in a
/// request's pipeline. Implementations must be safe to share across
/// concurrent requests.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Returns a human-readable name for this adapter.
    fn adapter_name(&self) -> &'static str;

    /// Executes a find query.
    ///
    /// # Errors
    ///
    /// 404 when a singular query (or an explicit id constraint) matches
    /// nothing.
    async fn find(&self, query: &FindQuery) -> ApiResult<FindOutcome>;

    /// Executes a create query.
    ///
    /// # Errors
    ///
    /// 409 when a supplied id already exists or another constraint is
    /// violated.
    async fn create(&self, query: &CreateQuery) -> ApiResult<CreateOutcome>;

    /// Executes an update query.
    ///
    /// # Errors
    ///
    /// 404 when a record named by the query does not exist.
    async fn update(&self, query: &UpdateQuery) -> ApiResult<UpdateOutcome>;

    /// Executes a delete query.
    ///
    /// # Errors
    ///
    /// 404 when an explicitly identified record does not exist.
    async fn delete(&self, query: &DeleteQuery) -> ApiResult<DeleteOutcome>;

    /// Adds linkage to a to-many relationship.
    async fn add_to_relationship(
        &self,
        query: &AddToRelationshipQuery,
    ) -> ApiResult<RelationshipOutcome>;

    /// Removes linkage from a to-many relationship.
    async fn remove_from_relationship(
        &self,
        query: &RemoveFromRelationshipQuery,
    ) -> ApiResult<RelationshipOutcome>;
}

/// Maps resource types to the adapters that serve them.
///
/// The registry is populated with explicit [`register`](Self::register)
/// calls at startup and is read-only afterwards, so it can be shared across
/// request pipelines without locking.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `adapter` as the backend for `resource_type`.
    ///
    /// A later registration for the same type replaces the earlier one.
    pub fn register(&mut self, resource_type: impl Into<String>, adapter: Arc<dyn Adapter>) {
        let resource_type = resource_type.into();
        debug!(
            resource_type = %resource_type,
            adapter = adapter.adapter_name(),
            "registering adapter"
        );
        self.adapters.insert(resource_type, adapter);
    }

    /// Looks up the adapter serving `resource_type`.
    ///
    /// # Errors
    ///
    /// 404 when no adapter is registered for the type.
    pub fn adapter_for(&self, resource_type: &str) -> ApiResult<Arc<dyn Adapter>> {
        self.adapters
            .get(resource_type)
            .cloned()
            .ok_or_else(|| Error::unknown_resource_type(resource_type))
    }

    /// Iterates over the registered resource types.
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }
}
