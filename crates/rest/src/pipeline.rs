//! The request pipeline.
//!
//! Every request runs the same linear sequence of fallible stages:
//!
//! 1. method support check
//! 2. body existence check
//! 3. body JSON parse
//! 4. Content-Type validation
//! 5. Accept negotiation
//! 6. query construction
//! 7. adapter execution
//! 8. `returning` hook
//! 9. document rendering
//!
//! A failing stage short-circuits the rest, except that bulk body member
//! validation (inside stage 5) collects every member failure before
//! rejecting. All state is per-request; the pipeline holds no locks and
//! touches no module-level mutable state, so any number of requests can be
//! in flight at once.

use std::sync::Arc;

use http::StatusCode;
use serde_json::json;
use tracing::debug;

use strata_query::{
    Adapter, CatchFn, Data, Error, ErrorDocument, FindOutcome, Query, ReturningFn,
};

use crate::context::{RequestContext, ResponseContext};
use crate::documents;
use crate::error::{RestResult, error_response};
use crate::middleware::{
    negotiate_content_type, parse_body, validate_body_existence, validate_content_type,
};
use crate::query_builder::{self, PaginationLimits};
use crate::state::AppState;

/// Runs a request through the pipeline, rendering failures as error
/// documents.
pub async fn handle_request(state: &AppState, ctx: RequestContext) -> ResponseContext {
    let mut ctx = ctx;
    match run_stages(state, &mut ctx).await {
        Ok(response) => response,
        Err(document) => {
            debug!(
                status = document.status(),
                errors = document.errors.len(),
                "request rejected"
            );
            error_response(document)
        }
    }
}

async fn run_stages(state: &AppState, ctx: &mut RequestContext) -> RestResult<ResponseContext> {
    debug!(
        method = %ctx.method,
        resource_type = %ctx.resource_type,
        about_relationship = ctx.about_relationship,
        "processing request"
    );

    query_builder::validate_method(ctx)?;
    validate_body_existence(ctx)?;
    ctx.primary = parse_body(ctx)?;
    ctx.ext = validate_content_type(ctx, state.supported_ext())?;

    let content_type =
        negotiate_content_type(ctx.accept.as_deref(), &state.available_media_types())?;

    let limits = PaginationLimits {
        default_limit: state.config().default_page_size,
        max_limit: state.config().max_page_size,
    };
    let query = query_builder::build_query(ctx, &limits)?;
    let adapter = state.registry().adapter_for(query.resource_type())?;

    debug!(
        resource_type = query.resource_type(),
        adapter = adapter.adapter_name(),
        content_type = %content_type,
        "executing query"
    );

    execute(adapter, query, &content_type, ctx.relationship.as_deref()).await
}

/// Dispatches a query to its adapter and renders the outcome.
///
/// The query is passed by reference and compared-by-value semantics hold
/// throughout: the adapter cannot mutate it, and the hooks read it only
/// through the clones they captured at construction.
async fn execute(
    adapter: Arc<dyn Adapter>,
    query: Query,
    content_type: &str,
    relationship: Option<&str>,
) -> RestResult<ResponseContext> {
    match query {
        Query::Find(q) => {
            let outcome = adapter.find(&q).await.map_err(|e| caught(&q.catch, e))?;
            let outcome = transformed(&q.returning, outcome).map_err(|e| caught(&q.catch, e))?;
            match relationship {
                Some(name) => render_relationship_fetch(outcome, name, content_type),
                None => {
                    let meta = (!q.is_singular())
                        .then_some(outcome.collection_size)
                        .flatten()
                        .map(|total| json!({ "total": total }));
                    Ok(ResponseContext::document(
                        StatusCode::OK,
                        content_type,
                        documents::data_document(
                            &outcome.primary,
                            outcome.included.as_deref(),
                            meta,
                        ),
                    ))
                }
            }
        }
        Query::Create(q) => {
            let outcome = adapter.create(&q).await.map_err(|e| caught(&q.catch, e))?;
            let outcome = transformed(&q.returning, outcome).map_err(|e| caught(&q.catch, e))?;
            Ok(ResponseContext::document(
                StatusCode::CREATED,
                content_type,
                documents::data_document(&outcome.created, None, None),
            ))
        }
        Query::Update(q) => {
            let outcome = adapter.update(&q).await.map_err(|e| caught(&q.catch, e))?;
            let outcome = transformed(&q.returning, outcome).map_err(|e| caught(&q.catch, e))?;
            Ok(ResponseContext::document(
                StatusCode::OK,
                content_type,
                documents::data_document(&outcome.updated, None, None),
            ))
        }
        Query::Delete(q) => {
            let outcome = adapter.delete(&q).await.map_err(|e| caught(&q.catch, e))?;
            let outcome = transformed(&q.returning, outcome).map_err(|e| caught(&q.catch, e))?;
            match outcome.deleted {
                Some(deleted) => Ok(ResponseContext::document(
                    StatusCode::OK,
                    content_type,
                    json!({ "meta": { "deleted": deleted.len() } }),
                )),
                None => Ok(ResponseContext::empty(StatusCode::NO_CONTENT)),
            }
        }
        Query::AddToRelationship(q) => {
            let outcome = adapter
                .add_to_relationship(&q)
                .await
                .map_err(|e| caught(&q.catch, e))?;
            let outcome = transformed(&q.returning, outcome).map_err(|e| caught(&q.catch, e))?;
            match outcome.after {
                Some(after) => Ok(ResponseContext::document(
                    StatusCode::OK,
                    content_type,
                    documents::relationship_document(&after),
                )),
                None => Ok(ResponseContext::empty(StatusCode::NO_CONTENT)),
            }
        }
        Query::RemoveFromRelationship(q) => {
            let outcome = adapter
                .remove_from_relationship(&q)
                .await
                .map_err(|e| caught(&q.catch, e))?;
            let outcome = transformed(&q.returning, outcome).map_err(|e| caught(&q.catch, e))?;
            match outcome.after {
                Some(after) => Ok(ResponseContext::document(
                    StatusCode::OK,
                    content_type,
                    documents::relationship_document(&after),
                )),
                None => Ok(ResponseContext::empty(StatusCode::NO_CONTENT)),
            }
        }
    }
}

/// Renders a relationship fetch from the owning resource's linkage.
fn render_relationship_fetch(
    outcome: FindOutcome,
    relationship: &str,
    content_type: &str,
) -> RestResult<ResponseContext> {
    let resource = match &outcome.primary {
        Data::One(resource) => resource,
        Data::Many(resources) => resources.first().ok_or_else(|| {
            ErrorDocument::from(Error::not_found("The owning resource does not exist."))
        })?,
    };
    let linkage = resource.relationships.get(relationship).ok_or_else(|| {
        ErrorDocument::from(Error::not_found(format!(
            "'{}' is not a relationship of this resource.",
            relationship
        )))
    })?;
    Ok(ResponseContext::document(
        StatusCode::OK,
        content_type,
        documents::relationship_document(linkage),
    ))
}

/// Applies a query's error transform, then wraps into a document.
fn caught(hook: &Option<CatchFn>, error: Error) -> ErrorDocument {
    match hook {
        Some(hook) => hook(error).into(),
        None => error.into(),
    }
}

/// Applies a query's `returning` transform to a resolved outcome.
fn transformed<T>(hook: &Option<ReturningFn<T>>, outcome: T) -> Result<T, Error> {
    match hook {
        Some(hook) => hook(outcome),
        None => Ok(outcome),
    }
}
