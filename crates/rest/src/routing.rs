//! Route configuration.
//!
//! Thin axum glue: three route shapes cover the JSON:API URL space, and a
//! single dispatch path adapts each hit into a [`RequestContext`] for the
//! pipeline. Method handling happens inside the pipeline, where an
//! unsupported method produces a 405 error document instead of the
//! router's bare response.

use axum::{
    Router,
    body::Bytes,
    extract::{Path, RawQuery, State},
    response::{IntoResponse, Response},
    routing::any,
};
use http::{HeaderMap, Method};

use crate::context::{EndpointTarget, RequestContext};
use crate::pipeline;
use crate::state::AppState;

/// Creates the JSON:API routes.
///
/// # Routes
///
/// - `/{type}` - collection endpoint (find, create, bulk update/delete)
/// - `/{type}/{id}` - resource endpoint; a comma-separated id segment
///   addresses several resources
/// - `/{type}/{id}/relationships/{relationship}` - relationship endpoint
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/{resource_type}", any(collection_handler))
        .route("/{resource_type}/{id}", any(resource_handler))
        .route(
            "/{resource_type}/{id}/relationships/{relationship}",
            any(relationship_handler),
        )
        .with_state(state)
}

async fn collection_handler(
    State(state): State<AppState>,
    Path(resource_type): Path<String>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let target = EndpointTarget::collection(resource_type);
    dispatch(&state, method, target, &headers, query.as_deref(), body).await
}

async fn resource_handler(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let target = EndpointTarget::resource(resource_type, &id);
    dispatch(&state, method, target, &headers, query.as_deref(), body).await
}

async fn relationship_handler(
    State(state): State<AppState>,
    Path((resource_type, id, relationship)): Path<(String, String, String)>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let target = EndpointTarget::relationship(resource_type, &id, relationship);
    dispatch(&state, method, target, &headers, query.as_deref(), body).await
}

async fn dispatch(
    state: &AppState,
    method: Method,
    target: EndpointTarget,
    headers: &HeaderMap,
    query: Option<&str>,
    body: Bytes,
) -> Response {
    let body = (!body.is_empty()).then(|| body.to_vec());
    let ctx = RequestContext::new(method, target, headers, query, body);
    pipeline::handle_request(state, ctx).await.into_response()
}
