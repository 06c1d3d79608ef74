//! # strata-rest - JSON:API Protocol Layer
//!
//! This crate implements the server-side contract of the
//! [JSON:API specification](https://jsonapi.org/format/): it decides
//! whether an incoming HTTP request is well-formed, translates it into a
//! backend-agnostic query from [`strata_query`], executes it through a
//! registered adapter, and renders a spec-compliant response or error
//! document.
//!
//! ## Request pipeline
//!
//! Every request runs one linear sequence of asynchronous stages:
//!
//! | Stage | Failure |
//! |-------|---------|
//! | method support check | 405 |
//! | body existence check | 400 |
//! | body JSON parse | 400 / 415 |
//! | Content-Type validation | 415 |
//! | Accept negotiation | 406 |
//! | query construction | 400 / 409 |
//! | adapter execution | adapter-reported (404, 409, ...) |
//! | `returning` hook + rendering | - |
//!
//! Failures render as `{"errors": [...]}` documents whose HTTP status is
//! the first error's status. Bulk body validation collects every member
//! failure into one document instead of stopping at the first.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use strata_query::AdapterRegistry;
//! use strata_rest::{ServerConfig, create_app_with_config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut registry = AdapterRegistry::new();
//!     registry.register("articles", Arc::new(my_adapter));
//!
//!     let config = ServerConfig::from_env();
//!     let app = create_app_with_config(registry, config.clone());
//!
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`context`] - the sealed per-request context objects
//! - [`middleware`] - validation checks and content negotiation
//! - [`query_builder`] - request parameters and bodies to query objects
//! - [`pipeline`] - the ordered stage sequence
//! - [`documents`] - response document assembly
//! - [`error`] - error document rendering at the HTTP edge
//! - [`config`] / [`state`] / [`routing`] - server wiring

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod context;
pub mod documents;
pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod query_builder;
pub mod routing;
pub mod state;

pub use config::ServerConfig;
pub use context::{BodyState, EndpointTarget, RequestContext, ResponseContext};
pub use error::RestResult;
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use strata_query::AdapterRegistry;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the axum application with default configuration.
pub fn create_app(registry: AdapterRegistry) -> Router {
    create_app_with_config(registry, ServerConfig::default())
}

/// Creates the axum application with custom configuration.
///
/// Wires the JSON:API routes, the tracing and timeout layers, and CORS
/// when enabled.
pub fn create_app_with_config(registry: AdapterRegistry, config: ServerConfig) -> Router {
    info!(
        resource_types = registry.resource_types().count(),
        "creating JSON:API server"
    );

    let state = AppState::new(Arc::new(registry), config.clone());
    let router = routing::create_routes(state)
        .layer(axum::extract::DefaultBodyLimit::max(config.max_body_size));

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(
            config.request_timeout,
        )));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer from configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// Call once at application startup.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("strata_rest={},tower_http=debug", level)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
