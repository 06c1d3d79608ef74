//! Application state.
//!
//! The shared, read-only state available to every request: the adapter
//! registry, the server configuration, and the precomputed supported
//! extension set. Everything request-scoped lives on the
//! [`RequestContext`](crate::context::RequestContext) instead.

use std::sync::Arc;

use strata_query::AdapterRegistry;

use crate::config::ServerConfig;
use crate::middleware::content_type::JSON_API_MEDIA_TYPE;

/// Shared application state for the JSON:API protocol layer.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<AdapterRegistry>,
    config: Arc<ServerConfig>,
    supported_ext: Arc<Vec<String>>,
}

impl AppState {
    /// Creates application state over a populated registry.
    pub fn new(registry: Arc<AdapterRegistry>, config: ServerConfig) -> Self {
        let supported_ext = Arc::new(config.supported_extensions());
        Self {
            registry,
            config: Arc::new(config),
            supported_ext,
        }
    }

    /// Returns the adapter registry.
    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the JSON:API extensions this server supports.
    pub fn supported_ext(&self) -> &[String] {
        &self.supported_ext
    }

    /// Returns the base media types this server can respond with.
    pub fn available_media_types(&self) -> Vec<&str> {
        vec![JSON_API_MEDIA_TYPE]
    }
}
