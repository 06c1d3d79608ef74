//! Server configuration.
//!
//! Supports programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `STRATA_SERVER_PORT` | 8080 | Server port |
//! | `STRATA_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `STRATA_LOG_LEVEL` | info | Log level |
//! | `STRATA_MAX_BODY_SIZE` | 1048576 | Max request body (bytes) |
//! | `STRATA_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `STRATA_ENABLE_CORS` | true | Enable CORS |
//! | `STRATA_CORS_ORIGINS` | * | Allowed origins |
//! | `STRATA_SUPPORTED_EXT` | (empty) | Supported JSON:API extensions |
//! | `STRATA_BASE_URL` | http://localhost:8080 | Server base URL |

use clap::Parser;

/// Server configuration for the JSON:API protocol layer.
///
/// Construct from environment variables with [`ServerConfig::from_env`],
/// from command line arguments with [`ServerConfig::parse`], or
/// programmatically with struct update syntax over `Default`.
#[derive(Debug, Clone, Parser)]
#[command(name = "strata-server")]
#[command(about = "Strata JSON:API Server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "STRATA_SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "STRATA_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "STRATA_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "STRATA_MAX_BODY_SIZE", default_value = "1048576")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "STRATA_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "STRATA_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "STRATA_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(
        long,
        env = "STRATA_CORS_METHODS",
        default_value = "GET,POST,PATCH,DELETE,OPTIONS"
    )]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "STRATA_CORS_HEADERS",
        default_value = "Content-Type,Accept,Authorization"
    )]
    pub cors_headers: String,

    /// JSON:API extensions this server supports (comma-separated).
    #[arg(long, env = "STRATA_SUPPORTED_EXT", default_value = "")]
    pub supported_ext: String,

    /// Base URL for the server (used in links).
    #[arg(long, env = "STRATA_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Default page size applied when a request paginates without a limit.
    #[arg(long, env = "STRATA_DEFAULT_PAGE_SIZE", default_value = "20")]
    pub default_page_size: u64,

    /// Maximum page size a request may name.
    #[arg(long, env = "STRATA_MAX_PAGE_SIZE", default_value = "1000")]
    pub max_page_size: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 1024 * 1024,
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,PATCH,DELETE,OPTIONS".to_string(),
            cors_headers: "Content-Type,Accept,Authorization".to_string(),
            supported_ext: String::new(),
            base_url: "http://localhost:8080".to_string(),
            default_page_size: 20,
            max_page_size: 1000,
        }
    }
}

impl ServerConfig {
    /// Creates a configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the supported extension tokens as a list.
    pub fn supported_extensions(&self) -> Vec<String> {
        self.supported_ext
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Validates the configuration and returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }
        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }
        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }
        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }
        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Creates a configuration suitable for tests: ephemeral port, short
    /// timeouts, no CORS.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            base_url: "http://localhost:0".to_string(),
            default_page_size: 10,
            max_page_size: 100,
            ..Self::default()
        }
    }
}
