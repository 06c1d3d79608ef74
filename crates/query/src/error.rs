//! The structured API error model.
//!
//! Everything that can go wrong while validating, translating, or executing
//! a request is represented by a single [`Error`] shape carrying an HTTP
//! status, an optional machine-readable code, a title, and an optional
//! human-readable detail. Multiple errors for one request aggregate into an
//! [`ErrorDocument`], which serializes as `{"errors": [...]}` and selects a
//! single representative HTTP status.
//!
//! Two kinds of errors are kept strictly apart: errors constructed through
//! the named constructors below are *classified* and expose whatever detail
//! the caller supplied, while arbitrary internal failures go through
//! [`Error::from_unexpected`], which logs the source and exposes only a
//! generic title.

use serde::Serialize;
use tracing::error;

/// A single structured API error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("[{status}] {title}")]
pub struct Error {
    /// The HTTP status code this error maps to.
    pub status: u16,
    /// An application-specific error code, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// A short, human-readable summary of the problem.
    pub title: String,
    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Error {
    /// Creates an error with the given status and title.
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            title: title.into(),
            detail: None,
        }
    }

    /// Returns this error with the given detail.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Returns this error with the given application-specific code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Wraps an unclassified internal failure.
    ///
    /// The source error is logged but never exposed to the client; callers
    /// that want a revealing message must construct a classified error
    /// explicitly instead.
    pub fn from_unexpected(source: &dyn std::fmt::Display) -> Self {
        error!(source = %source, "unclassified internal error");
        Self::new(500, "An unknown error occurred while processing this request")
    }

    /// 400: a request body was required but absent.
    pub fn body_required() -> Self {
        Self::new(400, "Missing request body")
            .with_detail("A request body is required for this operation.")
    }

    /// 400: a request body was present but not allowed.
    pub fn body_forbidden() -> Self {
        Self::new(400, "Unexpected request body")
            .with_detail("This operation does not accept a request body.")
    }

    /// 400: the body could not be parsed as JSON.
    pub fn invalid_json() -> Self {
        Self::new(400, "Request contains invalid JSON")
    }

    /// 400: the body was readable but not decodable, preserving the parser's
    /// message.
    pub fn unreadable_body(message: impl Into<String>) -> Self {
        Self::new(400, "Invalid request body").with_detail(message)
    }

    /// 400: a filter expression was malformed.
    pub fn invalid_filter(detail: impl Into<String>) -> Self {
        Self::new(400, "Invalid filter syntax").with_detail(detail)
    }

    /// 400: a query parameter could not be interpreted.
    pub fn invalid_query_param(param: &str, detail: impl Into<String>) -> Self {
        Self::new(400, format!("Invalid '{}' query parameter", param)).with_detail(detail)
    }

    /// 400: a required member was missing from a resource object.
    pub fn missing_field(field: &str) -> Self {
        Self::new(400, "Missing required field")
            .with_detail(format!("Resource objects must carry a '{}' member.", field))
    }

    /// 400: a bulk update member did not name the resource it updates.
    pub fn missing_id_in_update() -> Self {
        Self::new(400, "Missing resource id").with_detail(
            "Every resource in an update request must carry an 'id' member \
             identifying the resource to update.",
        )
    }

    /// 404: no resource matched.
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(404, "Resource not found").with_detail(detail)
    }

    /// 404: the requested resource type is not served.
    pub fn unknown_resource_type(resource_type: &str) -> Self {
        Self::new(404, "Unknown resource type")
            .with_detail(format!("'{}' is not a known resource type.", resource_type))
    }

    /// 405: the endpoint does not support the method.
    pub fn method_not_allowed(method: &str, allowed: &[&str]) -> Self {
        Self::new(405, "Method not supported").with_detail(format!(
            "The {} method is not supported at this endpoint; it supports {}. \
             See the JSON:API specification (https://jsonapi.org/format/#crud) \
             for the methods defined for each endpoint.",
            method,
            allowed.join(", ")
        ))
    }

    /// 406: no representation acceptable to the client can be produced.
    pub fn not_acceptable() -> Self {
        Self::new(406, "Not acceptable").with_detail(
            "No media type available at this endpoint satisfies the Accept header.",
        )
    }

    /// 406: the client only accepts JSON:API with instance parameters.
    pub fn not_acceptable_params() -> Self {
        Self::new(406, "Not acceptable").with_detail(
            "Every JSON:API media range in the Accept header carries media type \
             parameters, and the JSON:API media type must be accepted without \
             parameters for this endpoint to respond with it.",
        )
    }

    /// 409: the request conflicts with server state.
    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::new(409, "Conflict").with_detail(detail)
    }

    /// 415: the Content-Type base media type is not the JSON:API media type.
    pub fn unsupported_media_type(got: &str, required: &str) -> Self {
        Self::new(415, "Unsupported media type").with_detail(format!(
            "The Content-Type of a request body must be {}; got '{}'.",
            required, got
        ))
    }

    /// 415: an `ext` media type parameter named an unsupported extension.
    pub fn unsupported_extension(extension: &str, supported: &[String]) -> Self {
        let supported = if supported.is_empty() {
            "none".to_string()
        } else {
            supported.join(", ")
        };
        Self::new(415, "Unsupported media type extension").with_detail(format!(
            "The extension '{}' is not supported by this endpoint. \
             Supported extensions: {}.",
            extension, supported
        ))
    }

    /// 415: the Content-Type carried a media type parameter other than
    /// `ext` or `charset`.
    pub fn invalid_media_type_param(param: &str) -> Self {
        Self::new(415, "Invalid media type parameter").with_detail(format!(
            "The Content-Type media type parameter '{}' is not allowed; only \
             'ext' and 'charset' are.",
            param
        ))
    }

    /// 415: the request body used an unsupported content encoding.
    pub fn unsupported_encoding(encoding: &str) -> Self {
        Self::new(415, "Unsupported content encoding")
            .with_detail(format!("The '{}' content encoding is not supported.", encoding))
    }
}

/// A collection of errors rendered as one JSON:API error document.
///
/// Errors are kept in the order their checks ran. The document's HTTP status
/// is the status of the *first* error; it is never the numeric maximum or
/// minimum, so a structurally fundamental failure reported early outranks a
/// later validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDocument {
    /// The errors, in check order.
    pub errors: Vec<Error>,
}

impl ErrorDocument {
    /// Creates a document over the given errors, preserving their order.
    pub fn new(errors: Vec<Error>) -> Self {
        Self { errors }
    }

    /// The HTTP status for the response line: the first error's status.
    pub fn status(&self) -> u16 {
        self.errors.first().map(|e| e.status).unwrap_or(500)
    }
}

impl From<Error> for ErrorDocument {
    fn from(error: Error) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl std::fmt::Display for ErrorDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error(s), status {}", self.errors.len(), self.status())
    }
}

impl std::error::Error for ErrorDocument {}

/// Result type alias for fallible query-layer operations.
pub type ApiResult<T> = Result<T, Error>;
