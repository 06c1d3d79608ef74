//! HTTP-edge error rendering.
//!
//! The error *model* lives in `strata_query`; this module maps an
//! [`ErrorDocument`] onto an HTTP response: the document's first-error
//! status on the status line, the JSON:API media type, and the serialized
//! `{errors}` body.

use http::StatusCode;

use strata_query::ErrorDocument;

use crate::context::ResponseContext;
use crate::documents;
use crate::middleware::content_type::JSON_API_MEDIA_TYPE;

/// Result type alias for pipeline stages, which fail with a whole error
/// document so multi-error aggregation survives the trip out.
pub type RestResult<T> = Result<T, ErrorDocument>;

/// Renders an error document as a response.
pub fn error_response(document: ErrorDocument) -> ResponseContext {
    let status =
        StatusCode::from_u16(document.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    ResponseContext::document(status, JSON_API_MEDIA_TYPE, documents::error_document(&document))
}
