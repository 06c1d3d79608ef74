//! Content-Type validation.
//!
//! The third validation stage: a request that carries a body must declare
//! the JSON:API media type, and may only opt into extensions the endpoint
//! declared support for.

use strata_query::{ApiResult, Error};

use crate::context::RequestContext;

/// The JSON:API media type.
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// The generic JSON media type served to clients that do not ask for
/// JSON:API specifically.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Validates the request's `Content-Type` and returns the extension tokens
/// it opted into.
///
/// The base media type must be exactly [`JSON_API_MEDIA_TYPE`]. An `ext`
/// parameter lists comma-separated extension tokens, each of which must be
/// in `supported_ext`; `charset` is ignored; any other parameter is itself
/// an error. Requests without a body skip the check entirely.
///
/// # Errors
///
/// 415, with a detail that names the required media type, the offending
/// extension (enumerating the supported set), or the offending parameter.
pub fn validate_content_type(
    ctx: &RequestContext,
    supported_ext: &[String],
) -> ApiResult<Vec<String>> {
    if !ctx.has_body {
        return Ok(Vec::new());
    }

    let content_type = ctx.content_type.as_deref().unwrap_or("");
    let mut parts = content_type.split(';').map(str::trim);
    let base = parts.next().unwrap_or("").to_ascii_lowercase();
    if base != JSON_API_MEDIA_TYPE {
        return Err(Error::unsupported_media_type(
            if content_type.is_empty() { "<none>" } else { content_type },
            JSON_API_MEDIA_TYPE,
        ));
    }

    let mut extensions = Vec::new();
    for param in parts.filter(|p| !p.is_empty()) {
        let (name, value) = match param.split_once('=') {
            Some((name, value)) => (
                name.trim().to_ascii_lowercase(),
                value.trim().trim_matches('"'),
            ),
            None => (param.to_ascii_lowercase(), ""),
        };
        match name.as_str() {
            "charset" => {}
            "ext" => {
                for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                    if !supported_ext.iter().any(|s| s == token) {
                        return Err(Error::unsupported_extension(token, supported_ext));
                    }
                    extensions.push(token.to_string());
                }
            }
            _ => return Err(Error::invalid_media_type_param(&name)),
        }
    }

    Ok(extensions)
}
