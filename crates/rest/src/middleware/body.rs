//! Request body checks.
//!
//! The first two validation stages: body presence must match what the
//! request shape demands, and whatever body is present must parse as JSON.
//! Parsing is deliberately type-agnostic so that a body sent under a wrong
//! but parseable Content-Type still gets the more specific media type error
//! from the later Content-Type stage.

use serde_json::Value;

use strata_query::{ApiResult, Error};

use crate::context::{BodyState, RequestContext};

/// Checks that a body is present exactly when one is required.
///
/// # Errors
///
/// 400 when a required body is absent, or a forbidden one is present.
pub fn validate_body_existence(ctx: &RequestContext) -> ApiResult<()> {
    if ctx.has_body == ctx.needs_body {
        Ok(())
    } else if ctx.needs_body {
        Err(Error::body_required())
    } else {
        Err(Error::body_forbidden())
    }
}

/// Parses the raw body as JSON, regardless of its declared content type.
///
/// An absent or empty body parses to [`BodyState::Null`]; a zero-length
/// body is valid for some verbs and must stay distinguishable from "never
/// parsed".
///
/// # Errors
///
/// 415 for an unsupported content encoding, 400 for malformed JSON; any
/// other decoding failure is reported with its original message.
pub fn parse_body(ctx: &RequestContext) -> ApiResult<BodyState> {
    if let Some(encoding) = &ctx.content_encoding {
        if !encoding.eq_ignore_ascii_case("identity") {
            return Err(Error::unsupported_encoding(encoding));
        }
    }

    let raw = match &ctx.raw_body {
        Some(bytes) => bytes.as_slice(),
        None => return Ok(BodyState::Null),
    };
    let text = std::str::from_utf8(raw).map_err(|e| Error::unreadable_body(e.to_string()))?;
    if text.trim().is_empty() {
        return Ok(BodyState::Null);
    }

    let value: Value = serde_json::from_str(text).map_err(|_| Error::invalid_json())?;
    Ok(BodyState::Json(value))
}
