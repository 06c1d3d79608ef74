//! Content negotiation.
//!
//! Computes the response media type from the `Accept` header under the
//! JSON:API rules: the JSON:API media type may only be served when the
//! client accepts it without media type parameters, and a generic
//! `application/json` fallback is always on offer wherever JSON:API is.

use std::str::FromStr;

use mime::Mime;

use strata_query::{ApiResult, Error};

use crate::middleware::content_type::{JSON_API_MEDIA_TYPE, JSON_MEDIA_TYPE};

/// One media range from an `Accept` header.
#[derive(Debug, Clone)]
struct MediaRange {
    mime: Mime,
    /// Quality weight, `q`, in `[0, 1]`.
    q: f32,
    /// Whether the range carries media type parameters other than `q`.
    has_params: bool,
    /// Position in the header, for stable tie-breaking.
    position: usize,
}

impl MediaRange {
    fn essence(&self) -> &str {
        self.mime.essence_str()
    }

    /// Specificity rank: concrete type > `type/*` > `*/*`.
    fn specificity(&self) -> u8 {
        if self.mime.type_() == mime::STAR {
            0
        } else if self.mime.subtype() == mime::STAR {
            1
        } else {
            2
        }
    }

    /// Whether this range matches a concrete media type, ignoring
    /// parameters on both sides.
    fn matches(&self, media_type: &str) -> bool {
        if self.mime.type_() == mime::STAR {
            return true;
        }
        match media_type.split_once('/') {
            Some((type_, _)) if self.mime.type_() == type_ => {
                self.mime.subtype() == mime::STAR || self.essence() == media_type
            }
            _ => false,
        }
    }
}

/// Parses an `Accept` header into ranges ordered by client preference:
/// quality weight first, then specificity, then header order. Ranges that
/// do not parse or are explicitly refused (`q=0`) are dropped.
fn parse_accept(header: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = header
        .split(',')
        .enumerate()
        .filter_map(|(position, part)| {
            let mime = Mime::from_str(part.trim()).ok()?;
            let q = mime
                .get_param("q")
                .and_then(|v| v.as_str().parse::<f32>().ok())
                .unwrap_or(1.0)
                .clamp(0.0, 1.0);
            let has_params = mime.params().any(|(name, _)| name != "q");
            Some(MediaRange {
                mime,
                q,
                has_params,
                position,
            })
        })
        .filter(|range| range.q > 0.0)
        .collect();

    ranges.sort_by(|a, b| {
        b.q.total_cmp(&a.q)
            .then(b.specificity().cmp(&a.specificity()))
            .then(a.position.cmp(&b.position))
    });
    ranges
}

/// Computes the response media type for a request.
///
/// `available` lists the base types the endpoint can serve. The steps run
/// in a fixed order; in particular, a client whose every JSON:API range
/// carries media type parameters is refused *before* any generic
/// preference is honored, so such a client can never receive a bare
/// JSON:API response it did not accept.
///
/// # Errors
///
/// 406 when nothing the endpoint serves is acceptable.
pub fn negotiate_content_type(accept: Option<&str>, available: &[&str]) -> ApiResult<String> {
    let header = match accept {
        Some(value) if !value.trim().is_empty() => value,
        _ => "*/*",
    };
    let ranges = parse_accept(header);

    // Wherever JSON:API is on offer, generic JSON is equally on offer and
    // preferred for clients that do not ask for JSON:API specifically.
    let mut synthetic: Vec<&str> = Vec::with_capacity(available.len() + 1);
    for media_type in available {
        if *media_type == JSON_API_MEDIA_TYPE && !synthetic.contains(&JSON_MEDIA_TYPE) {
            synthetic.push(JSON_MEDIA_TYPE);
        }
        if !synthetic.contains(media_type) {
            synthetic.push(media_type);
        }
    }

    // A client that only accepts parameterized JSON:API ranges has not
    // accepted the bare JSON:API media type at all.
    let json_api_ranges: Vec<&MediaRange> = ranges
        .iter()
        .filter(|r| r.essence() == JSON_API_MEDIA_TYPE)
        .collect();
    if !json_api_ranges.is_empty() && json_api_ranges.iter().all(|r| r.has_params) {
        return Err(Error::not_acceptable_params());
    }

    let preferred = ranges
        .iter()
        .find_map(|range| synthetic.iter().find(|t| range.matches(t)).copied());

    match preferred {
        Some(media_type) if media_type != JSON_API_MEDIA_TYPE => Ok(media_type.to_string()),
        Some(_) => Ok(JSON_API_MEDIA_TYPE.to_string()),
        None => Err(Error::not_acceptable()),
    }
}
