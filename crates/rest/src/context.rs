//! Request and response context objects.
//!
//! A [`RequestContext`] is populated once from the raw HTTP request and is
//! the only request-shaped state the pipeline touches; its field set is
//! fixed so the shape cannot drift as the request moves through the
//! validation stages. Construction from untrusted partial input goes
//! through [`RequestContext::from_init`], which rejects unknown keys.

use axum::response::{IntoResponse, Response};
use http::{HeaderMap, Method, StatusCode, header};
use serde::Deserialize;
use serde_json::Value;

use strata_query::{Error, IdOrIds};

use crate::middleware::content_type::JSON_API_MEDIA_TYPE;

/// The parse state of a request body.
///
/// `Null` records that a body was examined and found empty, which is
/// distinct from `Unparsed` ("parsing was skipped"); downstream stages rely
/// on the difference.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BodyState {
    /// The body has not been parsed.
    #[default]
    Unparsed,
    /// The body was parsed and found empty.
    Null,
    /// The parsed JSON body.
    Json(Value),
}

impl BodyState {
    /// The parsed JSON value, if any.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            BodyState::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// The endpoint a request addresses, as extracted from its path.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointTarget {
    /// The resource type segment.
    pub resource_type: String,
    /// The id segment; a comma-separated segment yields multiple ids.
    pub id_or_ids: Option<IdOrIds>,
    /// The relationship name segment, for relationship endpoints.
    pub relationship: Option<String>,
}

impl EndpointTarget {
    /// A collection endpoint, `/{type}`.
    pub fn collection(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id_or_ids: None,
            relationship: None,
        }
    }

    /// A resource endpoint, `/{type}/{id}`. A comma-separated id segment
    /// addresses several resources at once.
    pub fn resource(resource_type: impl Into<String>, raw_id: &str) -> Self {
        Self {
            resource_type: resource_type.into(),
            id_or_ids: Some(parse_id_segment(raw_id)),
            relationship: None,
        }
    }

    /// A relationship endpoint, `/{type}/{id}/relationships/{rel}`.
    pub fn relationship(
        resource_type: impl Into<String>,
        raw_id: &str,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            id_or_ids: Some(parse_id_segment(raw_id)),
            relationship: Some(relationship.into()),
        }
    }
}

fn parse_id_segment(raw_id: &str) -> IdOrIds {
    if raw_id.contains(',') {
        IdOrIds::Many(
            raw_id
                .split(',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    } else {
        IdOrIds::One(raw_id.to_string())
    }
}

/// The sealed per-request state consumed and produced by the pipeline.
///
/// No properties beyond this fixed set exist; stages may update the listed
/// fields (`ext` and `primary` are filled in by validation) but can never
/// grow the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// The HTTP method.
    pub method: Method,
    /// The resource type addressed by the path.
    pub resource_type: String,
    /// Path-level id constraint, if any.
    pub id_or_ids: Option<IdOrIds>,
    /// The relationship name, for relationship endpoints.
    pub relationship: Option<String>,
    /// Whether the request addresses a relationship rather than resources.
    pub about_relationship: bool,
    /// Whether the request carried a non-empty body.
    pub has_body: bool,
    /// Whether this kind of request must carry a body.
    pub needs_body: bool,
    /// The raw `Content-Type` header value.
    pub content_type: Option<String>,
    /// The raw `Content-Encoding` header value.
    pub content_encoding: Option<String>,
    /// The raw `Accept` header value.
    pub accept: Option<String>,
    /// The JSON:API extensions the request opted into, filled in by
    /// Content-Type validation.
    pub ext: Vec<String>,
    /// Decoded query parameters, in order of appearance.
    pub query_params: Vec<(String, String)>,
    /// The raw body bytes, if any.
    pub raw_body: Option<Vec<u8>>,
    /// The parsed body, filled in by body parsing.
    pub primary: BodyState,
}

impl RequestContext {
    /// Builds a context from the pieces of a live HTTP request.
    pub fn new(
        method: Method,
        target: EndpointTarget,
        headers: &HeaderMap,
        raw_query: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Self {
        let has_body = body.as_ref().is_some_and(|b| !b.is_empty());
        let about_relationship = target.relationship.is_some();
        let needs_body = derive_needs_body(&method, about_relationship);
        let query_params = raw_query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            method,
            resource_type: target.resource_type,
            id_or_ids: target.id_or_ids,
            relationship: target.relationship,
            about_relationship,
            has_body,
            needs_body,
            content_type: header_string(headers, header::CONTENT_TYPE),
            content_encoding: header_string(headers, header::CONTENT_ENCODING),
            accept: header_string(headers, header::ACCEPT),
            ext: Vec::new(),
            query_params,
            raw_body: body,
            primary: BodyState::Unparsed,
        }
    }

    /// Builds a context from an untrusted partial initializer.
    ///
    /// Fields not supplied take the same defaults as [`RequestContext::new`];
    /// unknown keys are rejected rather than silently dropped.
    pub fn from_init(init: Value) -> Result<Self, Error> {
        let init: RequestContextInit = serde_json::from_value(init)
            .map_err(|e| Error::new(400, "Invalid request context").with_detail(e.to_string()))?;

        let method = Method::from_bytes(init.method.to_uppercase().as_bytes())
            .map_err(|_| Error::new(400, "Invalid request context")
                .with_detail(format!("'{}' is not an HTTP method.", init.method)))?;

        let body = init.body.map(String::into_bytes);
        let about_relationship = init
            .about_relationship
            .unwrap_or(init.relationship.is_some());
        let has_body = init
            .has_body
            .unwrap_or_else(|| body.as_ref().is_some_and(|b| !b.is_empty()));
        let needs_body = init
            .needs_body
            .unwrap_or_else(|| derive_needs_body(&method, about_relationship));

        Ok(Self {
            method,
            resource_type: init.resource_type,
            id_or_ids: init.id_or_ids,
            relationship: init.relationship,
            about_relationship,
            has_body,
            needs_body,
            content_type: init.content_type,
            content_encoding: init.content_encoding,
            accept: init.accept,
            ext: init.ext,
            query_params: init.query_params,
            raw_body: body,
            primary: BodyState::Unparsed,
        })
    }

    /// Returns the first value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Whether a request of this shape must carry a body.
///
/// POST and PATCH write resource state and therefore need one; DELETE needs
/// one only on relationship endpoints, where the linkage to remove is in
/// the body.
fn derive_needs_body(method: &Method, about_relationship: bool) -> bool {
    if *method == Method::POST || *method == Method::PATCH {
        true
    } else if *method == Method::DELETE {
        about_relationship
    } else {
        false
    }
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Partial initializer for [`RequestContext::from_init`]. Unknown keys fail
/// deserialization.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RequestContextInit {
    method: String,
    #[serde(rename = "type")]
    resource_type: String,
    #[serde(default)]
    id_or_ids: Option<IdOrIds>,
    #[serde(default)]
    relationship: Option<String>,
    #[serde(default)]
    about_relationship: Option<bool>,
    #[serde(default)]
    has_body: Option<bool>,
    #[serde(default)]
    needs_body: Option<bool>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    content_encoding: Option<String>,
    #[serde(default)]
    accept: Option<String>,
    #[serde(default)]
    ext: Vec<String>,
    #[serde(default)]
    query_params: Vec<(String, String)>,
    #[serde(default)]
    body: Option<String>,
}

/// The response the pipeline renders for a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseContext {
    /// The HTTP status line.
    pub status: StatusCode,
    /// The negotiated response media type, when there is a body.
    pub content_type: Option<String>,
    /// The response document.
    pub body: Option<Value>,
}

impl ResponseContext {
    /// A bodiless response with the given status.
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            body: None,
        }
    }

    /// A document response with the given status and media type.
    pub fn document(status: StatusCode, content_type: impl Into<String>, body: Value) -> Self {
        Self {
            status,
            content_type: Some(content_type.into()),
            body: Some(body),
        }
    }
}

impl IntoResponse for ResponseContext {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => {
                let content_type = self
                    .content_type
                    .unwrap_or_else(|| JSON_API_MEDIA_TYPE.to_string());
                (
                    self.status,
                    [(header::CONTENT_TYPE, content_type)],
                    axum::Json(body),
                )
                    .into_response()
            }
            None => self.status.into_response(),
        }
    }
}
