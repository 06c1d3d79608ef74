//! Response document assembly.
//!
//! Builds the JSON:API document bodies the pipeline sends back: primary
//! data documents, relationship linkage documents, and error documents.

use serde_json::{Value, json};

use strata_query::{Data, ErrorDocument, Relationship, Resource};

/// Builds a `{data, included?, meta?}` document.
pub fn data_document(
    data: &Data<Resource>,
    included: Option<&[Resource]>,
    meta: Option<Value>,
) -> Value {
    let mut document = json!({ "data": data });
    if let Some(included) = included {
        document["included"] = json!(included);
    }
    if let Some(meta) = meta {
        document["meta"] = meta;
    }
    document
}

/// Builds a `{data}` linkage document for a relationship.
pub fn relationship_document(relationship: &Relationship) -> Value {
    json!({ "data": relationship.data })
}

/// Builds an `{errors}` document.
pub fn error_document(document: &ErrorDocument) -> Value {
    serde_json::to_value(document).unwrap_or_else(|_| json!({ "errors": [] }))
}
