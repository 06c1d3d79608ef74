//! Wire-level resource shapes.
//!
//! These types mirror the JSON:API document structures that cross the
//! adapter boundary: resource objects, resource identifiers, relationship
//! linkage, and the one-or-many [`Data`] wrapper for primary data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Primary data that is either a single value or a collection.
///
/// JSON:API represents singular and plural data differently on the wire
/// (`{...}` vs `[...]`), and bulk operations are first-class, so the
/// distinction is preserved end to end rather than normalized to a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Data<T> {
    /// A collection of values.
    Many(Vec<T>),
    /// A single value.
    One(T),
}

impl<T> Data<T> {
    /// Number of contained values.
    pub fn len(&self) -> usize {
        match self {
            Data::Many(items) => items.len(),
            Data::One(_) => 1,
        }
    }

    /// True when the collection form is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the contained values.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        match self {
            Data::Many(items) => items.iter(),
            Data::One(item) => std::slice::from_ref(item).iter(),
        }
    }

    /// Maps every contained value, preserving the one/many shape.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Data<U> {
        match self {
            Data::Many(items) => Data::Many(items.into_iter().map(f).collect()),
            Data::One(item) => {
                let mut f = f;
                Data::One(f(item))
            }
        }
    }
}

/// A reference to a resource by type and id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    /// The resource type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// The resource id.
    pub id: String,
    /// Non-standard metadata about the reference.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub meta: Option<Value>,
}

impl ResourceIdentifier {
    /// Creates an identifier.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            meta: None,
        }
    }
}

/// A resource-to-resource reference as carried in a relationship object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// The linkage data.
    pub data: Data<ResourceIdentifier>,
}

/// A resource object as supplied by a client.
///
/// The shape is deliberately loose: attributes and relationships remain
/// opaque JSON until an adapter interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInput {
    /// The resource type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// The client-supplied id, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    /// The attribute members.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub attributes: Option<Map<String, Value>>,
    /// The relationship members.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub relationships: Option<Map<String, Value>>,
    /// Non-standard metadata.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub meta: Option<Value>,
}

/// A resource object as produced by an adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// The resource type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// The resource id.
    pub id: String,
    /// The attribute members.
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub attributes: Map<String, Value>,
    /// The relationship members.
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub relationships: HashMap<String, Relationship>,
    /// Non-standard metadata.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub meta: Option<Value>,
}

impl Resource {
    /// Creates a resource with the given type, id, and attributes.
    pub fn new(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        attributes: Map<String, Value>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            attributes,
            relationships: HashMap::new(),
            meta: None,
        }
    }

    /// Returns the identifier referring to this resource.
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(self.resource_type.clone(), self.id.clone())
    }
}
