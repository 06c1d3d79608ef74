//! Shared test fixtures: an in-memory adapter and a seeded test server.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{Map, Value, json};

use strata_query::{
    Adapter, AdapterRegistry, AddToRelationshipQuery, ApiResult, CreateOutcome, CreateQuery, Data,
    DeleteOutcome, DeleteQuery, Error, Expression, FindOutcome, FindQuery, Page, Relationship,
    RelationshipOutcome, RemoveFromRelationshipQuery, Resource, ResourceIdentifier, UpdateOutcome,
    UpdateQuery,
};
use strata_rest::{AppState, ServerConfig};

/// A toy adapter holding every resource in one vector; enough to give the
/// pipeline real semantics to talk to.
pub struct MemoryAdapter {
    records: Mutex<Vec<Resource>>,
    next_id: Mutex<u64>,
}

impl MemoryAdapter {
    pub fn seeded(records: Vec<Resource>) -> Self {
        Self {
            records: Mutex::new(records),
            next_id: Mutex::new(0),
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn record(&self, resource_type: &str, id: &str) -> Option<Resource> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.resource_type == resource_type && r.id == id)
            .cloned()
    }

    /// The flat view criteria and sort clauses evaluate against.
    fn flatten(resource: &Resource) -> Value {
        let mut object = Map::new();
        object.insert("id".to_string(), json!(resource.id));
        object.insert("type".to_string(), json!(resource.resource_type));
        for (name, value) in &resource.attributes {
            object.insert(name.clone(), value.clone());
        }
        Value::Object(object)
    }

    fn order(a: &Value, b: &Value) -> Ordering {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            _ => Ordering::Equal,
        }
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    fn adapter_name(&self) -> &'static str {
        "memory"
    }

    async fn find(&self, query: &FindQuery) -> ApiResult<FindOutcome> {
        let records = self.records.lock().unwrap();
        let root = Expression::And(query.criteria.clauses.clone());
        let mut matched: Vec<Resource> = records
            .iter()
            .filter(|r| r.resource_type == query.resource_type)
            .filter(|r| root.matches(&Self::flatten(r)))
            .cloned()
            .collect();

        for clause in query.sort.iter().rev() {
            matched.sort_by(|a, b| {
                let field = clause.field.as_str();
                let ordering = Self::order(
                    Self::flatten(a).get(field).unwrap_or(&Value::Null),
                    Self::flatten(b).get(field).unwrap_or(&Value::Null),
                );
                match clause.direction {
                    strata_query::SortDirection::Ascending => ordering,
                    strata_query::SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        let total = matched.len() as u64;
        if let Some(Page::Offset { offset, limit }) = &query.page {
            matched = matched
                .into_iter()
                .skip(*offset as usize)
                .take(*limit as usize)
                .collect();
        }

        let included = if query.populates.is_empty() {
            None
        } else {
            let mut included = Vec::new();
            for resource in &matched {
                for path in &query.populates {
                    let Some(relationship) = resource.relationships.get(path) else {
                        continue;
                    };
                    for identifier in relationship.data.iter() {
                        if let Some(found) = records.iter().find(|r| {
                            r.resource_type == identifier.resource_type && r.id == identifier.id
                        }) {
                            included.push(found.clone());
                        }
                    }
                }
            }
            Some(included)
        };

        if query.is_singular() {
            match matched.into_iter().next() {
                Some(resource) => Ok(FindOutcome {
                    primary: Data::One(resource),
                    included,
                    collection_size: None,
                }),
                None => Err(Error::not_found("No matching resource was found.")),
            }
        } else {
            Ok(FindOutcome {
                primary: Data::Many(matched),
                included,
                collection_size: Some(total),
            })
        }
    }

    async fn create(&self, query: &CreateQuery) -> ApiResult<CreateOutcome> {
        let mut records = self.records.lock().unwrap();
        let mut created = Vec::new();
        for input in &query.records {
            if let Some(id) = &input.id {
                if records
                    .iter()
                    .any(|r| r.resource_type == input.resource_type && r.id == *id)
                {
                    return Err(Error::conflict(format!(
                        "A resource with id '{}' already exists.",
                        id
                    )));
                }
            }
            let id = match &input.id {
                Some(id) => id.clone(),
                None => {
                    let mut next = self.next_id.lock().unwrap();
                    *next += 1;
                    format!("gen-{}", next)
                }
            };
            let resource = Resource::new(
                &input.resource_type,
                id,
                input.attributes.clone().unwrap_or_default(),
            );
            records.push(resource.clone());
            created.push(resource);
        }

        let created = match <[Resource; 1]>::try_from(created) {
            Ok([resource]) => Data::One(resource),
            Err(created) => Data::Many(created),
        };
        Ok(CreateOutcome { created })
    }

    async fn update(&self, query: &UpdateQuery) -> ApiResult<UpdateOutcome> {
        let mut records = self.records.lock().unwrap();
        let mut updated = Vec::new();
        for input in &query.records {
            let id = input.id.as_deref().unwrap_or("");
            let Some(existing) = records
                .iter_mut()
                .find(|r| r.resource_type == input.resource_type && r.id == id)
            else {
                return Err(Error::not_found(format!(
                    "No '{}' resource has the id '{}'.",
                    input.resource_type, id
                )));
            };
            if let Some(attributes) = &input.attributes {
                for (name, value) in attributes {
                    existing.attributes.insert(name.clone(), value.clone());
                }
            }
            updated.push(existing.clone());
        }

        let updated = match <[Resource; 1]>::try_from(updated) {
            Ok([resource]) => Data::One(resource),
            Err(updated) => Data::Many(updated),
        };
        Ok(UpdateOutcome { updated })
    }

    async fn delete(&self, query: &DeleteQuery) -> ApiResult<DeleteOutcome> {
        let mut records = self.records.lock().unwrap();
        let root = Expression::And(query.criteria.clauses.clone());
        let before = records.len();
        records.retain(|r| r.resource_type != query.resource_type || !root.matches(&Self::flatten(r)));
        if before == records.len() && query.criteria.is_singular() {
            return Err(Error::not_found("No matching resource was found."));
        }
        Ok(DeleteOutcome { deleted: None })
    }

    async fn add_to_relationship(
        &self,
        query: &AddToRelationshipQuery,
    ) -> ApiResult<RelationshipOutcome> {
        let mut records = self.records.lock().unwrap();
        let Some(resource) = records
            .iter_mut()
            .find(|r| r.resource_type == query.resource_type && r.id == query.id)
        else {
            return Err(Error::not_found("The owning resource does not exist."));
        };

        let relationship = resource
            .relationships
            .entry(query.relationship_name.clone())
            .or_insert_with(|| Relationship {
                data: Data::Many(Vec::new()),
            });
        let before = relationship.clone();
        let mut linkage: Vec<ResourceIdentifier> = relationship.data.iter().cloned().collect();
        for identifier in &query.linkage {
            if !linkage.contains(identifier) {
                linkage.push(identifier.clone());
            }
        }
        relationship.data = Data::Many(linkage);
        Ok(RelationshipOutcome {
            before: Some(before),
            after: Some(relationship.clone()),
        })
    }

    async fn remove_from_relationship(
        &self,
        query: &RemoveFromRelationshipQuery,
    ) -> ApiResult<RelationshipOutcome> {
        let mut records = self.records.lock().unwrap();
        let Some(resource) = records
            .iter_mut()
            .find(|r| r.resource_type == query.resource_type && r.id == query.id)
        else {
            return Err(Error::not_found("The owning resource does not exist."));
        };

        let Some(relationship) = resource.relationships.get_mut(&query.relationship_name) else {
            return Err(Error::not_found(format!(
                "'{}' is not a relationship of this resource.",
                query.relationship_name
            )));
        };
        let before = relationship.clone();
        let linkage: Vec<ResourceIdentifier> = relationship
            .data
            .iter()
            .filter(|identifier| !query.linkage.contains(identifier))
            .cloned()
            .collect();
        relationship.data = Data::Many(linkage);
        Ok(RelationshipOutcome {
            before: Some(before),
            after: Some(relationship.clone()),
        })
    }
}

/// Builds a resource with attributes and to-many relationships.
pub fn resource(
    resource_type: &str,
    id: &str,
    attributes: Value,
    relationships: &[(&str, &str, &[&str])],
) -> Resource {
    let Value::Object(attributes) = attributes else {
        panic!("attributes must be a JSON object");
    };
    let mut built = Resource::new(resource_type, id, attributes);
    for (name, target_type, ids) in relationships {
        built.relationships.insert(
            name.to_string(),
            Relationship {
                data: Data::Many(
                    ids.iter()
                        .map(|id| ResourceIdentifier::new(*target_type, *id))
                        .collect(),
                ),
            },
        );
    }
    built
}

/// Seeds a small blog-shaped data set.
pub fn seed_records() -> Vec<Resource> {
    vec![
        resource(
            "articles",
            "1",
            json!({"title": "Criteria trees", "published": true, "views": 90}),
            &[("author", "people", &["9"]), ("comments", "comments", &["5"])],
        ),
        resource(
            "articles",
            "2",
            json!({"title": "Adapter seams", "published": false, "views": 250}),
            &[("author", "people", &["9"])],
        ),
        resource(
            "articles",
            "3",
            json!({"title": "Bulk endpoints", "published": true, "views": 10}),
            &[],
        ),
        resource("people", "9", json!({"name": "Ada"}), &[]),
        resource("comments", "5", json!({"body": "First!"}), &[]),
        resource("comments", "6", json!({"body": "Nice read"}), &[]),
    ]
}

/// Creates a test server over a freshly seeded in-memory adapter.
pub async fn create_test_server() -> (TestServer, Arc<MemoryAdapter>) {
    let adapter = Arc::new(MemoryAdapter::seeded(seed_records()));
    let mut registry = AdapterRegistry::new();
    for resource_type in ["articles", "people", "comments"] {
        registry.register(resource_type, Arc::clone(&adapter) as Arc<dyn Adapter>);
    }

    let config = ServerConfig {
        supported_ext: "bulk".to_string(),
        ..ServerConfig::for_testing()
    };
    let state = AppState::new(Arc::new(registry), config);
    let app = strata_rest::routing::create_routes(state);
    let server = TestServer::new(app).expect("failed to create test server");

    (server, adapter)
}
