//! Query builder.
//!
//! Converts a validated [`RequestContext`] into the query value objects the
//! adapter layer executes, handling:
//! - `filter[field]` / `filter[field][op]` expressions
//! - `sort` clauses (`-` prefix for descending)
//! - `include` relationship paths
//! - `fields[type]` sparse fieldsets
//! - `page[offset]`/`page[limit]` and `page[after]`/`page[before]`
//! - path-level id constraints, merged into the criteria with AND
//! - request bodies, as records (create/update) or linkage (relationships)
//!
//! Bulk bodies are validated in collect-all mode: every invalid member is
//! reported, in document order, before the request is rejected.

use serde_json::Value;

use strata_query::{
    AddToRelationshipQuery, ComparisonOperator, CreateQuery, DeleteQuery, Error, ErrorDocument,
    Expression, FieldExpression, FindQuery, IdOrIds, Page, Query, RemoveFromRelationshipQuery,
    ResourceIdentifier, ResourceInput, SortClause, UpdateQuery,
};

use crate::context::RequestContext;

/// Pagination bounds applied while building find queries.
#[derive(Debug, Clone, Copy)]
pub struct PaginationLimits {
    /// The limit used when a request paginates without naming one.
    pub default_limit: u64,
    /// The largest limit a request may name.
    pub max_limit: u64,
}

/// Checks the method against the endpoint shape.
///
/// This runs before any body handling so that an unsupported method is
/// reported as 405 rather than tripping over body-presence rules that do
/// not apply to it.
///
/// # Errors
///
/// 405, with a detail naming the endpoint's supported methods.
pub fn validate_method(ctx: &RequestContext) -> Result<(), Error> {
    let supported = match (ctx.method.as_str(), ctx.about_relationship) {
        ("GET", _) | ("POST", true) | ("PATCH", false) | ("DELETE", _) => true,
        ("POST", false) => ctx.id_or_ids.is_none(),
        _ => false,
    };
    if supported {
        Ok(())
    } else {
        Err(method_not_allowed(ctx))
    }
}

/// Builds the query value object for a validated request.
///
/// # Errors
///
/// 405 for a method the endpoint does not support; 400 for malformed query
/// parameters or body members (bulk member failures are collected, not
/// short-circuited); 409 for body/endpoint type mismatches.
pub fn build_query(
    ctx: &RequestContext,
    limits: &PaginationLimits,
) -> Result<Query, ErrorDocument> {
    match (ctx.method.as_str(), ctx.about_relationship) {
        ("GET", _) => Ok(Query::Find(build_find(ctx, limits)?)),
        ("POST", false) if ctx.id_or_ids.is_some() => Err(method_not_allowed(ctx).into()),
        ("POST", false) => Ok(Query::Create(build_create(ctx)?)),
        ("POST", true) => Ok(Query::AddToRelationship(build_add_to_relationship(ctx)?)),
        ("PATCH", false) => Ok(Query::Update(build_update(ctx)?)),
        ("DELETE", false) => Ok(Query::Delete(build_delete(ctx)?)),
        ("DELETE", true) => Ok(Query::RemoveFromRelationship(
            build_remove_from_relationship(ctx)?,
        )),
        _ => Err(method_not_allowed(ctx).into()),
    }
}

fn method_not_allowed(ctx: &RequestContext) -> Error {
    let allowed: &[&str] = if ctx.about_relationship {
        &["GET", "POST", "DELETE"]
    } else if ctx.id_or_ids.is_some() {
        &["GET", "PATCH", "DELETE"]
    } else {
        &["GET", "POST", "PATCH", "DELETE"]
    };
    Error::method_not_allowed(ctx.method.as_str(), allowed)
}

fn build_find(ctx: &RequestContext, limits: &PaginationLimits) -> Result<FindQuery, Error> {
    let mut query = FindQuery::new(&ctx.resource_type);

    // Fetching a relationship is a singular find that populates it.
    if let Some(relationship) = &ctx.relationship {
        query = query.with_populates(vec![relationship.clone()]);
    }

    // Request filters first; the path id constraint appends after them.
    for clause in filter_expressions(&ctx.query_params)? {
        query = query.filtered_by(clause);
    }
    query = query.matching_id_or_ids(ctx.id_or_ids.clone());

    if let Some(sort) = ctx.query_param("sort") {
        let clauses = SortClause::parse_list(sort);
        if clauses.is_empty() {
            return Err(Error::invalid_query_param(
                "sort",
                "At least one sort field is required.",
            ));
        }
        query = query.with_sort(clauses);
    }

    if let Some(include) = ctx.query_param("include") {
        let populates: Vec<String> = include
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        query = query.with_populates(populates);
    }

    let mut select = std::collections::HashMap::new();
    for (key, value) in &ctx.query_params {
        if let Some(keys) = bracket_keys(key, "fields") {
            let [fieldset_type] = keys.as_slice() else {
                return Err(Error::invalid_query_param(
                    "fields",
                    format!("Unrecognized fields parameter '{}'.", key),
                ));
            };
            let fields: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();
            select.insert((*fieldset_type).to_string(), fields);
        }
    }
    if !select.is_empty() {
        query = query.with_select(select);
    }

    if let Some(page) = build_page(&ctx.query_params, limits)? {
        query = query.with_page(page);
    }

    Ok(query)
}

fn build_create(ctx: &RequestContext) -> Result<CreateQuery, ErrorDocument> {
    let records = parse_resource_inputs(ctx, false)?;
    Ok(CreateQuery::new(&ctx.resource_type).with_records(records))
}

fn build_update(ctx: &RequestContext) -> Result<UpdateQuery, ErrorDocument> {
    let records = parse_resource_inputs(ctx, true)?;

    // A single-resource endpoint must be updated with that resource.
    if let (Some(IdOrIds::One(path_id)), [record]) = (&ctx.id_or_ids, records.as_slice()) {
        if record.id.as_deref() != Some(path_id.as_str()) {
            return Err(Error::conflict(format!(
                "The resource id '{}' does not match the endpoint's id '{}'.",
                record.id.as_deref().unwrap_or(""),
                path_id
            ))
            .into());
        }
    }

    Ok(UpdateQuery::new(&ctx.resource_type)
        .matching_id_or_ids(ctx.id_or_ids.clone())
        .with_records(records))
}

fn build_delete(ctx: &RequestContext) -> Result<DeleteQuery, Error> {
    let mut query = DeleteQuery::new(&ctx.resource_type);
    for clause in filter_expressions(&ctx.query_params)? {
        query = query.filtered_by(clause);
    }
    query = query.matching_id_or_ids(ctx.id_or_ids.clone());

    // Refuse a delete that names nothing; an empty conjunction would match
    // every record of the type.
    if query.criteria.clauses.clauses.is_empty() {
        return Err(Error::invalid_query_param(
            "filter",
            "A delete request must identify the resources to remove by id or filter.",
        ));
    }
    Ok(query)
}

fn build_add_to_relationship(
    ctx: &RequestContext,
) -> Result<AddToRelationshipQuery, ErrorDocument> {
    let (id, relationship) = relationship_target(ctx)?;
    let linkage = parse_linkage(ctx)?;
    Ok(AddToRelationshipQuery::new(&ctx.resource_type, id, relationship).with_linkage(linkage))
}

fn build_remove_from_relationship(
    ctx: &RequestContext,
) -> Result<RemoveFromRelationshipQuery, ErrorDocument> {
    let (id, relationship) = relationship_target(ctx)?;
    let linkage = parse_linkage(ctx)?;
    Ok(
        RemoveFromRelationshipQuery::new(&ctx.resource_type, id, relationship)
            .with_linkage(linkage),
    )
}

fn relationship_target(ctx: &RequestContext) -> Result<(String, String), Error> {
    let id = match &ctx.id_or_ids {
        Some(IdOrIds::One(id)) => id.clone(),
        _ => {
            return Err(Error::new(400, "Invalid relationship target").with_detail(
                "Relationship mutations address exactly one owning resource.",
            ));
        }
    };
    let relationship = ctx
        .relationship
        .clone()
        .ok_or_else(|| Error::new(400, "Invalid relationship target")
            .with_detail("No relationship name was supplied."))?;
    Ok((id, relationship))
}

/// Parses the body's `data` member as resource identifiers, collecting
/// every invalid member.
fn parse_linkage(ctx: &RequestContext) -> Result<Vec<ResourceIdentifier>, ErrorDocument> {
    let data = body_data(ctx)?;
    let members = data_members(data);

    let mut identifiers = Vec::with_capacity(members.len());
    let mut errors = Vec::new();
    for member in members {
        let Some(object) = member.as_object() else {
            errors.push(Error::new(400, "Invalid resource identifier")
                .with_detail("Each linkage entry must be a resource identifier object."));
            continue;
        };
        if !object.get("type").is_some_and(Value::is_string) {
            errors.push(Error::missing_field("type"));
            continue;
        }
        if !object.get("id").is_some_and(Value::is_string) {
            errors.push(Error::missing_field("id"));
            continue;
        }
        match serde_json::from_value::<ResourceIdentifier>(member.clone()) {
            Ok(identifier) => identifiers.push(identifier),
            Err(e) => errors.push(
                Error::new(400, "Invalid resource identifier").with_detail(e.to_string()),
            ),
        }
    }

    if errors.is_empty() {
        Ok(identifiers)
    } else {
        Err(ErrorDocument::new(errors))
    }
}

/// Parses the body's `data` member as resource inputs, collecting every
/// invalid member rather than stopping at the first.
fn parse_resource_inputs(
    ctx: &RequestContext,
    require_id: bool,
) -> Result<Vec<ResourceInput>, ErrorDocument> {
    let data = body_data(ctx)?;
    let members = data_members(data);

    let mut records = Vec::with_capacity(members.len());
    let mut errors = Vec::new();
    for member in members {
        let Some(object) = member.as_object() else {
            errors.push(Error::new(400, "Invalid resource object")
                .with_detail("Each entry in 'data' must be a resource object."));
            continue;
        };
        let Some(member_type) = object.get("type").and_then(Value::as_str) else {
            errors.push(Error::missing_field("type"));
            continue;
        };
        if member_type != ctx.resource_type {
            errors.push(Error::conflict(format!(
                "The resource type '{}' does not match the endpoint's type '{}'.",
                member_type, ctx.resource_type
            )));
            continue;
        }
        if require_id && !object.get("id").is_some_and(Value::is_string) {
            errors.push(Error::missing_id_in_update());
            continue;
        }
        match serde_json::from_value::<ResourceInput>(member.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                errors.push(Error::new(400, "Invalid resource object").with_detail(e.to_string()))
            }
        }
    }

    if errors.is_empty() {
        Ok(records)
    } else {
        Err(ErrorDocument::new(errors))
    }
}

fn body_data(ctx: &RequestContext) -> Result<&Value, Error> {
    ctx.primary
        .as_json()
        .and_then(|body| body.get("data"))
        .ok_or_else(|| Error::missing_field("data"))
}

fn data_members(data: &Value) -> Vec<&Value> {
    match data {
        Value::Array(members) => members.iter().collect(),
        other => vec![other],
    }
}

/// Splits a bracketed parameter name: `filter[a][b]` with family `filter`
/// yields `["a", "b"]`.
fn bracket_keys<'a>(key: &'a str, family: &str) -> Option<Vec<&'a str>> {
    let mut remaining = key.strip_prefix(family)?;
    if !remaining.starts_with('[') {
        return None;
    }
    let mut keys = Vec::new();
    while let Some(open) = remaining.strip_prefix('[') {
        let end = open.find(']')?;
        keys.push(&open[..end]);
        remaining = &open[end + 1..];
    }
    remaining.is_empty().then_some(keys)
}

fn filter_expressions(params: &[(String, String)]) -> Result<Vec<Expression>, Error> {
    let mut expressions = Vec::new();
    for (key, value) in params {
        let Some(keys) = bracket_keys(key, "filter") else {
            continue;
        };
        expressions.push(filter_expression(&keys, value)?);
    }
    Ok(expressions)
}

fn filter_expression(keys: &[&str], raw: &str) -> Result<Expression, Error> {
    match keys {
        [field] if !field.is_empty() => Ok(FieldExpression::eq(*field, coerce(raw)).into()),
        [field, op] if !field.is_empty() => {
            let operator = op
                .parse::<ComparisonOperator>()
                .map_err(Error::invalid_filter)?;
            let args = match operator {
                ComparisonOperator::In | ComparisonOperator::Nin => vec![Value::Array(
                    raw.split(',').map(|v| coerce(v.trim())).collect(),
                )],
                _ => vec![coerce(raw)],
            };
            Ok(FieldExpression::new(*field, operator, args)?.into())
        }
        _ => Err(Error::invalid_filter(
            "Filters take the form filter[field]=value or filter[field][op]=value.",
        )),
    }
}

/// Interprets a raw parameter value as the JSON scalar it spells, falling
/// back to a string.
fn coerce(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => value,
        _ => Value::String(raw.to_string()),
    }
}

fn build_page(
    params: &[(String, String)],
    limits: &PaginationLimits,
) -> Result<Option<Page>, Error> {
    let mut offset = None;
    let mut limit = None;
    let mut after = None;
    let mut before = None;

    for (key, value) in params {
        let Some(keys) = bracket_keys(key, "page") else {
            continue;
        };
        match keys.as_slice() {
            ["offset"] => offset = Some(parse_page_number(value, "page[offset]")?),
            ["limit"] => limit = Some(parse_page_number(value, "page[limit]")?),
            ["after"] => after = Some(value.clone()),
            ["before"] => before = Some(value.clone()),
            _ => {
                return Err(Error::invalid_query_param(
                    "page",
                    format!("Unrecognized pagination parameter '{}'.", key),
                ));
            }
        }
    }

    let offset_family = offset.is_some() || limit.is_some();
    let cursor_family = after.is_some() || before.is_some();
    if offset_family && cursor_family {
        return Err(Error::invalid_query_param(
            "page",
            "Offset and cursor pagination cannot be combined.",
        ));
    }

    if cursor_family {
        return Ok(Some(Page::Cursor { after, before }));
    }
    if offset_family {
        let limit = limit.unwrap_or(limits.default_limit);
        if limit > limits.max_limit {
            return Err(Error::invalid_query_param(
                "page",
                format!("page[limit] may not exceed {}.", limits.max_limit),
            ));
        }
        return Ok(Some(Page::Offset {
            offset: offset.unwrap_or(0),
            limit,
        }));
    }
    Ok(None)
}

fn parse_page_number(value: &str, param: &str) -> Result<u64, Error> {
    value.parse::<u64>().map_err(|_| {
        Error::invalid_query_param(
            param,
            format!("'{}' is not a non-negative integer.", value),
        )
    })
}
