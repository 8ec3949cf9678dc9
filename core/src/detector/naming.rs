//! # Resource Naming
//!
//! Strategies run in order until every endpoint has a distinct resource name:
//!
//! 1. The payload's schema name, else the singularized last static path segment.
//! 2. Names built from the paths with the shared prefix stripped.
//! 3. The operation id.
//!
//! `name_resources_by_operation` forces the last strategy.

use crate::detector::response::ResponseDetection;
use crate::inflect::singularize;
use crate::oas::endpoints::Endpoint;
use crate::paths::{non_var_path_parts, table_names_from_paths};
use heck::ToSnakeCase;
use std::collections::HashSet;
use tracing::debug;

/// Output of the naming pass for one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Naming {
    /// Name of the generated resource. Unique across the collection.
    pub resource_name: String,
    /// Destination table. Several resources may share one.
    pub table_name: String,
}

fn names_are_distinct(names: &[Naming]) -> bool {
    let distinct: HashSet<&str> = names.iter().map(|n| n.resource_name.as_str()).collect();
    distinct.len() == names.len()
}

fn entity_name(endpoint: &Endpoint, response: &ResponseDetection) -> String {
    let from_payload = response
        .payload
        .as_ref()
        .and_then(|payload| payload.name())
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string);
    let name = from_payload
        .or_else(|| non_var_path_parts(&endpoint.path).last().map(|part| singularize(part)))
        .unwrap_or_else(|| endpoint.operation_id.clone());
    name.to_snake_case()
}

/// Names every endpoint. The result is aligned with `endpoints`.
pub fn detect_names(
    endpoints: &[Endpoint],
    responses: &[ResponseDetection],
    name_resources_by_operation: bool,
) -> Vec<Naming> {
    let mut names: Vec<Naming> = endpoints
        .iter()
        .zip(responses)
        .map(|(endpoint, response)| {
            let name = entity_name(endpoint, response);
            Naming {
                resource_name: name.clone(),
                table_name: name,
            }
        })
        .collect();
    if names_are_distinct(&names) && !name_resources_by_operation {
        return names;
    }

    debug!("Resource names collide, deriving them from paths");
    let paths: Vec<&str> = endpoints.iter().map(|e| e.path.as_str()).collect();
    for (naming, from_path) in names.iter_mut().zip(table_names_from_paths(&paths)) {
        let from_path = from_path.to_snake_case();
        if naming.table_name.is_empty() {
            naming.table_name = from_path.clone();
        }
        naming.resource_name = from_path;
    }
    if names_are_distinct(&names) && !name_resources_by_operation {
        return names;
    }

    debug!("Resource names still collide, using operation ids");
    for (naming, endpoint) in names.iter_mut().zip(endpoints) {
        naming.resource_name = endpoint.operation_id.to_snake_case();
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::response::detect_responses;
    use crate::oas::context::ResolverContext;
    use crate::oas::endpoints::build_endpoints;
    use crate::warnings::Warnings;
    use serde_json::{json, Value};

    fn names(paths: Value, by_operation: bool) -> Vec<Naming> {
        let doc = json!({ "paths": paths });
        let mut ctx = ResolverContext::new(&doc);
        let endpoints = build_endpoints(&mut ctx, &["get".to_string()]);
        let mut warnings = Warnings::new();
        let responses = detect_responses(&endpoints, &mut warnings);
        detect_names(&endpoints, &responses, by_operation)
    }

    fn resource_names(names: &[Naming]) -> Vec<&str> {
        names.iter().map(|n| n.resource_name.as_str()).collect()
    }

    #[test]
    fn test_payload_names() {
        let found = names(
            json!({
                "/v1/users": { "get": { "responses": { "200": { "description": "ok", "content": {
                    "application/json": { "schema": { "type": "array", "items": { "title": "UserAccount", "type": "object" } } }
                }}}}},
                "/v1/teams": { "get": { "responses": {} } }
            }),
            false,
        );
        assert_eq!(resource_names(&found), vec!["user_account", "team"]);
        assert_eq!(found[1].table_name, "team");
    }

    #[test]
    fn test_path_names_when_colliding() {
        let found = names(
            json!({
                "/api/v2/pokemon": { "get": { "responses": {} } },
                "/api/v2/pokemon/{name}": { "get": { "responses": {} } }
            }),
            false,
        );
        assert_eq!(resource_names(&found), vec!["pokemon", "pokemon_name"]);
        assert_eq!(found[1].table_name, "pokemon");
    }

    #[test]
    fn test_operation_ids() {
        let found = names(
            json!({
                "/pets": { "get": { "operationId": "listPets", "responses": {} } },
                "/pets/{id}": { "get": { "operationId": "showPetById", "responses": {} } }
            }),
            true,
        );
        assert_eq!(resource_names(&found), vec!["list_pets", "show_pet_by_id"]);
        assert_eq!(found[0].table_name, "pet");
    }
}
