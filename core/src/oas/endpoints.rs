//! # Endpoint Builder
//!
//! Normalizes every `(path, method)` operation into an [`Endpoint`]: path-level parameters
//! merged with operation parameters, responses with their JSON body schema resolved. No
//! detection happens here.

use crate::oas::context::ResolverContext;
use crate::oas::parameters::{ParamLocation, Parameter};
use crate::oas::schema::SchemaNode;
use crate::paths::path_var_names;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// One declared response of an operation.
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code key (`"200"`, `"2XX"`, `"default"`).
    pub status_code: String,
    /// Free text.
    pub description: Option<String>,
    /// Body schema of the first JSON (or `*/*`) media type.
    pub schema: Option<Arc<SchemaNode>>,
}

impl Response {
    fn from_raw<'a>(ctx: &mut ResolverContext<'a>, status_code: &str, raw: &'a Value) -> Self {
        let Some(target) = ctx.resolve_object(raw) else {
            return Self {
                status_code: status_code.to_string(),
                description: None,
                schema: None,
            };
        };

        let mut schema = None;
        if let Some(content) = target.get("content").and_then(Value::as_object) {
            for (media_type, media) in content {
                let is_json = media_type.ends_with("json") || media_type == "*/*";
                if let (true, Some(raw_schema)) = (is_json, media.get("schema")) {
                    schema = ctx.resolve(raw_schema, 0);
                    break;
                }
            }
        }

        Self {
            status_code: status_code.to_string(),
            description: target
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            schema,
        }
    }
}

/// A parsed operation, before detection.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Uppercase HTTP method.
    pub method: String,
    /// Path template.
    pub path: String,
    /// `operationId`, or `"{METHOD}_{path}"`. Unique within a document.
    pub operation_id: String,
    /// Operation summary.
    pub summary: Option<String>,
    /// Operation description.
    pub description: Option<String>,
    /// Summary shared by all methods of the path.
    pub path_summary: Option<String>,
    /// Description shared by all methods of the path.
    pub path_description: Option<String>,
    /// Merged parameters keyed by name, path level first.
    pub parameters: IndexMap<String, Parameter>,
    /// Declared responses in document order.
    pub responses: Vec<Response>,
}

impl Endpoint {
    /// Unique identifier.
    pub fn id(&self) -> &str {
        &self.operation_id
    }

    /// Variable names of the path template.
    pub fn path_var_names(&self) -> Vec<&str> {
        path_var_names(&self.path)
    }

    /// Parameter with `name` at `location`.
    pub fn parameter(&self, name: &str, location: ParamLocation) -> Option<&Parameter> {
        self.parameters
            .values()
            .find(|param| param.name == name && param.location == location)
    }

    /// Description, falling back to the path-level one, on a single line.
    pub fn render_description(&self) -> Option<String> {
        self.description
            .as_ref()
            .or(self.path_description.as_ref())
            .map(|text| text.replace('\n', " "))
    }

    fn from_operation<'a>(
        ctx: &mut ResolverContext<'a>,
        method: &str,
        path: &str,
        operation: &'a Value,
        path_item: &'a Value,
        path_parameters: &[Parameter],
    ) -> Self {
        let mut parameters: IndexMap<String, Parameter> = path_parameters
            .iter()
            .map(|param| (param.name.clone(), param.clone()))
            .collect();
        for param in parse_parameter_list(ctx, operation) {
            parameters.insert(param.name.clone(), param);
        }

        let mut responses = Vec::new();
        if let Some(declared) = operation.get("responses").and_then(Value::as_object) {
            for (status_code, raw) in declared {
                responses.push(Response::from_raw(ctx, status_code, raw));
            }
        }

        let method = method.to_uppercase();
        let operation_id = operation
            .get("operationId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{method}_{path}"));

        Self {
            method,
            path: path.to_string(),
            operation_id,
            summary: str_field(operation, "summary"),
            description: str_field(operation, "description"),
            path_summary: str_field(path_item, "summary"),
            path_description: str_field(path_item, "description"),
            parameters,
            responses,
        }
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn parse_parameter_list<'a>(ctx: &mut ResolverContext<'a>, owner: &'a Value) -> Vec<Parameter> {
    let Some(raw_params) = owner.get("parameters").and_then(Value::as_array) else {
        return Vec::new();
    };
    raw_params
        .iter()
        .filter_map(|raw| Parameter::from_raw(ctx, raw))
        .collect()
}

/// Builds one endpoint per path and included method, in document order.
///
/// Duplicate operation ids get a numeric suffix so ids stay unique.
pub fn build_endpoints(ctx: &mut ResolverContext<'_>, include_methods: &[String]) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();
    let mut seen_ids = HashSet::new();

    let Some(paths) = ctx.document().get("paths").and_then(Value::as_object) else {
        return endpoints;
    };

    for (path, raw_item) in paths {
        let Some(path_item) = ctx.resolve_object(raw_item) else {
            continue;
        };
        let path_parameters = parse_parameter_list(ctx, path_item);

        for method in include_methods {
            let Some(operation) = path_item.get(method.to_lowercase().as_str()) else {
                continue;
            };
            if !operation.is_object() {
                continue;
            }
            info!("Found endpoint {} {}", method.to_uppercase(), path);

            let mut endpoint =
                Endpoint::from_operation(ctx, method, path, operation, path_item, &path_parameters);
            if !seen_ids.insert(endpoint.operation_id.clone()) {
                let base = endpoint.operation_id.clone();
                let mut counter = 2;
                while !seen_ids.insert(format!("{base}_{counter}")) {
                    counter += 1;
                }
                endpoint.operation_id = format!("{base}_{counter}");
                warn!(
                    "Duplicate operation id {base}, renamed to {}",
                    endpoint.operation_id
                );
            }
            endpoints.push(endpoint);
        }
    }
    endpoints
}
