//! # Document Shims
//!
//! Typed structures acting as a validation layer over the raw document. They only capture
//! what the resolver needs up front; everything below `paths` is walked as raw
//! `serde_json::Value` so that `$ref`s can be followed with JSON pointers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root of an OpenAPI document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShimOpenApi {
    /// OpenAPI version (e.g. "3.0.3"). Unquoted YAML versions arrive as numbers.
    #[serde(default)]
    pub openapi: Option<Value>,

    /// Swagger version (e.g. "2.0"), only tolerated with `allow_openapi_2`.
    #[serde(default)]
    pub swagger: Option<Value>,

    /// Metadata about the API.
    pub info: ShimInfo,

    /// Server list.
    #[serde(default)]
    pub servers: Vec<ShimServer>,

    /// Path items keyed by template, in document order.
    #[serde(default)]
    pub paths: IndexMap<String, Value>,

    /// Components section used for reference resolution.
    #[serde(default)]
    pub components: Option<ShimComponents>,

    /// Global security requirements.
    #[serde(default)]
    pub security: Vec<IndexMap<String, Value>>,
}

impl ShimOpenApi {
    /// The `openapi` field as text, whatever its YAML type.
    pub fn openapi_version(&self) -> Option<String> {
        self.openapi.as_ref().map(version_text)
    }
}

/// Renders a version field (`"3.0.1"`, `3.0`, `3`) as text.
pub fn version_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// The `info` object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimInfo {
    /// API title.
    #[serde(default)]
    pub title: Option<String>,
    /// API version.
    #[serde(default)]
    pub version: Option<Value>,
    /// Short summary (3.1+).
    #[serde(default)]
    pub summary: Option<String>,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A `servers` entry.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ShimServer {
    /// Server URL, may be relative.
    pub url: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// The parts of `components` read directly.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimComponents {
    /// Security scheme definitions (or references to them).
    #[serde(default, rename = "securitySchemes")]
    pub security_schemes: IndexMap<String, Value>,
}

/// A security scheme definition.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShimSecurityScheme {
    /// `apiKey`, `http`, `oauth2`, `openIdConnect`, `mutualTLS`.
    #[serde(rename = "type")]
    pub kind: String,
    /// HTTP auth scheme (`basic`, `bearer`).
    #[serde(default)]
    pub scheme: Option<String>,
    /// Parameter name for `apiKey`.
    #[serde(default)]
    pub name: Option<String>,
    /// Location for `apiKey` (`header`, `query`, `cookie`).
    #[serde(default, rename = "in")]
    pub location: Option<String>,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

/// A parameter object after `$ref` resolution.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShimParameter {
    /// Parameter name.
    pub name: String,
    /// Location (`path`, `query`, `header`, `cookie`).
    #[serde(rename = "in")]
    pub location: String,
    /// Required flag (always true for path parameters per OAS).
    #[serde(default)]
    pub required: bool,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
    /// Schema, left raw for the resolver.
    #[serde(default)]
    pub schema: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_requires_info() {
        let missing = json!({ "openapi": "3.0.0", "paths": {} });
        assert!(serde_json::from_value::<ShimOpenApi>(missing).is_err());

        let ok = json!({ "openapi": "3.0.0", "info": { "title": "T", "version": "1" } });
        let shim: ShimOpenApi = serde_json::from_value(ok).unwrap();
        assert!(shim.paths.is_empty());
        assert!(shim.security.is_empty());
    }

    #[test]
    fn test_paths_keep_document_order() {
        let doc = json!({
            "openapi": "3.0.0",
            "info": { "title": "T", "version": "1" },
            "paths": { "/z": {}, "/a": {}, "/m": {} }
        });
        let shim: ShimOpenApi = serde_json::from_value(doc).unwrap();
        let keys: Vec<&str> = shim.paths.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["/z", "/a", "/m"]);
    }

    #[test]
    fn test_parameter_shim() {
        let raw = json!({ "name": "limit", "in": "query", "schema": { "type": "integer" } });
        let param: ShimParameter = serde_json::from_value(raw).unwrap();
        assert_eq!(param.location, "query");
        assert!(!param.required);
    }
}
