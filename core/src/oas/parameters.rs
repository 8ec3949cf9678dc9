//! # Parameters
//!
//! Operation and path-level parameters resolved into comparable records.

use crate::oas::context::ResolverContext;
use crate::oas::properties::PropertyPath;
use crate::oas::schema::{SchemaNode, SchemaType};
use crate::oas::shims::ShimParameter;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Schema assumed for parameters declaring none.
static STRING_SCHEMA: LazyLock<Value> = LazyLock::new(|| json!({ "type": "string" }));

/// Where a parameter is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Templated into the path.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParamLocation {
    /// Parses the `in` keyword.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }

    /// Keyword spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved parameter. Identity is `(name, location)` within one operation.
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Where it is sent.
    pub location: ParamLocation,
    /// Must be supplied by the caller.
    pub required: bool,
    /// Free text.
    pub description: Option<String>,
    /// Resolved value schema.
    pub schema: Arc<SchemaNode>,
}

impl Parameter {
    /// Resolves a raw parameter object or `$ref`.
    ///
    /// Returns `None` for unresolvable references and malformed parameters.
    pub fn from_raw<'a>(ctx: &mut ResolverContext<'a>, raw: &'a Value) -> Option<Self> {
        let target = ctx.resolve_object(raw)?;
        let shim: ShimParameter = serde_json::from_value(target.clone()).ok()?;
        let location = ParamLocation::parse(&shim.location)?;

        let schema = match target.get("schema") {
            Some(schema) => ctx.resolve(schema, 0)?,
            None => ctx.resolve(&*STRING_SCHEMA, 0)?,
        };

        let description = raw
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or(shim.description)
            .or_else(|| schema.description.clone());

        Some(Self {
            name: shim.name,
            // Path parameters are always required, whatever the document says.
            required: shim.required || location == ParamLocation::Path,
            location,
            description,
            schema,
        })
    }

    /// Declared types of the value schema.
    pub fn types(&self) -> &BTreeSet<SchemaType> {
        &self.schema.types
    }

    /// `default` of the value schema.
    pub fn default(&self) -> Option<&Value> {
        self.schema.default.as_ref()
    }

    /// `maximum` of the value schema.
    pub fn maximum(&self) -> Option<f64> {
        self.schema.maximum
    }

    /// Finds a direct property of `schema` that could feed this parameter.
    ///
    /// An exact name match wins; otherwise the last property named `fallback`.
    pub fn find_input_property(
        &self,
        schema: &SchemaNode,
        fallback: Option<&str>,
    ) -> Option<PropertyPath> {
        let mut found = None;
        for prop in schema.properties.values() {
            if prop.name == self.name {
                found = Some(prop);
                break;
            }
            if Some(prop.name.as_str()) == fallback {
                found = Some(prop);
            }
        }
        found.map(|prop| PropertyPath::new(vec![prop.name.clone()], Arc::clone(&prop.schema)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_without_schema_is_string() {
        let doc = json!({ "name": "q", "in": "query" });
        let mut ctx = ResolverContext::new(&doc);
        let param = Parameter::from_raw(&mut ctx, &doc).unwrap();
        assert_eq!(param.location, ParamLocation::Query);
        assert!(param.types().contains(&SchemaType::String));
        assert!(!param.required);
    }

    #[test]
    fn test_referenced_parameter() {
        let doc = json!({
            "components": { "parameters": { "Limit": {
                "name": "limit", "in": "query", "description": "Page size",
                "schema": { "type": "integer", "maximum": 100, "default": 25 }
            }}},
            "ref": { "$ref": "#/components/parameters/Limit" }
        });
        let mut ctx = ResolverContext::new(&doc);
        let param = Parameter::from_raw(&mut ctx, &doc["ref"]).unwrap();
        assert_eq!(param.name, "limit");
        assert_eq!(param.maximum(), Some(100.0));
        assert_eq!(param.default(), Some(&json!(25)));
        assert_eq!(param.description.as_deref(), Some("Page size"));
    }

    #[test]
    fn test_path_parameter_is_required() {
        let doc = json!({ "name": "id", "in": "path", "schema": { "type": "integer" } });
        let mut ctx = ResolverContext::new(&doc);
        let param = Parameter::from_raw(&mut ctx, &doc).unwrap();
        assert!(param.required);
        assert_eq!(param.location.to_string(), "path");
    }

    #[test]
    fn test_find_input_property() {
        let doc = json!({
            "param": { "name": "cursor", "in": "query" },
            "schema": {
                "type": "object",
                "properties": {
                    "next": { "type": "string" },
                    "cursor": { "type": "string" }
                }
            }
        });
        let mut ctx = ResolverContext::new(&doc);
        let param = Parameter::from_raw(&mut ctx, &doc["param"]).unwrap();
        let schema = ctx.resolve(&doc["schema"], 0).unwrap();

        let found = param.find_input_property(&schema, Some("next")).unwrap();
        assert_eq!(found.json_path(), "cursor");

        let other = Parameter {
            name: "offset".into(),
            ..param.clone()
        };
        assert_eq!(
            other.find_input_property(&schema, Some("next")).unwrap().json_path(),
            "next"
        );
        assert!(other.find_input_property(&schema, None).is_none());
    }
}
