//! # Schema Nodes
//!
//! Resolves raw JSON schemas (inline or `$ref`erenced) into immutable [`SchemaNode`] trees.
//!
//! - `allOf` members are merged into the parent's property map, later declarations winning.
//! - `oneOf`/`anyOf` members are resolved with the parent's merged properties as a seed.
//! - Recursion is bounded by [`MAX_RECURSION_DEPTH`]; anything deeper is dropped.
//! - `"null"` never appears in `types`, it is folded into `nullable`.

use crate::oas::context::ResolverContext;
use crate::oas::ref_utils::{extract_component_name, follow_refs};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Nesting level past which child schemas are no longer resolved.
pub const MAX_RECURSION_DEPTH: usize = 6;

/// Primitive JSON schema kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// `boolean`
    Boolean,
    /// `object`
    Object,
    /// `array`
    Array,
    /// `number`
    Number,
    /// `string`
    String,
    /// `integer`
    Integer,
}

impl SchemaType {
    /// Parses a `type` keyword value. `"null"` and unknown names yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            _ => None,
        }
    }

    /// Keyword spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Number => "number",
            Self::String => "string",
            Self::Integer => "integer",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named member of an object schema.
#[derive(Debug, Clone)]
pub struct Property {
    /// Key in the parent object.
    pub name: String,
    /// Listed in the parent's `required` array.
    pub required: bool,
    /// Resolved schema of the value.
    pub schema: Arc<SchemaNode>,
}

impl Property {
    /// Whether the value is an array.
    pub fn is_list(&self) -> bool {
        self.schema.is_list()
    }

    /// Whether the value is an object.
    pub fn is_object(&self) -> bool {
        self.schema.is_object()
    }
}

/// A fully resolved schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaNode {
    /// Component name (from the `$ref`) or `title`.
    pub name: Option<String>,
    /// Description of the reference or the schema.
    pub description: Option<String>,
    /// Declared kinds, unioned with those of all composition members.
    pub types: BTreeSet<SchemaType>,
    /// Accepts `null`.
    pub nullable: bool,
    /// `format` keyword (`uuid`, `date-time`, ...).
    pub format: Option<String>,
    /// `default` keyword.
    pub default: Option<Value>,
    /// `maximum` keyword.
    pub maximum: Option<f64>,
    /// `enum` values.
    pub enum_values: Vec<Value>,
    /// `example` / `examples`.
    pub examples: Vec<Value>,
    /// Own and `allOf`-merged properties, in declaration order.
    pub properties: IndexMap<String, Property>,
    /// Item schema of an array.
    pub array_item: Option<Arc<SchemaNode>>,
    /// Resolved `allOf` members.
    pub all_of: Vec<Arc<SchemaNode>>,
    /// Resolved `oneOf` members.
    pub one_of: Vec<Arc<SchemaNode>>,
    /// Resolved `anyOf` members.
    pub any_of: Vec<Arc<SchemaNode>>,
    /// Digest of the raw schema content.
    pub hash_key: String,
}

impl SchemaNode {
    /// Whether `object` is among the types, or the schema is untyped but declares properties.
    pub fn is_object(&self) -> bool {
        self.types.contains(&SchemaType::Object)
            || (self.types.is_empty() && !self.properties.is_empty())
    }

    /// Whether `array` is among the types.
    pub fn is_list(&self) -> bool {
        self.types.contains(&SchemaType::Array)
    }

    /// No `type` declared anywhere in the tree of members.
    pub fn is_untyped(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether `kind` is among the types.
    pub fn has_type(&self, kind: SchemaType) -> bool {
        self.types.contains(&kind)
    }

    /// Own properties plus those of every `anyOf`/`oneOf` member, later members overriding.
    pub fn all_properties(&self) -> IndexMap<String, Property> {
        let mut props = self.properties.clone();
        for member in self.any_of.iter().chain(&self.one_of) {
            props.extend(member.all_properties());
        }
        props
    }

    /// Whether the schema is a union (`oneOf`/`anyOf`, or several types).
    pub fn is_union(&self) -> bool {
        !self.one_of.is_empty() || !self.any_of.is_empty() || self.types.len() > 1
    }
}

impl<'a> ResolverContext<'a> {
    /// Resolves a raw schema or `$ref` into a node.
    ///
    /// Returns `None` when the reference cannot be followed; the reference is recorded on
    /// the context.
    pub fn resolve(&mut self, raw: &'a Value, depth: usize) -> Option<Arc<SchemaNode>> {
        self.resolve_seeded(raw, depth, &IndexMap::new())
    }

    fn resolve_guarded(
        &mut self,
        raw: &'a Value,
        depth: usize,
        seed: &IndexMap<String, Property>,
    ) -> Option<Arc<SchemaNode>> {
        if depth >= MAX_RECURSION_DEPTH {
            return None;
        }
        self.resolve_seeded(raw, depth + 1, seed)
    }

    fn resolve_seeded(
        &mut self,
        raw: &'a Value,
        depth: usize,
        seed: &IndexMap<String, Property>,
    ) -> Option<Arc<SchemaNode>> {
        let (first_ref, schema) = match follow_refs(self.document, raw) {
            Ok(found) => found,
            Err(reference) => {
                self.record_unresolved(reference);
                return None;
            }
        };

        // Seeded nodes carry inherited properties, so they are specific to their parent.
        let cache_key = match first_ref {
            Some(reference) if seed.is_empty() => Some((reference.to_string(), depth)),
            _ => None,
        };
        if let Some(node) = cache_key.as_ref().and_then(|key| self.cache.get(key)) {
            return Some(Arc::clone(node));
        }

        let node = Arc::new(self.build_node(raw, first_ref, schema, depth, seed));
        if let Some(key) = cache_key {
            self.cache.insert(key, Arc::clone(&node));
        }
        Some(node)
    }

    fn resolve_members(
        &mut self,
        schema: &'a Value,
        keyword: &str,
        depth: usize,
        seed: &IndexMap<String, Property>,
    ) -> Vec<Arc<SchemaNode>> {
        let Some(members) = schema.get(keyword).and_then(Value::as_array) else {
            return Vec::new();
        };
        members
            .iter()
            .filter_map(|member| self.resolve_guarded(member, depth, seed))
            .collect()
    }

    fn build_node(
        &mut self,
        raw: &'a Value,
        first_ref: Option<&str>,
        schema: &'a Value,
        depth: usize,
        seed: &IndexMap<String, Property>,
    ) -> SchemaNode {
        let no_seed = IndexMap::new();

        let all_of = self.resolve_members(schema, "allOf", depth, &no_seed);

        let name = first_ref
            .and_then(extract_component_name)
            .or_else(|| non_empty_str(schema, "title"))
            .or_else(|| all_of.iter().find_map(|member| member.name.clone()));

        let mut properties = seed.clone();
        for member in &all_of {
            for (prop_name, prop) in &member.properties {
                properties.insert(prop_name.clone(), prop.clone());
            }
        }

        let required: BTreeSet<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        if let Some(own) = schema.get("properties").and_then(Value::as_object) {
            for (prop_name, prop_raw) in own {
                let Some(prop_schema) = self.resolve_guarded(prop_raw, depth, &no_seed) else {
                    continue;
                };
                properties.insert(
                    prop_name.clone(),
                    Property {
                        name: prop_name.clone(),
                        required: false,
                        schema: prop_schema,
                    },
                );
            }
        }
        for (prop_name, prop) in properties.iter_mut() {
            if required.contains(prop_name.as_str()) {
                prop.required = true;
            }
        }

        let one_of = self.resolve_members(schema, "oneOf", depth, &properties);
        let any_of = self.resolve_members(schema, "anyOf", depth, &properties);

        let array_item = schema
            .get("items")
            .and_then(|items| self.resolve_guarded(items, depth, &no_seed));

        let mut types = BTreeSet::new();
        let mut nullable = flag(schema, "nullable") || flag(schema, "x-nullable");
        let mut declare = |raw_type: &str| {
            if raw_type == "null" {
                nullable = true;
            } else if let Some(kind) = SchemaType::parse(raw_type) {
                types.insert(kind);
            }
        };
        match schema.get("type") {
            Some(Value::String(single)) => declare(single),
            Some(Value::Array(many)) => many
                .iter()
                .filter_map(Value::as_str)
                .for_each(&mut declare),
            _ => {}
        }
        for member in all_of.iter().chain(&one_of).chain(&any_of) {
            types.extend(member.types.iter().copied());
            nullable |= member.nullable;
        }

        let description = first_ref
            .and_then(|_| non_empty_str(raw, "description"))
            .or_else(|| non_empty_str(schema, "description"));

        let examples = match schema.get("example") {
            Some(example) if !example.is_null() => vec![example.clone()],
            _ => schema
                .get("examples")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        };

        SchemaNode {
            name,
            description,
            types,
            nullable,
            format: non_empty_str(schema, "format"),
            default: schema.get("default").cloned(),
            maximum: schema.get("maximum").and_then(Value::as_f64),
            enum_values: schema
                .get("enum")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            examples,
            properties,
            array_item,
            all_of,
            one_of,
            any_of,
            hash_key: hash_key(schema),
        }
    }
}

fn non_empty_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn flag(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Content digest of a raw schema: the first 16 bytes of the SHA-256 of its key-sorted JSON.
pub fn hash_key(schema: &Value) -> String {
    let canonical = serde_json::to_vec(&canonicalize(schema)).unwrap_or_default();
    let digest = Sha256::digest(&canonical);
    hex::encode(&digest[..16])
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, inner)| (key.clone(), canonicalize(inner)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
