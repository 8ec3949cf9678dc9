//! # Property Paths
//!
//! Flattens a resolved schema into a `path -> schema` index. Object members are recorded at
//! `parent + name`, array items at `parent + "[*]"`. Every heuristic that looks for a property
//! by name goes through [`PropertyIndex::find_property`].

use crate::heuristics::HeuristicRule;
use crate::oas::schema::{SchemaNode, SchemaType};
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

/// Path segment standing for "any element of the array".
pub const ARRAY_ITEM_MARKER: &str = "[*]";

/// A location inside a response body together with the schema found there.
#[derive(Debug, Clone)]
pub struct PropertyPath {
    /// Object keys and [`ARRAY_ITEM_MARKER`]s from the root.
    pub path: Vec<String>,
    /// Schema at the location.
    pub prop: Arc<SchemaNode>,
}

impl PropertyPath {
    /// Creates a path.
    pub fn new(path: Vec<String>, prop: Arc<SchemaNode>) -> Self {
        Self { path, prop }
    }

    /// The root of a schema.
    pub fn root(prop: Arc<SchemaNode>) -> Self {
        Self::new(Vec::new(), prop)
    }

    /// Dotted path, `"$"` for the root.
    pub fn json_path(&self) -> String {
        if self.path.is_empty() {
            "$".to_string()
        } else {
            self.path.join(".")
        }
    }

    /// Whether the value at the path is an array.
    pub fn is_list(&self) -> bool {
        self.prop.is_list()
    }

    /// The record schema: the item schema for arrays, the schema itself otherwise.
    pub fn schema(&self) -> &Arc<SchemaNode> {
        match (&self.prop.array_item, self.is_list()) {
            (Some(item), true) => item,
            _ => &self.prop,
        }
    }

    /// Name of the record schema.
    pub fn name(&self) -> Option<&str> {
        self.schema().name.as_deref()
    }
}

/// Flattened view over every reachable property of a schema.
#[derive(Debug, Clone, Default)]
pub struct PropertyIndex {
    all: IndexMap<Vec<String>, Arc<SchemaNode>>,
    objects: IndexMap<Vec<String>, Arc<SchemaNode>>,
    lists: IndexMap<Vec<String>, Arc<SchemaNode>>,
    required: HashSet<Vec<String>>,
}

impl PropertyIndex {
    /// Walks `root` once and records every reachable path.
    pub fn crawl(root: &Arc<SchemaNode>) -> Self {
        let mut index = Self::default();
        index.discover(root, Vec::new());
        index
    }

    fn discover(&mut self, schema: &Arc<SchemaNode>, path: Vec<String>) {
        self.all.insert(path.clone(), Arc::clone(schema));
        if schema.is_object() {
            self.objects.insert(path.clone(), Arc::clone(schema));
            for (name, prop) in schema.all_properties() {
                let mut prop_path = path.clone();
                prop_path.push(name);
                self.all.insert(prop_path.clone(), Arc::clone(&prop.schema));
                if prop.required {
                    self.required.insert(prop_path.clone());
                }
                if prop.is_list() || prop.is_object() {
                    self.discover(&prop.schema, prop_path);
                }
            }
        } else if let (true, Some(item)) = (schema.is_list(), &schema.array_item) {
            self.lists.insert(path.clone(), Arc::clone(item));
            let mut item_path = path;
            item_path.push(ARRAY_ITEM_MARKER.to_string());
            self.discover(item, item_path);
        }
    }

    /// Schema at `path`.
    pub fn get(&self, path: &[String]) -> Option<&Arc<SchemaNode>> {
        self.all.get(path)
    }

    /// Whether `path` was recorded.
    pub fn contains(&self, path: &[String]) -> bool {
        self.all.contains_key(path)
    }

    /// Number of recorded paths, the root included.
    pub fn len(&self) -> usize {
        self.all.len()
    }

    /// Never true after a crawl, the root is always recorded.
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// All `(path, schema)` pairs in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&Vec<String>, &Arc<SchemaNode>)> {
        self.all.iter()
    }

    /// Paths holding objects.
    pub fn object_properties(&self) -> &IndexMap<Vec<String>, Arc<SchemaNode>> {
        &self.objects
    }

    /// Paths holding arrays, mapped to their item schema.
    pub fn list_properties(&self) -> &IndexMap<Vec<String>, Arc<SchemaNode>> {
        &self.lists
    }

    /// Paths listed as required by their parent.
    pub fn required_properties(&self) -> &HashSet<Vec<String>> {
        &self.required
    }

    /// A path is optional when it or any ancestor is not required, or is nullable.
    pub fn is_optional(&self, path: &[String]) -> bool {
        (1..=path.len()).rev().any(|len| {
            let ancestor = &path[..len];
            match self.all.get(ancestor) {
                Some(schema) => !self.required.contains(ancestor) || schema.nullable,
                None => false,
            }
        })
    }

    /// Finds the shallowest property whose last segment matches `pattern`.
    ///
    /// With `require_type`, typed matches always beat untyped ones, which are only considered
    /// when `allow_unknown_types` is set. The root path never matches.
    pub fn find_property(
        &self,
        pattern: &Regex,
        require_type: Option<SchemaType>,
        allow_unknown_types: bool,
    ) -> Option<PropertyPath> {
        let mut typed: Option<(&Vec<String>, &Arc<SchemaNode>)> = None;
        let mut untyped: Option<(&Vec<String>, &Arc<SchemaNode>)> = None;

        let shallower = |slot: &Option<(&Vec<String>, &Arc<SchemaNode>)>, len: usize| {
            slot.map_or(true, |(found, _)| len < found.len())
        };

        for (path, schema) in &self.all {
            let Some(last) = path.last() else {
                continue;
            };
            if !pattern.is_match(last) {
                continue;
            }
            match require_type {
                Some(kind) if schema.has_type(kind) => {
                    if shallower(&typed, path.len()) {
                        typed = Some((path, schema));
                    }
                }
                Some(_) if schema.is_untyped() && allow_unknown_types => {
                    if shallower(&untyped, path.len()) {
                        untyped = Some((path, schema));
                    }
                }
                Some(_) => {}
                None => {
                    if shallower(&typed, path.len()) {
                        typed = Some((path, schema));
                    }
                }
            }
        }

        typed
            .or(untyped)
            .map(|(path, schema)| PropertyPath::new(path.clone(), Arc::clone(schema)))
    }

    /// [`find_property`](Self::find_property) driven by a catalogue rule.
    pub fn find_by_rule(&self, rule: &HeuristicRule) -> Option<PropertyPath> {
        self.find_property(&rule.pattern, rule.require_type, rule.allow_unknown_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::{LIST_PAYLOAD, NEXT_PROPERTY, TOTAL_PROPERTY};
    use crate::oas::context::ResolverContext;
    use serde_json::{json, Value};

    fn crawl(schema: Value) -> PropertyIndex {
        let doc = json!({});
        let mut ctx = ResolverContext::new(&doc);
        let node = ctx.resolve(&schema, 0).unwrap();
        PropertyIndex::crawl(&node)
    }

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_crawl_records_objects_and_array_items() {
        let index = crawl(json!({
            "type": "object",
            "properties": {
                "meta": { "type": "object", "properties": { "total": { "type": "integer" } } },
                "results": {
                    "type": "array",
                    "items": { "type": "object", "properties": { "name": { "type": "string" } } }
                },
                "tags": { "type": "array", "items": { "type": "string" } }
            }
        }));

        assert!(index.contains(&path(&["meta", "total"])));
        assert!(index.contains(&path(&["results", "[*]", "name"])));
        assert!(index.contains(&path(&["tags", "[*]"])));
        assert!(!index.contains(&path(&["tags", "[*]", "anything"])));
        assert!(index.list_properties().contains_key(&path(&["results"])));
        assert!(index.object_properties().contains_key(&Vec::<String>::new()));
    }

    #[test]
    fn test_is_optional_inherits_from_ancestors() {
        let index = crawl(json!({
            "type": "object",
            "required": ["p", "q"],
            "properties": {
                "p": { "type": "object", "nullable": true },
                "q": {
                    "type": "object",
                    "required": ["inner"],
                    "properties": { "inner": { "type": "string" } }
                },
                "loose": {
                    "type": "object",
                    "required": ["inner"],
                    "properties": { "inner": { "type": "string" } }
                }
            }
        }));

        assert!(index.is_optional(&path(&["p"])));
        assert!(!index.is_optional(&path(&["q"])));
        assert!(!index.is_optional(&path(&["q", "inner"])));
        assert!(index.is_optional(&path(&["loose", "inner"])));
    }

    #[test]
    fn test_find_property_prefers_shallow_typed() {
        let index = crawl(json!({
            "type": "object",
            "properties": {
                "paging": {
                    "type": "object",
                    "properties": { "total": { "type": "integer" }, "next": {} }
                },
                "count": {},
                "links": { "type": "object", "properties": { "next": { "type": "string" } } }
            }
        }));

        let total = index.find_by_rule(&TOTAL_PROPERTY).unwrap();
        assert_eq!(total.json_path(), "paging.total");

        let next = index.find_by_rule(&NEXT_PROPERTY).unwrap();
        assert_eq!(next.json_path(), "links.next");
    }

    #[test]
    fn test_find_property_falls_back_to_untyped() {
        let index = crawl(json!({
            "type": "object",
            "properties": { "data": { "type": "object", "properties": { "count": {} } } }
        }));
        let total = index.find_by_rule(&TOTAL_PROPERTY).unwrap();
        assert_eq!(total.path, path(&["data", "count"]));

        let strict = index.find_property(&TOTAL_PROPERTY.pattern, Some(SchemaType::Integer), false);
        assert!(strict.is_none());
    }

    #[test]
    fn test_list_payload_property_and_record_schema() {
        let index = crawl(json!({
            "type": "object",
            "properties": {
                "data": {
                    "type": "object",
                    "properties": {
                        "items": {
                            "type": "array",
                            "items": { "title": "Pet", "type": "object", "properties": {} }
                        }
                    }
                }
            }
        }));
        let payload = index.find_by_rule(&LIST_PAYLOAD).unwrap();
        assert_eq!(payload.json_path(), "data.items");
        assert!(payload.is_list());
        assert_eq!(payload.name(), Some("Pet"));
    }

    #[test]
    fn test_root_json_path() {
        let node = Arc::new(SchemaNode::default());
        assert_eq!(PropertyPath::root(node).json_path(), "$");
    }
}
