//! # Parent/Child Relations
//!
//! Endpoints nest when one path extends another: `/users/{id}/posts` is a child of
//! `/users`. A child whose path variable can be filled from its parent's records gets a
//! [`TransformerSetting`].

use crate::detector::response::ResponseDetection;
use crate::inflect::singularize;
use crate::oas::endpoints::Endpoint;
use crate::oas::properties::PropertyPath;
use crate::paths::{is_path_var, path_looks_like_list, path_parts, path_var_names};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Output of the relation pass for one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations {
    /// Id of the nearest list-shaped ancestor endpoint.
    pub parent: Option<String>,
    /// Ids of the endpoints that have this one as parent.
    pub children: Vec<String>,
}

/// Maps a parent's record property onto a child's path variable.
#[derive(Debug, Clone)]
pub struct TransformerSetting {
    /// Path variable of the child.
    pub path_parameter_name: String,
    /// Property of the parent's payload records.
    pub parent_property: PropertyPath,
}

/// Serialized form of a [`TransformerSetting`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathParamMapping {
    /// Path variable of the child.
    pub param: String,
    /// JSON path into the parent record.
    pub field: String,
}

impl TransformerSetting {
    /// The child parameter and the parent field feeding it.
    pub fn path_params_mapping(&self) -> PathParamMapping {
        PathParamMapping {
            param: self.path_parameter_name.clone(),
            field: self.parent_property.json_path(),
        }
    }
}

fn singularized_path_parts(path: &str) -> Vec<String> {
    path_parts(path)
        .into_iter()
        .map(|part| {
            if is_path_var(part) {
                part.to_string()
            } else {
                singularize(part)
            }
        })
        .collect()
}

fn raw_path_parts(path: &str) -> Vec<String> {
    path_parts(path).into_iter().map(str::to_string).collect()
}

#[derive(Debug, Default)]
struct PathTrie {
    children: HashMap<String, PathTrie>,
    endpoint: Option<usize>,
}

impl PathTrie {
    fn insert(&mut self, parts: &[String], endpoint: usize) {
        let mut node = self;
        for part in parts {
            node = node.children.entry(part.clone()).or_default();
        }
        node.endpoint.get_or_insert(endpoint);
    }

    fn endpoint_at(&self, parts: &[String]) -> Option<usize> {
        let mut node = self;
        for part in parts {
            node = node.children.get(part)?;
        }
        node.endpoint
    }
}

/// Whether an endpoint returns a list: from its payload when known, from its path otherwise.
pub fn is_list(endpoint: &Endpoint, response: &ResponseDetection) -> bool {
    response
        .payload_is_list()
        .unwrap_or_else(|| path_looks_like_list(&endpoint.path))
}

/// Links every endpoint to its nearest list-shaped ancestor.
///
/// Static segments are singularized first so `/pokemons` and `/pokemon/{id}` line up, unless
/// that would make two distinct paths collide. The result is aligned with `endpoints`.
pub fn detect_relations(endpoints: &[Endpoint], responses: &[ResponseDetection]) -> Vec<Relations> {
    let distinct: HashSet<&str> = endpoints.iter().map(|e| e.path.as_str()).collect();
    let singularized: HashSet<String> = distinct
        .iter()
        .map(|path| singularized_path_parts(path).join("/"))
        .collect();
    let split: fn(&str) -> Vec<String> = if singularized.len() == distinct.len() {
        singularized_path_parts
    } else {
        raw_path_parts
    };

    let mut trie = PathTrie::default();
    for (idx, endpoint) in endpoints.iter().enumerate() {
        trie.insert(&split(&endpoint.path), idx);
    }

    let mut relations = vec![Relations::default(); endpoints.len()];
    for (idx, endpoint) in endpoints.iter().enumerate() {
        let mut parts = split(&endpoint.path);
        while parts.pop().is_some() {
            let Some(candidate) = trie.endpoint_at(&parts) else {
                continue;
            };
            if is_list(&endpoints[candidate], &responses[candidate]) {
                relations[idx].parent = Some(endpoints[candidate].id().to_string());
                relations[candidate]
                    .children
                    .push(endpoint.id().to_string());
                break;
            }
        }
    }
    relations
}

fn detect_transformer(
    endpoint: &Endpoint,
    parent: &ResponseDetection,
) -> Option<TransformerSetting> {
    let payload = parent.payload.as_ref()?;
    let param_name = *endpoint.path_var_names().last()?;
    let props = payload.schema().all_properties();

    let mut input = props
        .values()
        .filter(|prop| prop.name.eq_ignore_ascii_case(param_name))
        .last();
    if input.is_none() {
        input = parent.primary_key.as_ref().and_then(|key| props.get(key));
    }
    let input = input?;

    Some(TransformerSetting {
        path_parameter_name: param_name.to_string(),
        parent_property: PropertyPath::new(vec![input.name.clone()], Arc::clone(&input.schema)),
    })
}

/// Detects the transformer of every endpoint with a parent.
///
/// The last path variable is matched by name against the parent's record properties, falling
/// back to the parent's primary key. The result is aligned with `endpoints`.
pub fn detect_transformers(
    endpoints: &[Endpoint],
    responses: &[ResponseDetection],
    relations: &[Relations],
) -> Vec<Option<TransformerSetting>> {
    let by_id: HashMap<&str, usize> = endpoints
        .iter()
        .enumerate()
        .map(|(idx, endpoint)| (endpoint.id(), idx))
        .collect();

    endpoints
        .iter()
        .zip(relations)
        .map(|(endpoint, relation)| {
            let parent = by_id.get(relation.parent.as_deref()?)?;
            detect_transformer(endpoint, &responses[*parent])
        })
        .collect()
}
