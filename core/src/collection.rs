//! # Endpoint Collection
//!
//! Fully detected endpoints plus the render selection. The selection is driven from outside
//! through an [`EndpointSelector`].

use crate::config::Config;
use crate::detector::naming::Naming;
use crate::detector::pagination::{Pagination, Paginator};
use crate::detector::relations::{is_list, Relations, TransformerSetting};
use crate::detector::response::ResponseDetection;
use crate::oas::endpoints::Endpoint;
use crate::oas::parameters::{ParamLocation, Parameter};
use crate::oas::properties::PropertyPath;
use crate::paths::path_var_names;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// An endpoint with the output of every detection pass.
#[derive(Debug, Clone)]
pub struct DetectedEndpoint {
    /// Parsed operation.
    pub endpoint: Endpoint,
    /// Main response, pagination, payload and primary key.
    pub response: ResponseDetection,
    /// Parent and children.
    pub relations: Relations,
    /// Mapping from the parent's records onto the path.
    pub transformer: Option<TransformerSetting>,
    /// Resource and table name.
    pub naming: Naming,
    /// Paginator shared by the whole collection.
    pub global_pagination: Option<Pagination>,
}

impl DetectedEndpoint {
    /// Unique id.
    pub fn id(&self) -> &str {
        self.endpoint.id()
    }

    /// Path template.
    pub fn path(&self) -> &str {
        &self.endpoint.path
    }

    /// Where the records live in the response body.
    pub fn payload(&self) -> Option<&PropertyPath> {
        self.response.payload.as_ref()
    }

    /// Primary key of the payload records.
    pub fn primary_key(&self) -> Option<&str> {
        self.response.primary_key.as_deref()
    }

    /// Own paginator.
    pub fn pagination(&self) -> Option<&Pagination> {
        self.response.pagination.as_ref()
    }

    /// Id of the parent endpoint.
    pub fn parent_id(&self) -> Option<&str> {
        self.relations.parent.as_deref()
    }

    /// Whether the endpoint returns a list.
    pub fn is_list(&self) -> bool {
        is_list(&self.endpoint, &self.response)
    }

    /// JSON path of the payload, `"$"` when unknown.
    pub fn data_selector(&self) -> String {
        self.payload()
            .map(PropertyPath::json_path)
            .unwrap_or_else(|| "$".to_string())
    }

    /// Paginator to render for the endpoint, `None` when it equals the global one.
    pub fn paginator_to_render(&self) -> Option<&Paginator> {
        match (self.pagination(), self.global_pagination.as_ref()) {
            (Some(own), Some(global)) if own == global => None,
            (own, _) => own.map(|pagination| &pagination.paginator),
        }
    }

    /// Whether the renderer should fall back to automatic pagination detection.
    pub fn render_auto_paginator(&self) -> bool {
        self.global_pagination.is_none() && self.pagination().is_none()
    }

    /// Path variables not filled by the transformer.
    pub fn unresolvable_path_param_names(&self) -> Vec<&str> {
        let resolved = self
            .transformer
            .as_ref()
            .map(|transformer| transformer.path_parameter_name.as_str());
        path_var_names(self.path())
            .into_iter()
            .filter(|name| Some(*name) != resolved)
            .collect()
    }

    /// Query parameters the paginator does not drive.
    pub fn unresolvable_query_params(&self) -> Vec<&Parameter> {
        self.endpoint
            .parameters
            .values()
            .filter(|param| param.location == ParamLocation::Query)
            .filter(|param| !self.pagination().is_some_and(|p| p.uses_param(&param.name)))
            .collect()
    }

    /// Value rendered for a parameter the user has to fill in.
    ///
    /// The declared default wins. Otherwise required and path parameters get
    /// `required_parameter_default_value`, the rest `unrequired_parameter_default_value`.
    pub fn default_for_param(
        &self,
        location: ParamLocation,
        name: &str,
        config: &Config,
    ) -> Value {
        let param = self.endpoint.parameter(name, location);
        if let Some(default) = param.and_then(Parameter::default) {
            if !default.is_null() {
                return default.clone();
            }
        }
        let required = param.map_or(true, |param| param.required);
        if required || location == ParamLocation::Path {
            Value::String(config.required_parameter_default_value.clone())
        } else {
            Value::String(config.unrequired_parameter_default_value.clone())
        }
    }
}

/// Decides which endpoints end up in the generated source.
pub trait EndpointSelector {
    /// Ids to render. An empty set renders everything.
    fn select(&self, collection: &EndpointCollection) -> BTreeSet<String>;
}

impl<F> EndpointSelector for F
where
    F: Fn(&EndpointCollection) -> BTreeSet<String>,
{
    fn select(&self, collection: &EndpointCollection) -> BTreeSet<String> {
        self(collection)
    }
}

/// Selects a fixed list of ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedIds(pub Vec<String>);

impl EndpointSelector for SelectedIds {
    fn select(&self, _collection: &EndpointCollection) -> BTreeSet<String> {
        self.0.iter().cloned().collect()
    }
}

/// Detected endpoints sorted by table name, with the render selection.
#[derive(Debug, Clone, Default)]
pub struct EndpointCollection {
    endpoints: Vec<DetectedEndpoint>,
    by_id: HashMap<String, usize>,
    ids_to_render: BTreeSet<String>,
    ids_to_deselect: BTreeSet<String>,
}

impl EndpointCollection {
    /// Wraps endpoints, all selected for rendering.
    pub fn new(endpoints: Vec<DetectedEndpoint>) -> Self {
        let by_id = endpoints
            .iter()
            .enumerate()
            .map(|(idx, endpoint)| (endpoint.id().to_string(), idx))
            .collect();
        let ids_to_render = endpoints.iter().map(|e| e.id().to_string()).collect();
        Self {
            endpoints,
            by_id,
            ids_to_render,
            ids_to_deselect: BTreeSet::new(),
        }
    }

    /// All endpoints.
    pub fn endpoints(&self) -> &[DetectedEndpoint] {
        &self.endpoints
    }

    /// Number of endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether there are no endpoints.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Endpoint by id.
    pub fn get(&self, id: &str) -> Option<&DetectedEndpoint> {
        self.by_id.get(id).map(|idx| &self.endpoints[*idx])
    }

    /// Parent of an endpoint.
    pub fn parent_of(&self, endpoint: &DetectedEndpoint) -> Option<&DetectedEndpoint> {
        endpoint.parent_id().and_then(|id| self.get(id))
    }

    /// Children of an endpoint.
    pub fn children_of(&self, endpoint: &DetectedEndpoint) -> Vec<&DetectedEndpoint> {
        endpoint
            .relations
            .children
            .iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Ids that will be rendered.
    pub fn ids_to_render(&self) -> &BTreeSet<String> {
        &self.ids_to_render
    }

    /// Ids rendered only to feed a selected child, inactive by default.
    pub fn ids_to_deselect(&self) -> &BTreeSet<String> {
        &self.ids_to_deselect
    }

    /// Whether an endpoint is rendered but inactive.
    pub fn is_deselected(&self, id: &str) -> bool {
        self.ids_to_deselect.contains(id)
    }

    /// Rendered endpoints in collection order.
    pub fn endpoints_to_render(&self) -> Vec<&DetectedEndpoint> {
        self.endpoints
            .iter()
            .filter(|e| self.ids_to_render.contains(e.id()))
            .collect()
    }

    /// Selects `ids` plus every ancestor needed to resolve their path parameters.
    ///
    /// Ancestors are rendered but deselected. Unknown ids are skipped.
    pub fn set_ids_to_render(&mut self, ids: &BTreeSet<String>) {
        let mut selected = BTreeSet::new();
        let mut render = BTreeSet::new();

        for id in ids {
            let Some(mut current) = self.get(id) else {
                warn!("Unknown endpoint id {id}, skipping");
                continue;
            };
            render.insert(current.id().to_string());
            selected.insert(current.id().to_string());
            while current.transformer.is_some() {
                let Some(parent) = self.parent_of(current) else {
                    break;
                };
                render.insert(parent.id().to_string());
                current = parent;
            }
        }

        self.ids_to_deselect = render.difference(&selected).cloned().collect();
        self.ids_to_render = render;
    }

    /// Applies an external selection. An empty selection renders everything.
    pub fn apply_selector(&mut self, selector: &dyn EndpointSelector) {
        let ids = selector.select(self);
        if ids.is_empty() {
            warn!("No endpoints selected, rendering all of them");
            let all = self.endpoints.iter().map(|e| e.id().to_string()).collect();
            self.set_ids_to_render(&all);
            return;
        }
        self.set_ids_to_render(&ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{DefaultDetector, Detector};
    use crate::oas::document::parse;

    const POKEMON: &str = r#"
openapi: 3.0.0
info: { title: Poke, version: "2" }
paths:
  /api/v2/pokemon/:
    get:
      operationId: pokemon_list
      parameters:
        - { name: offset, in: query, schema: { type: integer } }
        - { name: limit, in: query, schema: { type: integer } }
        - { name: lang, in: query, required: true, schema: { type: string } }
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: object
                properties:
                  count: { type: integer }
                  results:
                    type: array
                    items:
                      type: object
                      properties:
                        name: { type: string }
                        url: { type: string }
  /api/v2/pokemon/{name}/:
    get:
      operationId: pokemon_read
      parameters:
        - { name: name, in: path, schema: { type: string } }
        - { name: form, in: query, schema: { type: string, default: plain } }
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: object
                properties:
                  name: { type: string }
  /api/v2/type/{id}/:
    get:
      operationId: type_read
      responses:
        "200": { description: ok }
"#;

    fn collection() -> EndpointCollection {
        let config = Config::default();
        let api = parse(POKEMON.as_bytes(), &config).unwrap();
        DefaultDetector.detect(api, &config).endpoints
    }

    #[test]
    fn test_selection_includes_ancestors() {
        let mut collection = collection();
        collection.set_ids_to_render(&["pokemon_read".to_string()].into());
        assert_eq!(
            collection.ids_to_render(),
            &BTreeSet::from(["pokemon_read".to_string(), "pokemon_list".to_string()])
        );
        assert_eq!(
            collection.ids_to_deselect(),
            &BTreeSet::from(["pokemon_list".to_string()])
        );

        let ids: Vec<&str> = collection.endpoints_to_render().iter().map(|e| e.id()).collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_selection_is_idempotent() {
        let mut collection = collection();
        let ids: BTreeSet<String> = ["pokemon_read".to_string(), "pokemon_list".to_string()].into();
        collection.set_ids_to_render(&ids);
        let first = (collection.ids_to_render().clone(), collection.ids_to_deselect().clone());
        collection.set_ids_to_render(&ids);
        assert_eq!(
            (collection.ids_to_render().clone(), collection.ids_to_deselect().clone()),
            first
        );
        assert!(collection.ids_to_deselect().is_empty());
    }

    #[test]
    fn test_selectors() {
        let mut collection = collection();
        collection.apply_selector(&SelectedIds(vec!["type_read".into(), "nope".into()]));
        assert_eq!(collection.ids_to_render().len(), 1);

        collection.apply_selector(&|_: &EndpointCollection| BTreeSet::<String>::new());
        assert_eq!(collection.ids_to_render().len(), 3);
        assert!(collection.ids_to_deselect().is_empty());
    }

    #[test]
    fn test_params_and_defaults() {
        let collection = collection();
        let config = Config::default();

        let list = collection.get("pokemon_list").unwrap();
        let query: Vec<&str> = list
            .unresolvable_query_params()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(query, vec!["lang"]);
        assert_eq!(
            list.default_for_param(ParamLocation::Query, "lang", &config),
            Value::String("FILL_ME_IN".into())
        );

        let read = collection.get("pokemon_read").unwrap();
        assert!(read.unresolvable_path_param_names().is_empty());
        assert_eq!(collection.parent_of(read).unwrap().id(), "pokemon_list");
        assert_eq!(
            read.default_for_param(ParamLocation::Query, "form", &config),
            Value::String("plain".into())
        );

        let type_read = collection.get("type_read").unwrap();
        assert_eq!(type_read.unresolvable_path_param_names(), vec!["id"]);
        assert_eq!(type_read.data_selector(), "$");
        assert!(!type_read.is_list());
    }
}
