//! # Response Detection
//!
//! Per endpoint: pick the main response, detect pagination against it, then locate the payload
//! with the list expectation pagination implies.

use crate::detector::pagination::{detect_pagination, Pagination};
use crate::heuristics::LIST_PAYLOAD;
use crate::oas::endpoints::{Endpoint, Response};
use crate::oas::properties::{PropertyIndex, PropertyPath};
use crate::oas::schema::SchemaNode;
use crate::paths::path_looks_like_list;
use crate::warnings::{DetectionWarning, Warnings};
use std::sync::Arc;

/// Output of the response pass for one endpoint.
#[derive(Debug, Clone, Default)]
pub struct ResponseDetection {
    /// Main 2xx or default response.
    pub data_response: Option<Response>,
    /// Paginator detected against the main response.
    pub pagination: Option<Pagination>,
    /// Where the records live in the main response body.
    pub payload: Option<PropertyPath>,
    /// Name of the primary key property of the payload records.
    ///
    /// Filled by [`detect_primary_keys`](crate::detector::primary_key::detect_primary_keys).
    pub primary_key: Option<String>,
}

impl ResponseDetection {
    /// Whether the payload is an array.
    pub fn payload_is_list(&self) -> Option<bool> {
        self.payload.as_ref().map(PropertyPath::is_list)
    }
}

/// Chooses the main response.
///
/// `200` and `default` win outright, otherwise the first `2xx` in document order.
pub fn find_main_response<'e>(
    endpoint: &'e Endpoint,
    warnings: &mut Warnings,
) -> Option<&'e Response> {
    let mut main = None;
    for response in &endpoint.responses {
        if response.status_code == "200" || response.status_code == "default" {
            main = Some(response);
            break;
        }
        if main.is_none() && response.status_code.starts_with('2') {
            main = Some(response);
        }
    }

    match main {
        None => warnings.add(
            Some(endpoint.id()),
            DetectionWarning::data_response_undetected(),
        ),
        Some(response) if response.schema.is_none() => warnings.add(
            Some(endpoint.id()),
            DetectionWarning::data_response_no_body(),
        ),
        Some(_) => {}
    }
    main
}

/// Locates the records inside a response body.
///
/// When a list is expected, a root array or the shallowest array property is used. Otherwise
/// single-property object envelopes are unwrapped down to the innermost schema.
pub fn detect_payload(
    schema: &Arc<SchemaNode>,
    index: &PropertyIndex,
    expect_list: bool,
) -> PropertyPath {
    if expect_list {
        if schema.is_list() {
            return PropertyPath::root(Arc::clone(schema));
        }
        if let Some(list) = index.find_by_rule(&LIST_PAYLOAD) {
            return list;
        }
    }

    let mut path = Vec::new();
    let mut current = Arc::clone(schema);
    while current.properties.len() == 1 {
        let Some(only) = current.properties.values().next().filter(|p| p.is_object()) else {
            break;
        };
        path.push(only.name.clone());
        let inner = Arc::clone(&only.schema);
        current = inner;
    }
    PropertyPath::new(path, current)
}

fn detect_response(endpoint: &Endpoint, warnings: &mut Warnings) -> ResponseDetection {
    let data_response = find_main_response(endpoint, warnings);
    let schema = data_response.and_then(|response| response.schema.as_ref());
    let index = schema.map(PropertyIndex::crawl);

    let pagination = detect_pagination(endpoint, schema, index.as_ref(), warnings);

    let payload = match (schema, &index) {
        (Some(schema), Some(index)) => {
            let expect_list = pagination.is_some() || path_looks_like_list(&endpoint.path);
            Some(detect_payload(schema, index, expect_list))
        }
        _ => None,
    };

    ResponseDetection {
        data_response: data_response.cloned(),
        pagination,
        payload,
        primary_key: None,
    }
}

/// Runs response, pagination and payload detection for every endpoint.
///
/// The result is aligned with `endpoints`.
pub fn detect_responses(endpoints: &[Endpoint], warnings: &mut Warnings) -> Vec<ResponseDetection> {
    endpoints
        .iter()
        .map(|endpoint| detect_response(endpoint, warnings))
        .collect()
}
