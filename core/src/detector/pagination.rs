//! # Pagination Detection
//!
//! Strategies are tried in a fixed order and the first one that applies wins:
//!
//! 1. **cursor**: a cursor parameter bound to a response property.
//! 2. **offset**: an offset parameter plus a limit parameter.
//! 3. **page_number**: a page parameter.
//! 4. **json_response**: a `next` link in the response body.
//!
//! Parameters that look like pagination but fit no strategy produce a
//! [`PossiblePaginator`](crate::warnings::WarningKind::PossiblePaginator) warning.

use crate::heuristics::{
    HeuristicRule, CURSOR_PARAM, CURSOR_PROPERTY, DEFAULT_LIMIT, DEFAULT_MAXIMUM_PAGINATOR_OFFSET,
    LIMIT_PARAM, NEXT_PROPERTY, OFFSET_PARAM, PAGE_PARAM, TOTAL_PAGE_PROPERTY, TOTAL_PROPERTY,
};
use crate::oas::endpoints::Endpoint;
use crate::oas::parameters::Parameter;
use crate::oas::properties::{PropertyIndex, PropertyPath};
use crate::oas::schema::SchemaNode;
use crate::warnings::{DetectionWarning, Warnings};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Normalized paginator configuration.
///
/// Two paginators are equal when their configuration is, which is what global pagination
/// aggregation counts on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Paginator {
    /// Cursor taken from the response and sent back as a parameter.
    Cursor {
        /// Query parameter carrying the cursor.
        cursor_param: String,
        /// Response property holding the next cursor.
        cursor_path: String,
    },
    /// Offset and page size.
    Offset {
        /// Page size.
        limit: i64,
        /// Query parameter carrying the offset.
        offset_param: String,
        /// Query parameter carrying the page size.
        limit_param: String,
        /// Response property holding the total count.
        #[serde(skip_serializing_if = "Option::is_none")]
        total_path: Option<String>,
        /// Cutoff used when no total count exists.
        #[serde(skip_serializing_if = "Option::is_none")]
        maximum_offset: Option<i64>,
    },
    /// Page number.
    PageNumber {
        /// Query parameter carrying the page.
        page_param: String,
        /// Response property holding the page count.
        #[serde(skip_serializing_if = "Option::is_none")]
        total_path: Option<String>,
        /// Cutoff used when no page count exists.
        #[serde(skip_serializing_if = "Option::is_none")]
        maximum_page: Option<i64>,
    },
    /// A link to the next page inside the body.
    JsonResponse {
        /// Response property holding the link.
        next_url_path: String,
    },
}

/// Paginator of an endpoint with the parameters it drives.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    /// Configuration.
    pub paginator: Paginator,
    /// Parameters filled in by the paginator, excluded from the rendered params.
    #[serde(skip)]
    pub param_names: Vec<String>,
}

impl PartialEq for Pagination {
    fn eq(&self, other: &Self) -> bool {
        self.paginator == other.paginator
    }
}

impl Pagination {
    fn new(paginator: Paginator, param_names: Vec<String>) -> Self {
        Self {
            paginator,
            param_names,
        }
    }

    /// Whether `name` is driven by the paginator.
    pub fn uses_param(&self, name: &str) -> bool {
        self.param_names.iter().any(|param| param == name)
    }
}

fn params_matching<'e>(endpoint: &'e Endpoint, rule: &HeuristicRule) -> Vec<&'e Parameter> {
    endpoint
        .parameters
        .values()
        .filter(|param| rule.matches(&param.name))
        .collect()
}

fn value_to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn initial_limit(param: &Parameter) -> i64 {
    match param.maximum() {
        Some(maximum) if maximum != 0.0 => maximum as i64,
        _ => param.default().and_then(value_to_int).unwrap_or(0),
    }
}

/// Detects the paginator of one endpoint.
///
/// `response` is the schema of the main response before envelope unwrapping, `index` its
/// crawled properties. Both are absent when the endpoint declares no body.
pub fn detect_pagination(
    endpoint: &Endpoint,
    response: Option<&Arc<SchemaNode>>,
    index: Option<&PropertyIndex>,
    warnings: &mut Warnings,
) -> Option<Pagination> {
    let cursor_params = params_matching(endpoint, &CURSOR_PARAM);
    let offset_params = params_matching(endpoint, &OFFSET_PARAM);
    let limit_params = params_matching(endpoint, &LIMIT_PARAM);
    let page_params = params_matching(endpoint, &PAGE_PARAM);

    if let (Some(schema), Some(index)) = (response, index) {
        let mut cursor_props = Vec::new();
        for param in &cursor_params {
            if let Some(prop) = param.find_input_property(schema, None) {
                cursor_props.push((*param, prop));
            }
        }
        if cursor_props.is_empty() && cursor_params.len() == 1 {
            if let Some(prop) = index.find_by_rule(&CURSOR_PROPERTY) {
                cursor_props.push((cursor_params[0], prop));
            }
        }
        cursor_props.sort_by_key(|(_, prop)| prop.path.len());
        if let Some((param, prop)) = cursor_props.into_iter().next() {
            debug!("Cursor pagination on {} via {}", endpoint.id(), param.name);
            return Some(Pagination::new(
                Paginator::Cursor {
                    cursor_param: param.name.clone(),
                    cursor_path: prop.json_path(),
                },
                vec![param.name.clone()],
            ));
        }
    }

    if let (false, Some(limit_param)) = (offset_params.is_empty(), limit_params.last()) {
        let mut bound: Vec<(&Parameter, PropertyPath)> = offset_params
            .iter()
            .filter_map(|param| {
                let schema = response?;
                Some((*param, param.find_input_property(schema, None)?))
            })
            .collect();
        bound.sort_by_key(|(_, prop)| prop.path.len());
        let offset_name = bound
            .first()
            .map_or(&offset_params[0].name, |(param, _)| &param.name)
            .clone();
        let limit = match initial_limit(limit_param) {
            0 => DEFAULT_LIMIT,
            limit => limit,
        };
        let total_path = index
            .and_then(|index| index.find_by_rule(&TOTAL_PROPERTY))
            .map(|prop| prop.json_path());
        let maximum_offset = match total_path {
            Some(_) => None,
            None => Some(DEFAULT_MAXIMUM_PAGINATOR_OFFSET),
        };
        return Some(Pagination::new(
            Paginator::Offset {
                limit,
                offset_param: offset_name.clone(),
                limit_param: limit_param.name.clone(),
                total_path,
                maximum_offset,
            },
            vec![offset_name, limit_param.name.clone()],
        ));
    }

    if let Some(page_param) = page_params.first() {
        let total_path = index
            .and_then(|index| index.find_by_rule(&TOTAL_PAGE_PROPERTY))
            .map(|prop| prop.json_path());
        let maximum_page = match total_path {
            Some(_) => None,
            None => Some(DEFAULT_MAXIMUM_PAGINATOR_OFFSET),
        };
        return Some(Pagination::new(
            Paginator::PageNumber {
                page_param: page_param.name.clone(),
                total_path,
                maximum_page,
            },
            vec![page_param.name.clone()],
        ));
    }

    if let Some(next) = index.and_then(|index| index.find_by_rule(&NEXT_PROPERTY)) {
        let param_names = offset_params
            .first()
            .into_iter()
            .chain(limit_params.last())
            .map(|param| param.name.clone())
            .collect();
        return Some(Pagination::new(
            Paginator::JsonResponse {
                next_url_path: next.json_path(),
            },
            param_names,
        ));
    }

    let suspicious: Vec<String> = cursor_params
        .iter()
        .chain(&offset_params)
        .chain(&limit_params)
        .chain(&page_params)
        .map(|param| param.name.clone())
        .collect();
    if !suspicious.is_empty() {
        warnings.add(
            Some(endpoint.id()),
            DetectionWarning::possible_paginator(suspicious),
        );
    }
    None
}

/// Picks the paginator shared by the collection.
///
/// The most frequent configuration wins when it is the only one, or when it occurs strictly
/// more often than the runner-up. Ties leave the collection without a default.
pub fn detect_global_pagination<'p>(
    detected: impl IntoIterator<Item = Option<&'p Pagination>>,
) -> Option<Pagination> {
    let mut counts: Vec<(&Pagination, usize)> = Vec::new();
    for pagination in detected.into_iter().flatten() {
        match counts.iter_mut().find(|(seen, _)| *seen == pagination) {
            Some((_, count)) => *count += 1,
            None => counts.push((pagination, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    match counts.as_slice() {
        [] => None,
        [(only, _)] => Some((*only).clone()),
        [(top, top_count), (_, second_count), ..] if top_count > second_count => {
            Some((*top).clone())
        }
        _ => None,
    }
}
