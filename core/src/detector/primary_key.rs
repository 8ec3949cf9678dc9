//! # Primary Key Detection
//!
//! Runs once payloads are known. Name matches are tried first, then descriptions, then
//! `format: uuid`.

use crate::detector::response::ResponseDetection;
use crate::heuristics::{
    PRIMARY_KEY_NAMES, PRIMARY_KEY_SUFFIXES, PRIMARY_KEY_WORD_SEPARATORS, UNIQUE_KEY_DESCRIPTION,
};
use crate::inflect::word_variations;
use crate::oas::endpoints::Endpoint;
use crate::oas::properties::PropertyPath;
use crate::oas::schema::{Property, SchemaType};
use crate::paths::{non_var_path_parts, path_var_names};
use crate::warnings::{DetectionWarning, Warnings};

fn is_key_typed(prop: &Property) -> bool {
    prop.schema.is_untyped()
        || prop.schema.has_type(SchemaType::String)
        || prop.schema.has_type(SchemaType::Integer)
}

/// Names a primary key is likely to carry, most likely first.
///
/// Generic names come first, then the last path variable, then combinations of the model
/// name and the last static path segment with `id`/`pk` suffixes.
pub fn probable_key_names(model_name: Option<&str>, path: &str) -> Vec<String> {
    let mut names: Vec<String> = PRIMARY_KEY_NAMES.iter().map(|n| n.to_string()).collect();

    if let Some(last_var) = path_var_names(path).last() {
        names.push(last_var.to_string());
    }

    let mut words: Vec<&str> = Vec::new();
    words.extend(model_name);
    words.extend(non_var_path_parts(path).last());

    for word in words {
        for variation in word_variations(word) {
            for suffix in PRIMARY_KEY_SUFFIXES {
                for separator in PRIMARY_KEY_WORD_SEPARATORS {
                    names.push(format!("{variation}{separator}{suffix}"));
                    names.push(format!("{suffix}{separator}{variation}"));
                }
            }
        }
    }
    names
}

/// First candidate matching a probable name, ignoring case.
pub fn detect_primary_key_by_name(
    candidates: &[&str],
    model_name: Option<&str>,
    path: &str,
) -> Option<String> {
    probable_key_names(model_name, path)
        .iter()
        .find_map(|probable| {
            candidates
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(probable))
        })
        .map(|candidate| candidate.to_string())
}

/// Detects the primary key of a payload's records.
pub fn detect_primary_key(payload: &PropertyPath, path: &str) -> Option<String> {
    let schema = payload.schema();
    let props = schema.all_properties();

    let candidates: Vec<&str> = props
        .values()
        .filter(|prop| is_key_typed(prop))
        .map(|prop| prop.name.as_str())
        .collect();
    if let Some(key) = detect_primary_key_by_name(&candidates, schema.name.as_deref(), path) {
        return Some(key);
    }

    let mut by_description = None;
    let mut by_format = None;
    for prop in props.values().filter(|prop| is_key_typed(prop)) {
        let described = prop
            .schema
            .description
            .as_deref()
            .is_some_and(|text| UNIQUE_KEY_DESCRIPTION.matches(text));
        if described {
            by_description.get_or_insert(prop.name.clone());
        } else if prop.schema.format.as_deref() == Some("uuid") {
            by_format.get_or_insert(prop.name.clone());
        }
    }
    by_description.or(by_format)
}

/// Fills in the primary key of every detected payload.
///
/// Endpoints without a payload are skipped silently; a payload without a key is warned about.
pub fn detect_primary_keys(
    endpoints: &[Endpoint],
    responses: Vec<ResponseDetection>,
    warnings: &mut Warnings,
) -> Vec<ResponseDetection> {
    endpoints
        .iter()
        .zip(responses)
        .map(|(endpoint, mut detected)| {
            if let Some(payload) = &detected.payload {
                detected.primary_key = detect_primary_key(payload, &endpoint.path);
                if detected.primary_key.is_none() {
                    warnings.add(
                        Some(endpoint.id()),
                        DetectionWarning::primary_key_not_found(),
                    );
                }
            }
            detected
        })
        .collect()
}
