//! # Detection Warnings
//!
//! Non-fatal findings collected while parsing and detecting. They never abort a pass; the
//! caller decides whether to log or discard them.

use derive_more::Display;
use indexmap::IndexMap;
use serde::Serialize;

/// Key under which warnings not tied to an endpoint are stored.
pub const GLOBAL_WARNING_KEY: &str = "global";

/// Category of a warning.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WarningKind {
    /// A `$ref` pointing outside the document.
    #[display("UnresolvedReferenceWarning")]
    UnresolvedReference,
    /// No 2xx or default response.
    #[display("DataResponseUndetectedWarning")]
    DataResponseUndetected,
    /// The main response has no JSON schema.
    #[display("DataResponseNoBodyWarning")]
    DataResponseNoBody,
    /// The global security scheme has no auth template.
    #[display("UnsupportedSecuritySchemeWarning")]
    UnsupportedSecurityScheme,
    /// No primary key candidate matched.
    #[display("PrimaryKeyNotFoundWarning")]
    PrimaryKeyNotFound,
    /// Path variables not fed by a parent endpoint.
    #[display("UnresolvedPathParametersWarning")]
    UnresolvedPathParameters,
    /// Pagination-looking parameters without a detected paginator.
    #[display("PossiblePaginatorWarning")]
    PossiblePaginator,
}

/// One warning with its human readable message and the names it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionWarning {
    /// Category.
    pub kind: WarningKind,
    /// Message for humans.
    pub message: String,
    /// Parameter names, scheme types or references the warning is about.
    pub context: Vec<String>,
}

impl DetectionWarning {
    fn new(kind: WarningKind, message: impl Into<String>, context: Vec<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context,
        }
    }

    /// A reference that could not be followed.
    pub fn unresolved_reference(reference: &str) -> Self {
        Self::new(
            WarningKind::UnresolvedReference,
            format!("Reference {reference} points outside of the document and was skipped"),
            vec![reference.to_string()],
        )
    }

    /// No main data response.
    pub fn data_response_undetected() -> Self {
        Self::new(
            WarningKind::DataResponseUndetected,
            "Could not detect the main data response with a status code 2xx. \
             Will not be able to detect primary key and some paginators.",
            Vec::new(),
        )
    }

    /// Main response without a body schema.
    pub fn data_response_no_body() -> Self {
        Self::new(
            WarningKind::DataResponseNoBody,
            "No json response schema defined on main data response. \
             Will not be able to detect primary key and some paginators.",
            Vec::new(),
        )
    }

    /// Security scheme without auth template.
    pub fn unsupported_security_scheme(scheme_type: &str) -> Self {
        Self::new(
            WarningKind::UnsupportedSecurityScheme,
            format!(
                "Security Scheme {scheme_type} is not supported natively at this time. \
                 Please provide a custom implementation."
            ),
            vec![scheme_type.to_string()],
        )
    }

    /// Primary key not detected.
    pub fn primary_key_not_found() -> Self {
        Self::new(
            WarningKind::PrimaryKeyNotFound,
            "Primary key could not be detected",
            Vec::new(),
        )
    }

    /// Path variables that will be rendered with placeholder values.
    pub fn unresolved_path_parameters(params: Vec<String>) -> Self {
        Self::new(
            WarningKind::UnresolvedPathParameters,
            format!(
                "Could not resolve all path params, setting default values for: {}",
                params.join(", ")
            ),
            params,
        )
    }

    /// Parameters suggesting pagination, but no strategy matched.
    pub fn possible_paginator(params: Vec<String>) -> Self {
        Self::new(
            WarningKind::PossiblePaginator,
            format!(
                "Found params that suggest this endpoint is paginated, but could not discover \
                 pagination mechanism. Params: {}",
                params.join(", ")
            ),
            params,
        )
    }
}

/// Ordered warnings per endpoint id, plus the [`GLOBAL_WARNING_KEY`] bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Warnings(IndexMap<String, Vec<DetectionWarning>>);

impl Warnings {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning for `endpoint_id`, or to the global bucket when `None`.
    pub fn add(&mut self, endpoint_id: Option<&str>, warning: DetectionWarning) {
        let key = endpoint_id.unwrap_or(GLOBAL_WARNING_KEY);
        self.0.entry(key.to_string()).or_default().push(warning);
    }

    /// Adds a global warning.
    pub fn add_global(&mut self, warning: DetectionWarning) {
        self.add(None, warning);
    }

    /// Warnings of one endpoint.
    pub fn for_endpoint(&self, endpoint_id: &str) -> &[DetectionWarning] {
        self.0.get(endpoint_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Warnings not tied to an endpoint.
    pub fn global(&self) -> &[DetectionWarning] {
        self.for_endpoint(GLOBAL_WARNING_KEY)
    }

    /// Appends every warning of `other`, keeping its order.
    pub fn extend(&mut self, other: Warnings) {
        for (key, warnings) in other.0 {
            self.0.entry(key).or_default().extend(warnings);
        }
    }

    /// `(key, warnings)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DetectionWarning])> {
        self.0.iter().map(|(key, list)| (key.as_str(), list.as_slice()))
    }

    /// Total number of warnings.
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// No warning recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any warning of `kind` was recorded for `endpoint_id`.
    pub fn has(&self, endpoint_id: &str, kind: WarningKind) -> bool {
        self.for_endpoint(endpoint_id)
            .iter()
            .any(|warning| warning.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets() {
        let mut warnings = Warnings::new();
        warnings.add(Some("getPets"), DetectionWarning::primary_key_not_found());
        warnings.add_global(DetectionWarning::unsupported_security_scheme("oauth2"));
        warnings.add(
            Some("getPets"),
            DetectionWarning::possible_paginator(vec!["page".into()]),
        );

        assert_eq!(warnings.len(), 3);
        assert_eq!(warnings.for_endpoint("getPets").len(), 2);
        assert!(warnings.has("getPets", WarningKind::PossiblePaginator));
        assert!(!warnings.has("other", WarningKind::PossiblePaginator));
        assert_eq!(warnings.global()[0].context, vec!["oauth2"]);
    }

    #[test]
    fn test_messages() {
        let warning =
            DetectionWarning::unresolved_path_parameters(vec!["id".into(), "slug".into()]);
        assert_eq!(
            warning.message,
            "Could not resolve all path params, setting default values for: id, slug"
        );
        assert_eq!(warning.kind.to_string(), "UnresolvedPathParametersWarning");
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut first = Warnings::new();
        first.add(Some("a"), DetectionWarning::primary_key_not_found());
        let mut second = Warnings::new();
        second.add(Some("a"), DetectionWarning::data_response_no_body());
        second.add_global(DetectionWarning::unresolved_reference("x.yaml#/A"));
        first.extend(second);

        let kinds: Vec<WarningKind> = first.for_endpoint("a").iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![WarningKind::PrimaryKeyNotFound, WarningKind::DataResponseNoBody]
        );
        assert_eq!(first.global().len(), 1);
    }
}
