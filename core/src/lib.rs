#![deny(missing_docs)]

//! # Restinit Core
//!
//! Reads an OpenAPI 3 document, resolves its schemas and detects how each `GET` endpoint pages,
//! where its records live, what identifies them and how endpoints nest. The result is a
//! [`SourceConfig`] a code generator can render into a REST source.

/// Shared error types.
pub mod error;

/// User settings.
pub mod config;

/// Path template helpers.
pub mod paths;

/// Singular and plural forms.
pub mod inflect;

/// Name patterns used by the detector.
pub mod heuristics;

/// Non-fatal findings.
pub mod warnings;

/// OpenAPI (OAS) parsing utilities.
pub mod oas;

/// Detection passes.
pub mod detector;

/// Detected endpoints and render selection.
pub mod collection;

/// Renderer-facing output.
pub mod render;

pub use collection::{DetectedEndpoint, EndpointCollection, EndpointSelector, SelectedIds};
pub use config::{Config, DetectorKind};
pub use detector::pagination::{Pagination, Paginator};
pub use detector::{DefaultDetector, DetectedApi, Detector};
pub use error::{AppError, AppResult};
pub use oas::{load_document, parse, parse_document, ParsedApi};
pub use render::SourceConfig;
pub use warnings::{DetectionWarning, WarningKind, Warnings, GLOBAL_WARNING_KEY};

/// Parses a document and runs the configured detector on it.
pub fn detect(bytes: &[u8], config: &Config) -> AppResult<DetectedApi> {
    let api = parse(bytes, config)?;
    Ok(config.detector.detector().detect(api, config))
}
