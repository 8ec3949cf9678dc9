#![deny(missing_docs)]

//! # Detection Pipeline
//!
//! Turns a [`ParsedApi`] into a [`DetectedApi`]. Passes run in a fixed order, each one
//! reading only what earlier passes produced:
//!
//! 1. **security**: auth templates and the global scheme.
//! 2. **response**: main response, pagination and payload per endpoint.
//! 3. **primary_key**: record keys of every payload.
//! 4. **relations**: parents, children and transformers.
//! 5. **naming**: resource and table names.
//! 6. **pagination**: the paginator shared by the collection.
//!
//! Warnings are threaded through every pass as an explicit accumulator.

pub mod naming;
pub mod pagination;
pub mod primary_key;
pub mod relations;
pub mod response;
pub mod security;

use crate::collection::{DetectedEndpoint, EndpointCollection};
use crate::config::{Config, DetectorKind};
use crate::oas::document::{ApiInfo, ParsedApi};
use crate::warnings::{DetectionWarning, Warnings};
use pagination::Pagination;
use security::SecurityDetection;
use tracing::{debug, info};

/// A detected document, ready for rendering.
#[derive(Debug, Clone)]
pub struct DetectedApi {
    /// Document metadata.
    pub info: ApiInfo,
    /// Security schemes and the global one.
    pub security: SecurityDetection,
    /// Paginator shared by the collection.
    pub global_pagination: Option<Pagination>,
    /// Detected endpoints, sorted by table name.
    pub endpoints: EndpointCollection,
    /// Parse and detection warnings.
    pub warnings: Warnings,
}

/// A detection strategy.
pub trait Detector {
    /// Runs every pass over a parsed document.
    fn detect(&self, api: ParsedApi, config: &Config) -> DetectedApi;
}

/// The heuristic pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDetector;

impl DetectorKind {
    /// Constructs the selected detector.
    pub fn detector(&self) -> Box<dyn Detector> {
        match self {
            Self::Default => Box::new(DefaultDetector),
        }
    }
}

impl Detector for DefaultDetector {
    fn detect(&self, api: ParsedApi, config: &Config) -> DetectedApi {
        let ParsedApi {
            info,
            security_schemes,
            global_security_name,
            endpoints,
            mut warnings,
        } = api;

        info!("Detecting security schemes");
        let security = security::detect_security(
            &security_schemes,
            global_security_name.as_deref(),
            &mut warnings,
        );

        info!("Detecting responses and paginators");
        let responses = response::detect_responses(&endpoints, &mut warnings);
        let responses = primary_key::detect_primary_keys(&endpoints, responses, &mut warnings);

        info!("Detecting parent child relationships");
        let relations = relations::detect_relations(&endpoints, &responses);
        let transformers = relations::detect_transformers(&endpoints, &responses, &relations);

        info!("Detecting resource names");
        let names = naming::detect_names(&endpoints, &responses, config.name_resources_by_operation);

        let global_pagination =
            pagination::detect_global_pagination(responses.iter().map(|r| r.pagination.as_ref()));
        if let Some(global) = &global_pagination {
            debug!("Global paginator: {:?}", global.paginator);
        }

        let mut detected: Vec<DetectedEndpoint> = endpoints
            .into_iter()
            .zip(responses)
            .zip(relations)
            .zip(transformers)
            .zip(names)
            .map(
                |((((endpoint, response), relations), transformer), naming)| DetectedEndpoint {
                    endpoint,
                    response,
                    relations,
                    transformer,
                    naming,
                    global_pagination: global_pagination.clone(),
                },
            )
            .collect();
        detected.sort_by(|a, b| a.naming.table_name.cmp(&b.naming.table_name));

        for endpoint in &detected {
            let unresolved: Vec<String> = endpoint
                .unresolvable_path_param_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            if !unresolved.is_empty() {
                warnings.add(
                    Some(endpoint.id()),
                    DetectionWarning::unresolved_path_parameters(unresolved),
                );
            }
        }

        info!("Detection finished, {} endpoints", detected.len());
        DetectedApi {
            info,
            security,
            global_pagination,
            endpoints: EndpointCollection::new(detected),
            warnings,
        }
    }
}
