//! # Document Parsing
//!
//! Entry point from raw bytes to a [`ParsedApi`]:
//!
//! 1. Decode as JSON, then YAML.
//! 2. Reject anything that is not OpenAPI 3.x (unless 2.x is explicitly allowed).
//! 3. Validate the top-level shape through [`ShimOpenApi`].
//! 4. Extract metadata, security schemes and endpoints.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::oas::context::ResolverContext;
use crate::oas::endpoints::{build_endpoints, Endpoint};
use crate::oas::security::{global_security_name, parse_security_schemes, SecurityScheme};
use crate::oas::shims::{version_text, ShimOpenApi};
use crate::warnings::{DetectionWarning, Warnings};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Documents above this size are parsed with a warning.
pub const LARGE_DOCUMENT_BYTES: usize = 1_000_000;

/// A server entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Server {
    /// URL, possibly relative.
    pub url: String,
    /// Free text.
    pub description: Option<String>,
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiInfo {
    /// `info.title`, or the configured fallback.
    pub title: String,
    /// `info.version`.
    pub version: String,
    /// `info.summary`.
    pub summary: Option<String>,
    /// `info.description`.
    pub description: Option<String>,
    /// Declared servers.
    pub servers: Vec<Server>,
}

impl ApiInfo {
    fn from_shim(shim: &ShimOpenApi, document: &Value, config: &Config) -> Self {
        let mut servers: Vec<Server> = shim
            .servers
            .iter()
            .map(|server| Server {
                url: server.url.clone(),
                description: server.description.clone(),
            })
            .collect();
        if servers.is_empty() {
            servers.extend(swagger_server(document));
        }

        Self {
            title: shim
                .info
                .title
                .clone()
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| config.fallback_openapi_title.clone()),
            version: shim.info.version.as_ref().map(version_text).unwrap_or_default(),
            summary: shim.info.summary.clone(),
            description: shim.info.description.clone(),
            servers,
        }
    }

    /// URL of the first server, unless it is the implicit `/` placeholder.
    pub fn base_url(&self) -> Option<&str> {
        let first = self.servers.first()?;
        if first.url == "/" && first.description.is_none() {
            return None;
        }
        Some(&first.url)
    }
}

/// Swagger 2 documents describe their server with `host`, `basePath` and `schemes`.
fn swagger_server(document: &Value) -> Option<Server> {
    let host = document.get("host")?.as_str()?;
    let base_path = document
        .get("basePath")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let scheme = document
        .get("schemes")
        .and_then(Value::as_array)
        .and_then(|schemes| schemes.first())
        .and_then(Value::as_str)
        .unwrap_or("https");
    Some(Server {
        url: format!("{scheme}://{host}{base_path}"),
        description: None,
    })
}

/// Everything extracted from a document before detection.
#[derive(Debug, Clone)]
pub struct ParsedApi {
    /// Metadata.
    pub info: ApiInfo,
    /// Declared security schemes by key.
    pub security_schemes: IndexMap<String, SecurityScheme>,
    /// First scheme named by the top-level `security` requirement.
    pub global_security_name: Option<String>,
    /// One endpoint per included `(path, method)`.
    pub endpoints: Vec<Endpoint>,
    /// Warnings raised while parsing.
    pub warnings: Warnings,
}

/// Decodes raw bytes as JSON, falling back to YAML.
pub fn load_document(bytes: &[u8]) -> AppResult<Value> {
    if bytes.len() > LARGE_DOCUMENT_BYTES {
        warn!(
            "Spec is around {} mb, so parsing might take a while.",
            bytes.len() / LARGE_DOCUMENT_BYTES
        );
    }

    info!("Trying to parse spec as JSON");
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => {
            info!("Parsed spec as JSON");
            return Ok(value);
        }
        Err(e) => debug!("No valid JSON found: {e}"),
    }

    info!("Trying to parse spec as YAML");
    let yaml: serde_yaml::Value = serde_yaml::from_slice(bytes).map_err(|e| {
        debug!("No valid YAML found: {e}");
        AppError::UnparseableDocument
    })?;
    info!("Parsed spec as YAML");
    Ok(yaml_to_json(yaml))
}

/// Converts YAML into JSON, stringifying non-string keys (`200:` status codes).
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(flag) => Value::Bool(flag),
        serde_yaml::Value::Number(number) => serde_json::to_value(&number).unwrap_or(Value::Null),
        serde_yaml::Value::String(text) => Value::String(text),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, inner) in mapping {
                object.insert(yaml_key(key), yaml_to_json(inner));
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(text) => text,
        serde_yaml::Value::Number(number) => number.to_string(),
        serde_yaml::Value::Bool(flag) => flag.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|text| text.trim().to_string())
            .unwrap_or_default(),
    }
}

fn check_version(document: &Value) -> AppResult<()> {
    if document.get("swagger").is_some_and(|v| !v.is_null()) {
        return Err(AppError::UnsupportedSpecVersion {
            swagger_detected: true,
        });
    }
    let version = document.get("openapi").map(version_text);
    match version {
        Some(version) if version.starts_with('3') => Ok(()),
        _ => Err(AppError::UnsupportedSpecVersion {
            swagger_detected: false,
        }),
    }
}

/// Parses an already decoded document.
pub fn parse_document(document: &Value, config: &Config) -> AppResult<ParsedApi> {
    if !document.is_object() {
        return Err(AppError::InvalidSpecStructure(
            "the document root must be an object".to_string(),
        ));
    }
    if !config.allow_openapi_2 {
        check_version(document)?;
    }

    info!("Validating spec structure");
    let shim = ShimOpenApi::deserialize(document)
        .map_err(|e| AppError::InvalidSpecStructure(e.to_string()))?;
    debug!(
        "Spec validation successful, version {}",
        shim.openapi_version().unwrap_or_default()
    );

    info!("Extracting openapi metadata");
    let info = ApiInfo::from_shim(&shim, document, config);

    let mut ctx = ResolverContext::new(document);

    info!("Extracting security schemes");
    let security_schemes = parse_security_schemes(&mut ctx);
    let global_security_name = global_security_name(document);

    info!("Parsing openapi endpoints");
    let endpoints = build_endpoints(&mut ctx, &config.include_methods);
    info!(
        "Completed parsing endpoints. {} endpoints found.",
        endpoints.len()
    );
    if endpoints.is_empty() {
        return Err(AppError::NoEndpointsDiscovered(
            config.include_methods.clone(),
        ));
    }

    let mut warnings = Warnings::new();
    for reference in ctx.unresolved_refs() {
        warnings.add_global(DetectionWarning::unresolved_reference(reference));
    }
    debug!("Resolved {} distinct schema nodes", ctx.cached_nodes());

    Ok(ParsedApi {
        info,
        security_schemes,
        global_security_name,
        endpoints,
        warnings,
    })
}

/// Decodes and parses raw bytes.
pub fn parse(bytes: &[u8], config: &Config) -> AppResult<ParsedApi> {
    let document = load_document(bytes)?;
    parse_document(&document, config)
}
