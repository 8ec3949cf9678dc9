#![deny(missing_docs)]

//! # OpenAPI Parsing Module
//!
//! - **ref_utils**: JSON pointer lookup and `$ref` classification.
//! - **shims**: Typed validation layer over the raw document.
//! - **context**: Per-document resolution state and cache.
//! - **schema**: Resolved schema nodes.
//! - **properties**: Flattened property paths of a schema.
//! - **parameters**, **endpoints**, **security**: The typed operation model.
//! - **document**: Decoding, version gate and extraction.

pub mod context;
pub mod document;
pub mod endpoints;
pub mod parameters;
pub mod properties;
pub mod ref_utils;
pub mod schema;
pub mod security;
pub mod shims;

pub use context::ResolverContext;
pub use document::{load_document, parse, parse_document, ApiInfo, ParsedApi, Server};
pub use endpoints::{build_endpoints, Endpoint, Response};
pub use parameters::{ParamLocation, Parameter};
pub use properties::{PropertyIndex, PropertyPath, ARRAY_ITEM_MARKER};
pub use schema::{Property, SchemaNode, SchemaType, MAX_RECURSION_DEPTH};
pub use security::SecurityScheme;
