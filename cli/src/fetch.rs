//! # Remote Documents
//!
//! Downloads an OpenAPI document over HTTP. Only available with the `client` feature.

use crate::error::{CliError, CliResult};
use tracing::info;

/// Documents larger than this are rejected.
const MAX_DOCUMENT_BYTES: u64 = 64 * 1024 * 1024;

/// Fetches `url` and returns the raw body.
pub fn fetch_document(url: &str) -> CliResult<Vec<u8>> {
    info!("Downloading spec from {url}");
    let fetch_error = |reason: String| CliError::Fetch {
        url: url.to_string(),
        reason,
    };

    let mut response = ureq::get(url)
        .call()
        .map_err(|e| fetch_error(e.to_string()))?;
    response
        .body_mut()
        .with_config()
        .limit(MAX_DOCUMENT_BYTES)
        .read_to_vec()
        .map_err(|e| fetch_error(e.to_string()))
}
