#![deny(missing_docs)]

//! # Spec Input
//!
//! Arguments shared by every command that reads an OpenAPI document: where the document
//! comes from, and the settings that affect parsing.

use crate::error::{CliError, CliResult};
use restinit_core::Config;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Location of the document and parse settings.
#[derive(clap::Args, Debug, Clone)]
#[command(group(clap::ArgGroup::new("input").required(true).args(["spec", "url"])))]
pub struct SourceArgs {
    /// Path to an OpenAPI 3 document (JSON or YAML).
    pub spec: Option<PathBuf>,

    /// URL of an OpenAPI 3 document.
    #[clap(long)]
    pub url: Option<String>,

    /// Config file (JSON or YAML). Command line flags override its values.
    #[clap(long, env = "RESTINIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// HTTP method to extract. Repeat for several, defaults to `get`.
    #[clap(long = "include-method")]
    pub include_methods: Vec<String>,

    /// Skip the OpenAPI 3 version check.
    #[clap(long)]
    pub allow_openapi_2: bool,
}

impl SourceArgs {
    /// Loads the config file, if any, and applies the command line overrides.
    pub fn base_config(&self) -> CliResult<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_path(path)?,
            None => Config::default(),
        };
        if !self.include_methods.is_empty() {
            config.include_methods = self.include_methods.clone();
        }
        if self.allow_openapi_2 {
            config.allow_openapi_2 = true;
        }
        Ok(config.normalized())
    }

    /// Reads the raw document from disk or from the network.
    pub fn read(&self) -> CliResult<Vec<u8>> {
        if let Some(path) = &self.spec {
            debug!("Reading spec from {}", path.display());
            return fs::read(path).map_err(|e| {
                CliError::General(format!("Failed to read {}: {}", path.display(), e))
            });
        }
        match &self.url {
            Some(url) => fetch(url),
            None => Err(CliError::General(
                "either a spec path or --url is required".to_string(),
            )),
        }
    }
}

#[cfg(feature = "client")]
fn fetch(url: &str) -> CliResult<Vec<u8>> {
    crate::fetch::fetch_document(url)
}

#[cfg(not(feature = "client"))]
fn fetch(url: &str) -> CliResult<Vec<u8>> {
    Err(CliError::Fetch {
        url: url.to_string(),
        reason: "this build has no HTTP client, enable the `client` feature".to_string(),
    })
}
