#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use restinit_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// Parsing, detection or config failure from the core crate.
    #[display("{}", _0)]
    App(AppError),

    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// The document could not be downloaded.
    #[from(ignore)]
    #[display("Could not fetch {}: {}", url, reason)]
    Fetch {
        /// Requested URL.
        url: String,
        /// Transport or status error.
        reason: String,
    },

    /// Output could not be serialized.
    #[from(ignore)]
    #[display("Could not render output: {}", _0)]
    Render(String),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// Manual implementation of the standard Error trait.
///
/// `General(String)` and the struct variants carry plain strings, which rules out an
/// auto-derived `source()`.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
