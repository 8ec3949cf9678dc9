//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Only terminal conditions live here. Anything the detector can recover from is reported
//! as a [`DetectionWarning`](crate::warnings::DetectionWarning) instead.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// The document is neither valid JSON nor valid YAML.
    #[from(ignore)]
    #[display("Could not parse selected spec, please provide a valid YAML or JSON document.")]
    UnparseableDocument,

    /// The document parsed but does not have the shape of an OpenAPI object.
    #[from(ignore)]
    #[display("Could not validate selected spec: {_0}")]
    InvalidSpecStructure(String),

    /// The document is not an OpenAPI 3.x document and 2.x was not explicitly allowed.
    #[from(ignore)]
    #[display(
        "The spec you selected does not appear to be an OpenAPI 3.0 spec. {}",
        version_hint(*swagger_detected)
    )]
    UnsupportedSpecVersion {
        /// Whether a top level `swagger` key was found.
        swagger_detected: bool,
    },

    /// No operation matched the configured HTTP methods.
    #[from(ignore)]
    #[display("No endpoints discovered for methods: {}", _0.join(", "))]
    NoEndpointsDiscovered(Vec<String>),

    /// Invalid or unreadable configuration.
    #[from(ignore)]
    #[display("Config Error: {_0}")]
    Config(String),

    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

fn version_hint(swagger_detected: bool) -> &'static str {
    if swagger_detected {
        "It looks like this is a Swagger/OpenAPI 2.0 spec, convert it to OpenAPI 3.0 and retry."
    } else {
        "If this is a Swagger/OpenAPI 2.0 or earlier spec, convert it to OpenAPI 3.0 and retry."
    }
}

impl AppError {
    /// True for the kinds that abort before any detection runs.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppError::UnparseableDocument
                | AppError::InvalidSpecStructure(_)
                | AppError::UnsupportedSpecVersion { .. }
                | AppError::NoEndpointsDiscovered(_)
        )
    }
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert!(!app_err.is_terminal());
    }

    #[test]
    fn test_string_conversion() {
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_version_message_mentions_swagger() {
        let err = AppError::UnsupportedSpecVersion {
            swagger_detected: true,
        };
        assert!(err.to_string().contains("Swagger/OpenAPI 2.0 spec"));
        assert!(err.is_terminal());
    }

    #[test]
    fn test_no_endpoints_lists_methods() {
        let err = AppError::NoEndpointsDiscovered(vec!["get".into(), "post".into()]);
        assert_eq!(err.to_string(), "No endpoints discovered for methods: get, post");
    }
}
