//! # Security Detection
//!
//! Maps declared schemes onto the auth templates a generated source knows how to fill in, and
//! picks the scheme used client-wide.

use crate::oas::security::SecurityScheme;
use crate::warnings::{DetectionWarning, Warnings};
use indexmap::IndexMap;
use serde::Serialize;

/// Auth shapes a generated client supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthTemplate {
    /// A key sent in a header, query parameter or cookie.
    ApiKey,
    /// HTTP basic auth.
    HttpBasic,
    /// HTTP bearer token.
    Bearer,
}

impl AuthTemplate {
    /// Template for a scheme, `None` when unsupported.
    pub fn for_scheme(scheme: &SecurityScheme) -> Option<Self> {
        if scheme.kind == "apiKey" {
            Some(Self::ApiKey)
        } else if scheme.is_http("basic") {
            Some(Self::HttpBasic)
        } else if scheme.is_http("bearer") {
            Some(Self::Bearer)
        } else {
            None
        }
    }

    /// Names of the secrets the template needs.
    pub fn secret_names(&self) -> &'static [&'static str] {
        match self {
            Self::ApiKey => &["api_key"],
            Self::HttpBasic => &["username", "password"],
            Self::Bearer => &["token"],
        }
    }
}

/// A declared scheme with its detected template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedSecurityScheme {
    /// The declared scheme.
    #[serde(flatten)]
    pub scheme: SecurityScheme,
    /// Secrets the user has to provide, empty when unsupported.
    pub secret_names: Vec<String>,
    /// Template, `None` when unsupported.
    pub auth: Option<AuthTemplate>,
}

impl DetectedSecurityScheme {
    fn detect(scheme: &SecurityScheme) -> Self {
        let auth = AuthTemplate::for_scheme(scheme);
        Self {
            scheme: scheme.clone(),
            secret_names: auth
                .map(|template| {
                    template
                        .secret_names()
                        .iter()
                        .map(|name| name.to_string())
                        .collect()
                })
                .unwrap_or_default(),
            auth,
        }
    }

    /// Whether a template exists for the scheme.
    pub fn is_supported(&self) -> bool {
        self.auth.is_some()
    }
}

/// Output of the security pass.
#[derive(Debug, Clone, Default)]
pub struct SecurityDetection {
    /// Every declared scheme by key.
    pub schemes: IndexMap<String, DetectedSecurityScheme>,
    /// Scheme used by the generated client.
    pub global: Option<DetectedSecurityScheme>,
}

/// Detects templates and selects the global scheme.
///
/// The scheme named by the document's first requirement wins when supported. Otherwise the
/// first supported declared scheme is used.
pub fn detect_security(
    declared: &IndexMap<String, SecurityScheme>,
    global_name: Option<&str>,
    warnings: &mut Warnings,
) -> SecurityDetection {
    let schemes: IndexMap<String, DetectedSecurityScheme> = declared
        .iter()
        .map(|(key, scheme)| (key.clone(), DetectedSecurityScheme::detect(scheme)))
        .collect();

    let mut global = None;
    if let Some(named) = global_name.and_then(|name| schemes.get(name)) {
        if named.is_supported() {
            global = Some(named.clone());
        } else {
            warnings.add_global(DetectionWarning::unsupported_security_scheme(
                &named.scheme.kind,
            ));
        }
    }
    if global.is_none() {
        global = schemes.values().find(|scheme| scheme.is_supported()).cloned();
    }

    SecurityDetection { schemes, global }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warnings::WarningKind;

    fn scheme(key: &str, kind: &str, http: Option<&str>) -> (String, SecurityScheme) {
        (
            key.to_string(),
            SecurityScheme {
                key: key.to_string(),
                kind: kind.to_string(),
                scheme: http.map(str::to_string),
                name: None,
                location: None,
                description: None,
            },
        )
    }

    #[test]
    fn test_templates() {
        let declared: IndexMap<_, _> = [
            scheme("key", "apiKey", None),
            scheme("basic", "http", Some("Basic")),
            scheme("bearer", "http", Some("bearer")),
            scheme("oauth", "oauth2", None),
        ]
        .into_iter()
        .collect();
        let mut warnings = Warnings::new();
        let detected = detect_security(&declared, None, &mut warnings);

        assert_eq!(detected.schemes["key"].secret_names, vec!["api_key"]);
        assert_eq!(
            detected.schemes["basic"].secret_names,
            vec!["username", "password"]
        );
        assert_eq!(detected.schemes["bearer"].auth, Some(AuthTemplate::Bearer));
        assert!(!detected.schemes["oauth"].is_supported());
        assert_eq!(detected.global.unwrap().scheme.key, "key");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unsupported_global_falls_back_with_warning() {
        let declared: IndexMap<_, _> = [
            scheme("oauth", "oauth2", None),
            scheme("bearer", "http", Some("bearer")),
        ]
        .into_iter()
        .collect();
        let mut warnings = Warnings::new();
        let detected = detect_security(&declared, Some("oauth"), &mut warnings);

        assert_eq!(detected.global.unwrap().scheme.key, "bearer");
        assert_eq!(
            warnings.global()[0].kind,
            WarningKind::UnsupportedSecurityScheme
        );
        assert_eq!(warnings.global()[0].context, vec!["oauth2"]);
    }

    #[test]
    fn test_named_global_wins() {
        let declared: IndexMap<_, _> = [
            scheme("key", "apiKey", None),
            scheme("basic", "http", Some("basic")),
        ]
        .into_iter()
        .collect();
        let mut warnings = Warnings::new();
        let detected = detect_security(&declared, Some("basic"), &mut warnings);
        assert_eq!(detected.global.unwrap().auth, Some(AuthTemplate::HttpBasic));
    }
}
