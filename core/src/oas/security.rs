//! # Security Schemes
//!
//! Declared schemes from `components.securitySchemes` and the name of the document-wide
//! requirement.

use crate::oas::context::ResolverContext;
use crate::oas::shims::ShimSecurityScheme;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// A declared security scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityScheme {
    /// Key under `components.securitySchemes`.
    pub key: String,
    /// `type` keyword (`apiKey`, `http`, `oauth2`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// HTTP auth scheme (`basic`, `bearer`).
    pub scheme: Option<String>,
    /// Header, query or cookie name of an `apiKey`.
    pub name: Option<String>,
    /// Location of an `apiKey`.
    pub location: Option<String>,
    /// Free text.
    pub description: Option<String>,
}

impl SecurityScheme {
    fn from_shim(key: &str, shim: ShimSecurityScheme) -> Self {
        Self {
            key: key.to_string(),
            kind: shim.kind,
            scheme: shim.scheme,
            name: shim.name,
            location: shim.location,
            description: shim.description,
        }
    }

    /// Whether the `http` scheme equals `expected`, ignoring case.
    pub fn is_http(&self, expected: &str) -> bool {
        self.kind == "http"
            && self
                .scheme
                .as_deref()
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case(expected))
    }
}

/// Reads every scheme of `components.securitySchemes`, following local `$ref`s.
///
/// Malformed or unresolvable entries are skipped.
pub fn parse_security_schemes(ctx: &mut ResolverContext<'_>) -> IndexMap<String, SecurityScheme> {
    let mut schemes = IndexMap::new();
    let Some(declared) = ctx
        .document()
        .pointer("/components/securitySchemes")
        .and_then(Value::as_object)
    else {
        return schemes;
    };

    for (key, raw) in declared {
        let Some(target) = ctx.resolve_object(raw) else {
            continue;
        };
        match serde_json::from_value::<ShimSecurityScheme>(target.clone()) {
            Ok(shim) => {
                schemes.insert(key.clone(), SecurityScheme::from_shim(key, shim));
            }
            Err(e) => tracing::debug!("Skipping security scheme {key}: {e}"),
        }
    }
    schemes
}

/// First scheme name of the first top-level `security` requirement.
pub fn global_security_name(document: &Value) -> Option<String> {
    document
        .get("security")?
        .as_array()?
        .first()?
        .as_object()?
        .keys()
        .next()
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_schemes_and_global_name() {
        let doc = json!({
            "security": [{ "bearerAuth": [] }, { "apiKey": [] }],
            "components": { "securitySchemes": {
                "apiKey": { "type": "apiKey", "name": "X-API-Key", "in": "header" },
                "bearerAuth": { "$ref": "#/components/x-shared/Bearer" },
                "broken": { "name": "missing type" }
            }, "x-shared": { "Bearer": { "type": "http", "scheme": "Bearer" } } }
        });
        let mut ctx = ResolverContext::new(&doc);
        let schemes = parse_security_schemes(&mut ctx);

        let keys: Vec<&str> = schemes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["apiKey", "bearerAuth"]);
        assert_eq!(schemes["apiKey"].location.as_deref(), Some("header"));
        assert!(schemes["bearerAuth"].is_http("bearer"));
        assert_eq!(global_security_name(&doc).as_deref(), Some("bearerAuth"));
    }

    #[test]
    fn test_no_security() {
        let doc = json!({ "security": [] });
        assert!(global_security_name(&doc).is_none());
        let mut ctx = ResolverContext::new(&doc);
        assert!(parse_security_schemes(&mut ctx).is_empty());
    }
}
