//! # Reference Utilities
//!
//! Shared helpers for resolving `$ref` targets inside a single document.
//!
//! Only in-document JSON pointers (`#/...`) are followed. Relative and remote references are
//! classified so the caller can report them, but they are never fetched.

use percent_encoding::percent_decode_str;
use serde_json::Value;
use url::Url;

/// Maximum number of `$ref` hops followed before a chain is considered a loop.
pub const MAX_REF_HOPS: usize = 32;

/// Where a `$ref` points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `#/components/...` within the current document.
    Local,
    /// A relative document reference (`other.yaml#/Foo`).
    Relative,
    /// An absolute URI (`https://example.com/spec.yaml#/Foo`).
    Remote,
}

/// Classifies a raw `$ref` string.
pub fn reference_kind(ref_str: &str) -> ReferenceKind {
    if ref_str.starts_with('#') {
        ReferenceKind::Local
    } else if Url::parse(ref_str).is_ok() {
        ReferenceKind::Remote
    } else {
        ReferenceKind::Relative
    }
}

/// Returns the `$ref` string of a JSON object, if any.
pub fn ref_of(value: &Value) -> Option<&str> {
    value.get("$ref").and_then(Value::as_str)
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent encoding).
pub fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Looks up a local `#/...` pointer in `document`.
///
/// Returns `None` for non-local references or pointers that do not resolve.
pub fn lookup_pointer<'a>(document: &'a Value, ref_str: &str) -> Option<&'a Value> {
    let pointer = ref_str.strip_prefix('#')?;
    if pointer.is_empty() {
        return Some(document);
    }
    let pointer = pointer.strip_prefix('/')?;

    let mut current = document;
    for raw in pointer.split('/') {
        let segment = decode_pointer_segment(raw);
        current = match current {
            Value::Object(map) => map.get(&segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Follows a chain of `$ref`s starting at `value` until a non-reference object is reached.
///
/// Returns the first reference of the chain (if any) together with the target.
pub fn follow_refs<'a>(
    document: &'a Value,
    value: &'a Value,
) -> Result<(Option<&'a str>, &'a Value), String> {
    let first_ref = ref_of(value);
    let mut current = value;
    for _ in 0..MAX_REF_HOPS {
        let Some(ref_str) = ref_of(current) else {
            return Ok((first_ref, current));
        };
        if reference_kind(ref_str) != ReferenceKind::Local {
            return Err(ref_str.to_string());
        }
        current = lookup_pointer(document, ref_str).ok_or_else(|| ref_str.to_string())?;
    }
    Err(first_ref.unwrap_or_default().to_string())
}

/// Extracts a component name from a `$ref` pointing to `#/components/{section}/{name}`.
///
/// Any section is accepted; references elsewhere in the document yield `None` because they do
/// not produce useful names.
pub fn extract_component_name(ref_str: &str) -> Option<String> {
    let pointer = ref_str.strip_prefix("#/components/")?;
    let name = pointer.split('/').nth(1)?;
    let name = decode_pointer_segment(name);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_kind() {
        assert_eq!(reference_kind("#/components/schemas/User"), ReferenceKind::Local);
        assert_eq!(
            reference_kind("https://example.com/openapi.yaml#/components/schemas/User"),
            ReferenceKind::Remote
        );
        assert_eq!(reference_kind("common.yaml#/User"), ReferenceKind::Relative);
    }

    #[test]
    fn test_decode_pointer_segment_percent_encoding() {
        let decoded = decode_pointer_segment("User%20Profile~1details");
        assert_eq!(decoded, "User Profile/details");
    }

    #[test]
    fn test_lookup_pointer_paths_and_arrays() {
        let doc = json!({
            "paths": { "/users/{id}": { "get": { "parameters": [{ "name": "id" }] } } }
        });
        let found = lookup_pointer(&doc, "#/paths/~1users~1{id}/get/parameters/0/name");
        assert_eq!(found, Some(&json!("id")));
        assert!(lookup_pointer(&doc, "#/paths/missing").is_none());
        assert!(lookup_pointer(&doc, "other.yaml#/paths").is_none());
    }

    #[test]
    fn test_follow_refs_chain_and_loop() {
        let doc = json!({
            "components": { "schemas": {
                "A": { "$ref": "#/components/schemas/B" },
                "B": { "type": "string" },
                "X": { "$ref": "#/components/schemas/Y" },
                "Y": { "$ref": "#/components/schemas/X" }
            }}
        });
        let start = json!({ "$ref": "#/components/schemas/A" });
        let (first, target) = follow_refs(&doc, &start).unwrap();
        assert_eq!(first, Some("#/components/schemas/A"));
        assert_eq!(target, &json!({ "type": "string" }));

        let looping = json!({ "$ref": "#/components/schemas/X" });
        assert!(follow_refs(&doc, &looping).is_err());
    }

    #[test]
    fn test_extract_component_name() {
        assert_eq!(
            extract_component_name("#/components/schemas/Pet"),
            Some("Pet".to_string())
        );
        assert_eq!(extract_component_name("#/paths/~1pets/get"), None);
    }
}
