//! # Resolver Context
//!
//! Per-document state shared by every resolution step: the raw document used for pointer
//! lookups, the resolved schema cache, and the list of references that could not be followed.

use crate::oas::ref_utils::follow_refs;
use crate::oas::schema::SchemaNode;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Cache key: reference URL plus the depth it was resolved at.
///
/// Depth is part of the key because the same definition resolved closer to the recursion
/// limit is cut off earlier, so the two trees differ.
pub(crate) type CacheKey = (String, usize);

/// Resolution state for one document parse.
#[derive(Debug)]
pub struct ResolverContext<'a> {
    pub(crate) document: &'a Value,
    pub(crate) cache: HashMap<CacheKey, Arc<SchemaNode>>,
    unresolved: Vec<String>,
}

impl<'a> ResolverContext<'a> {
    /// Creates a context over the raw document.
    pub fn new(document: &'a Value) -> Self {
        Self {
            document,
            cache: HashMap::new(),
            unresolved: Vec::new(),
        }
    }

    /// The raw document.
    pub fn document(&self) -> &'a Value {
        self.document
    }

    /// Follows `$ref`s on a non-schema object (parameter, response, path item, scheme).
    ///
    /// Unresolvable references are recorded and yield `None`.
    pub fn resolve_object(&mut self, value: &'a Value) -> Option<&'a Value> {
        match follow_refs(self.document, value) {
            Ok((_, target)) => Some(target),
            Err(reference) => {
                self.record_unresolved(reference);
                None
            }
        }
    }

    pub(crate) fn record_unresolved(&mut self, reference: String) {
        if !self.unresolved.contains(&reference) {
            warn!("Could not resolve reference {reference}, it will be skipped");
            self.unresolved.push(reference);
        }
    }

    /// References that could not be followed so far, in discovery order.
    pub fn unresolved_refs(&self) -> &[String] {
        &self.unresolved
    }

    /// Number of cached schema nodes.
    pub fn cached_nodes(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_object_records_missing_refs_once() {
        let doc = json!({
            "components": { "parameters": { "Limit": { "name": "limit", "in": "query" } } }
        });
        let good = json!({ "$ref": "#/components/parameters/Limit" });
        let bad = json!({ "$ref": "other.yaml#/components/parameters/Limit" });

        let mut ctx = ResolverContext::new(&doc);
        assert_eq!(
            ctx.resolve_object(&good).and_then(|p| p.get("name")),
            Some(&json!("limit"))
        );
        assert!(ctx.resolve_object(&bad).is_none());
        assert!(ctx.resolve_object(&bad).is_none());
        assert_eq!(
            ctx.unresolved_refs(),
            &["other.yaml#/components/parameters/Limit".to_string()]
        );
    }
}
