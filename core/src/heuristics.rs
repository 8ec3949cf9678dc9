//! # Heuristic Catalogue
//!
//! Every name-based guess the detector makes is a [`HeuristicRule`]: a case-insensitive
//! pattern plus the type a matching property must carry. Parameters are matched on their
//! name only; properties go through
//! [`PropertyIndex::find_by_rule`](crate::oas::properties::PropertyIndex::find_by_rule).

use crate::oas::schema::SchemaType;
use regex::Regex;
use std::sync::LazyLock;

/// Default cutoff for offset and page paginators without a total count.
pub const DEFAULT_MAXIMUM_PAGINATOR_OFFSET: i64 = 20;

/// Page size used when a limit parameter declares neither `maximum` nor `default`.
pub const DEFAULT_LIMIT: i64 = 20;

/// Field names that identify a record regardless of the resource.
pub const PRIMARY_KEY_NAMES: &[&str] = &["id", "pk", "unique", "identifier", "primary_key"];

/// Suffixes combined with resource names (`user_id`, `pk-user`, ...).
pub const PRIMARY_KEY_SUFFIXES: &[&str] = &["id", "pk"];

/// Separators placed between resource name and suffix.
pub const PRIMARY_KEY_WORD_SEPARATORS: &[&str] = &["", "-", "_"];

/// A named pattern with the type constraints applied to matching properties.
#[derive(Debug)]
pub struct HeuristicRule {
    /// Human readable label, used in logs and tests.
    pub name: &'static str,
    /// Compiled pattern.
    pub pattern: LazyLock<Regex>,
    /// Type a property must declare to be a strong match.
    pub require_type: Option<SchemaType>,
    /// Accept untyped properties as a weaker fallback.
    pub allow_unknown_types: bool,
}

impl HeuristicRule {
    /// Whether `name` matches the pattern.
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

fn anchored(alternatives: &str) -> Regex {
    Regex::new(&format!("(?i)^({alternatives})$")).expect("Invalid regex")
}

/// Query parameter holding a page number.
pub static PAGE_PARAM: HeuristicRule = HeuristicRule {
    name: "page param",
    pattern: LazyLock::new(|| anchored("page|page_number")),
    require_type: None,
    allow_unknown_types: true,
};

/// Query parameter holding a record offset.
pub static OFFSET_PARAM: HeuristicRule = HeuristicRule {
    name: "offset param",
    pattern: LazyLock::new(|| anchored("start|offset|skip")),
    require_type: None,
    allow_unknown_types: true,
};

/// Query parameter holding a page size.
pub static LIMIT_PARAM: HeuristicRule = HeuristicRule {
    name: "limit param",
    pattern: LazyLock::new(|| anchored("limit|per_page|page_size|size")),
    require_type: None,
    allow_unknown_types: true,
};

/// Query parameter holding an opaque cursor.
pub static CURSOR_PARAM: HeuristicRule = HeuristicRule {
    name: "cursor param",
    pattern: LazyLock::new(|| anchored("cursor|after|since")),
    require_type: None,
    allow_unknown_types: true,
};

/// Response property holding the next cursor.
pub static CURSOR_PROPERTY: HeuristicRule = HeuristicRule {
    name: "cursor property",
    pattern: LazyLock::new(|| anchored("cursor|next_cursor")),
    require_type: None,
    allow_unknown_types: true,
};

/// Response property holding the total record count.
pub static TOTAL_PROPERTY: HeuristicRule = HeuristicRule {
    name: "total property",
    pattern: LazyLock::new(|| anchored("total|count|total_count|totalRecords|totalItems")),
    require_type: Some(SchemaType::Integer),
    allow_unknown_types: true,
};

/// Response property holding the total page count.
pub static TOTAL_PAGE_PROPERTY: HeuristicRule = HeuristicRule {
    name: "total page property",
    pattern: LazyLock::new(|| anchored("total|count|totalPages")),
    require_type: Some(SchemaType::Integer),
    allow_unknown_types: true,
};

/// Response property holding the URL of the next page.
pub static NEXT_PROPERTY: HeuristicRule = HeuristicRule {
    name: "next property",
    pattern: LazyLock::new(|| anchored("next|next_url|more")),
    require_type: Some(SchemaType::String),
    allow_unknown_types: true,
};

/// Property description hinting at a unique key. Searched as a word, not anchored.
pub static UNIQUE_KEY_DESCRIPTION: HeuristicRule = HeuristicRule {
    name: "unique key description",
    pattern: LazyLock::new(|| {
        Regex::new(r"(?i)\b(unique|id|identifier)\b").expect("Invalid regex")
    }),
    require_type: None,
    allow_unknown_types: true,
};

/// Any array property, used to locate list payloads.
pub static LIST_PAYLOAD: HeuristicRule = HeuristicRule {
    name: "list payload",
    pattern: LazyLock::new(|| Regex::new(r".*").expect("Invalid regex")),
    require_type: Some(SchemaType::Array),
    allow_unknown_types: false,
};

/// The full catalogue, in the order the detector consults it.
pub fn catalogue() -> [&'static HeuristicRule; 10] {
    [
        &CURSOR_PARAM,
        &CURSOR_PROPERTY,
        &OFFSET_PARAM,
        &LIMIT_PARAM,
        &TOTAL_PROPERTY,
        &PAGE_PARAM,
        &TOTAL_PAGE_PROPERTY,
        &NEXT_PROPERTY,
        &UNIQUE_KEY_DESCRIPTION,
        &LIST_PAYLOAD,
    ]
}
