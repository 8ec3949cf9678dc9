//! # Inflection
//!
//! English singular/plural conversion for resource and primary key names.
//!
//! Rules are ordered `(pattern, replacement)` pairs; the first matching rule wins.

use regex::Regex;
use std::sync::LazyLock;

const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "fish",
    "information",
    "metadata",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "species",
];

/// `(singular, plural)`
const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("man", "men"),
    ("move", "moves"),
    ("person", "people"),
    ("sex", "sexes"),
    ("woman", "women"),
];

fn compile(rules: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    rules
        .iter()
        .map(|(pattern, replacement)| {
            (
                Regex::new(pattern).expect("Invalid inflection rule"),
                *replacement,
            )
        })
        .collect()
}

static SINGULAR_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    compile(&[
        (r"(?i)(quiz)zes$", "${1}"),
        (r"(?i)(matr)ices$", "${1}ix"),
        (r"(?i)(vert|ind)ices$", "${1}ex"),
        (r"(?i)^(ox)en$", "${1}"),
        (r"(?i)(alias|status)es$", "${1}"),
        (r"(?i)(octop|vir)i$", "${1}us"),
        (r"(?i)(cris|ax|test)es$", "${1}is"),
        (r"(?i)(shoe)s$", "${1}"),
        (r"(?i)(o)es$", "${1}"),
        (r"(?i)(bus)es$", "${1}"),
        (r"(?i)([ml])ice$", "${1}ouse"),
        (r"(?i)(x|ch|ss|sh)es$", "${1}"),
        (r"(?i)(m)ovies$", "${1}ovie"),
        (r"(?i)([^aeiouy]|qu)ies$", "${1}y"),
        (r"(?i)([lr])ves$", "${1}f"),
        (r"(?i)(tive)s$", "${1}"),
        (r"(?i)(hive)s$", "${1}"),
        (r"(?i)([^f])ves$", "${1}fe"),
        (r"(?i)(^analy)ses$", "${1}sis"),
        (
            r"(?i)((a)naly|(b)a|(d)iagno|(p)arenthe|(p)rogno|(s)ynop|(t)he)ses$",
            "${1}sis",
        ),
        (r"(?i)([ti])a$", "${1}um"),
        (r"(?i)(us|ss|is)$", "${1}"),
        (r"(?i)s$", ""),
    ])
});

static PLURAL_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    compile(&[
        (r"(?i)(quiz)$", "${1}zes"),
        (r"(?i)^(ox)$", "${1}en"),
        (r"(?i)([ml])ouse$", "${1}ice"),
        (r"(?i)(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
        (r"(?i)(x|ch|ss|sh)$", "${1}es"),
        (r"(?i)([^aeiouy]|qu)y$", "${1}ies"),
        (r"(?i)(hive)$", "${1}s"),
        (r"(?i)(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
        (r"(?i)sis$", "ses"),
        (r"(?i)([ti])um$", "${1}a"),
        (r"(?i)(buffal|tomat)o$", "${1}oes"),
        (r"(?i)(bu)s$", "${1}ses"),
        (r"(?i)(alias|status)$", "${1}es"),
        (r"(?i)(octop|vir)us$", "${1}i"),
        (r"(?i)(ax|test)is$", "${1}es"),
        (r"(?i)s$", "s"),
        (r"$", "s"),
    ])
});

fn apply(word: &str, rules: &[(Regex, &'static str)], irregular: impl Fn(&str) -> Option<&'static str>) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word.to_lowercase().as_str()) {
        return word.to_string();
    }
    if let Some(found) = irregular(&word.to_lowercase()) {
        return found.to_string();
    }
    for (pattern, replacement) in rules {
        if pattern.is_match(word) {
            return pattern.replace(word, *replacement).into_owned();
        }
    }
    word.to_string()
}

/// Returns the singular form of `word`.
pub fn singularize(word: &str) -> String {
    apply(word, &SINGULAR_RULES, |w| {
        IRREGULAR
            .iter()
            .find(|(_, plural)| *plural == w)
            .map(|(singular, _)| *singular)
    })
}

/// Returns the plural form of `word`.
pub fn pluralize(word: &str) -> String {
    apply(word, &PLURAL_RULES, |w| {
        IRREGULAR
            .iter()
            .find(|(singular, _)| *singular == w)
            .map(|(_, plural)| *plural)
    })
}

/// The word itself plus its plural and singular forms, without duplicates.
pub fn word_variations(word: &str) -> Vec<String> {
    let mut variations = vec![word.to_string()];
    for candidate in [pluralize(word), singularize(word)] {
        if !variations.contains(&candidate) {
            variations.push(candidate);
        }
    }
    variations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("users"), "user");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("buses"), "bus");
        assert_eq!(singularize("statuses"), "status");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("class"), "class");
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("pokemon"), "pokemon");
        assert_eq!(singularize("data"), "data");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("user"), "users");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("match"), "matches");
        assert_eq!(pluralize("status"), "statuses");
        assert_eq!(pluralize("key"), "keys");
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("users"), "users");
    }

    #[test]
    fn test_word_variations() {
        assert_eq!(word_variations("pet"), vec!["pet", "pets"]);
        assert_eq!(word_variations("pets"), vec!["pets", "pet"]);
    }
}
