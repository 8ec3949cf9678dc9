//! # Path Utilities
//!
//! Helpers for splitting OpenAPI path templates (`/users/{id}/posts`) into segments,
//! recognising path variables and deriving table names from a set of paths.

/// Splits a path template into its non-empty segments.
///
/// A trailing file extension (`/pets.json`) is dropped, the same way servers usually treat it.
pub fn path_parts(path: &str) -> Vec<&str> {
    let path = path.split('.').next().unwrap_or_default();
    path.split('/').filter(|part| !part.trim().is_empty()).collect()
}

/// Whether a single segment is a template variable (`{id}`).
pub fn is_path_var(part: &str) -> bool {
    let part = part.trim();
    part.len() > 1 && part.starts_with('{') && part.ends_with('}')
}

/// Extracts the variable name from a `{name}` segment.
pub fn path_var_name(part: &str) -> Option<&str> {
    if !is_path_var(part) {
        return None;
    }
    let part = part.trim();
    Some(part[1..part.len() - 1].trim())
}

/// All variable names of a path, in order of appearance.
pub fn path_var_names(path: &str) -> Vec<&str> {
    path_parts(path).into_iter().filter_map(path_var_name).collect()
}

/// All segments of a path that are not variables.
pub fn non_var_path_parts(path: &str) -> Vec<&str> {
    path_parts(path)
        .into_iter()
        .filter(|part| !is_path_var(part))
        .collect()
}

/// A path looks like a list endpoint when its final segment is not a variable.
pub fn path_looks_like_list(path: &str) -> bool {
    match path_parts(path).last() {
        Some(last) => !is_path_var(last),
        None => false,
    }
}

/// Longest run of leading segments shared by every sequence.
pub fn find_common_prefix<S: AsRef<str>>(paths: &[Vec<S>]) -> Vec<String> {
    let Some((first, rest)) = paths.split_first() else {
        return Vec::new();
    };

    let mut len = first.len();
    for path in rest {
        len = len.min(path.len());
        for i in 0..len {
            if first[i].as_ref() != path[i].as_ref() {
                len = i;
                break;
            }
        }
    }

    first[..len].iter().map(|s| s.as_ref().to_string()).collect()
}

/// Builds a table name for each path, in input order.
///
/// The common prefix shared by all paths (`/api/v2`) is stripped, but never past the last
/// non-variable segment of any path, so `/pokemon` keeps its own name next to
/// `/pokemon/{name}`. Remaining segments are joined with `_`, variables contributing their
/// bare name.
///
/// e.g. `["/api/v2/users", "/api/v2/users/{id}"]` -> `["users", "users_id"]`
pub fn table_names_from_paths<S: AsRef<str>>(paths: &[S]) -> Vec<String> {
    let split: Vec<Vec<&str>> = paths.iter().map(|p| path_parts(p.as_ref())).collect();
    if split.is_empty() {
        return Vec::new();
    }

    let mut strip = find_common_prefix(&split).len();
    for parts in &split {
        if let Some(last_static) = parts.iter().rposition(|part| !is_path_var(part)) {
            strip = strip.min(last_static);
        }
    }

    split
        .iter()
        .map(|parts| {
            parts
                .iter()
                .skip(strip)
                .map(|part| path_var_name(part).unwrap_or(*part))
                .collect::<Vec<_>>()
                .join("_")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_parts_skips_empty_and_extension() {
        assert_eq!(path_parts("/api/v2/pokemon/"), vec!["api", "v2", "pokemon"]);
        assert_eq!(path_parts("/pets.json"), vec!["pets"]);
        assert!(path_parts("/").is_empty());
    }

    #[test]
    fn test_path_vars() {
        assert!(is_path_var("{id}"));
        assert!(!is_path_var("{"));
        assert!(!is_path_var("users"));
        assert_eq!(path_var_name("{ name }"), Some("name"));
        assert_eq!(
            path_var_names("/users/{user_id}/posts/{post_id}"),
            vec!["user_id", "post_id"]
        );
        assert_eq!(non_var_path_parts("/users/{user_id}/posts"), vec!["users", "posts"]);
    }

    #[test]
    fn test_path_looks_like_list() {
        assert!(path_looks_like_list("/users"));
        assert!(path_looks_like_list("/users/{id}/posts/"));
        assert!(!path_looks_like_list("/users/{id}"));
        assert!(!path_looks_like_list("/"));
    }

    #[test]
    fn test_find_common_prefix() {
        let paths = vec![vec!["a", "b", "c"], vec!["a", "b", "d"], vec!["a", "b"]];
        assert_eq!(find_common_prefix(&paths), vec!["a", "b"]);

        let disjoint = vec![vec!["a", "b"], vec!["k", "b"]];
        assert!(find_common_prefix(&disjoint).is_empty());
    }

    #[test]
    fn test_table_names_prefixed() {
        let names = table_names_from_paths(&[
            "/api/v2/users/{id}",
            "/api/v2/objects/companies",
            "/api/v2/objects/deals",
            "/api/v2/users",
            "/api/v2/objects/deals/activities",
        ]);
        assert_eq!(
            names,
            vec![
                "users_id",
                "objects_companies",
                "objects_deals",
                "users",
                "objects_deals_activities"
            ]
        );
    }

    #[test]
    fn test_table_names_keep_last_static_segment() {
        let names = table_names_from_paths(&["/pokemon", "/pokemon/{name}"]);
        assert_eq!(names, vec!["pokemon", "pokemon_name"]);
    }
}
