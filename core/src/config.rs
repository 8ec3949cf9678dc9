//! # Configuration
//!
//! User-tunable settings, loadable from a JSON or YAML file. Every field has a default so a
//! partial file is valid.

use crate::error::{AppError, AppResult};
use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Closed set of detector implementations selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// The heuristic pipeline shipped with this crate.
    #[default]
    Default,
}

/// Settings for parsing, detection and output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP methods to extract, lowercase.
    pub include_methods: Vec<String>,
    /// Skip the OpenAPI 3.x version check.
    pub allow_openapi_2: bool,
    /// Always name resources after their operation id.
    pub name_resources_by_operation: bool,
    /// Item limit for every resource, `0` for none.
    pub global_limit: u64,
    /// Title used when `info.title` is missing or empty.
    pub fallback_openapi_title: String,
    /// Value rendered for required parameters without a default.
    pub required_parameter_default_value: String,
    /// Value rendered for optional parameters without a default.
    pub unrequired_parameter_default_value: String,
    /// Project name, snake cased.
    pub project_name: Option<String>,
    /// Package name, snake cased.
    pub package_name: Option<String>,
    /// Detector implementation.
    pub detector: DetectorKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_methods: vec!["get".to_string()],
            allow_openapi_2: false,
            name_resources_by_operation: false,
            global_limit: 0,
            fallback_openapi_title: "openapi".to_string(),
            required_parameter_default_value: "FILL_ME_IN".to_string(),
            unrequired_parameter_default_value: "OPTIONAL_CONFIG".to_string(),
            project_name: None,
            package_name: None,
            detector: DetectorKind::Default,
        }
    }
}

impl Config {
    /// Loads a config file. `.json` files are read as JSON, anything else as YAML.
    pub fn load_from_path(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config: Config = if is_json {
            serde_json::from_str(&content)
                .map_err(|e| AppError::Config(format!("Invalid JSON config: {}", e)))?
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| AppError::Config(format!("Invalid YAML config: {}", e)))?
        };
        Ok(config.normalized())
    }

    /// Lowercases methods and snake cases project and package names.
    pub fn normalized(mut self) -> Self {
        for method in &mut self.include_methods {
            *method = method.trim().to_lowercase();
        }
        self.include_methods.retain(|m| !m.is_empty());
        self.include_methods.dedup();
        self.project_name = self.project_name.map(|name| name.to_snake_case());
        self.package_name = self.package_name.map(|name| name.to_snake_case());
        self
    }

    /// Name of the generated source: package name, project name, or the API title.
    pub fn source_name(&self, title: &str) -> String {
        self.package_name
            .clone()
            .or_else(|| self.project_name.clone())
            .unwrap_or_else(|| title.to_snake_case())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.include_methods, vec!["get"]);
        assert_eq!(config.required_parameter_default_value, "FILL_ME_IN");
        assert_eq!(config.unrequired_parameter_default_value, "OPTIONAL_CONFIG");
        assert_eq!(config.fallback_openapi_title, "openapi");
        assert_eq!(config.detector, DetectorKind::Default);
    }

    #[test]
    fn test_load_yaml_partial() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "include_methods: [GET, Post]\nglobal_limit: 5\nproject_name: PokeAPI Source"
        )
        .unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.include_methods, vec!["get", "post"]);
        assert_eq!(config.global_limit, 5);
        assert_eq!(config.project_name.as_deref(), Some("poke_api_source"));
        assert!(!config.allow_openapi_2);
    }

    #[test]
    fn test_load_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"allow_openapi_2": true, "detector": "default"}}"#).unwrap();
        let config = Config::load_from_path(file.path()).unwrap();
        assert!(config.allow_openapi_2);
    }

    #[test]
    fn test_load_errors_are_config_errors() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "not json").unwrap();
        let err = Config::load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let missing = Config::load_from_path(Path::new("/definitely/not/here.yaml"));
        assert!(matches!(missing, Err(AppError::Config(_))));
    }

    #[test]
    fn test_source_name() {
        let config = Config::default();
        assert_eq!(config.source_name("Pet Store"), "pet_store");
        let named = Config {
            package_name: Some("pets".into()),
            ..Config::default()
        };
        assert_eq!(named.source_name("Pet Store"), "pets");
    }
}
