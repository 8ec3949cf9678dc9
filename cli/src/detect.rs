#![deny(missing_docs)]

//! # Detect Command
//!
//! Runs the full pipeline on one document and prints the resulting source description.
//!
//! 1. **Read**: the document from disk or `--url`.
//! 2. **Detect**: parse, resolve and run every detection pass.
//! 3. **Select**: restrict rendering to `--select` ids plus the parents they need.
//! 4. **Render**: warnings go to the log, the description to stdout or `--output`.

use crate::error::{CliError, CliResult};
use crate::source::SourceArgs;
use restinit_core::{detect, Config, DetectedApi, SelectedIds, SourceConfig, GLOBAL_WARNING_KEY};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Serialization format of the output.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// YAML document.
    #[default]
    Yaml,
    /// Pretty printed JSON.
    Json,
}

/// Arguments for the detect command.
#[derive(clap::Args, Debug, Clone)]
pub struct DetectArgs {
    /// Document location and parse settings.
    #[clap(flatten)]
    pub source: SourceArgs,

    /// Name every resource after its operation id.
    #[clap(long)]
    pub name_resources_by_operation: bool,

    /// Item limit applied to every resource.
    #[clap(long)]
    pub global_limit: Option<u64>,

    /// Endpoint ids to render. Repeat for several; all endpoints when omitted.
    #[clap(long = "select")]
    pub selected: Vec<String>,

    /// Output format.
    #[clap(long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Write the description to a file instead of stdout.
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

impl DetectArgs {
    fn config(&self) -> CliResult<Config> {
        let mut config = self.source.base_config()?;
        if self.name_resources_by_operation {
            config.name_resources_by_operation = true;
        }
        if let Some(limit) = self.global_limit {
            config.global_limit = limit;
        }
        Ok(config)
    }
}

/// Logs global warnings first, then the warnings of every rendered endpoint.
pub fn log_warnings(api: &DetectedApi) {
    for warning in api.warnings.global() {
        warn!(kind = %warning.kind, "{}", warning.message);
    }
    for endpoint in api.endpoints.endpoints_to_render() {
        for warning in api.warnings.for_endpoint(endpoint.id()) {
            warn!(
                endpoint = endpoint.id(),
                kind = %warning.kind,
                "{}",
                warning.message
            );
        }
    }
}

/// Serializes a source description.
pub fn render(source: &SourceConfig, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Yaml => {
            serde_yaml::to_string(source).map_err(|e| CliError::Render(e.to_string()))
        }
        OutputFormat::Json => serde_json::to_string_pretty(source)
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|e| CliError::Render(e.to_string())),
    }
}

/// Executes the detection and writes the description.
pub fn execute(args: &DetectArgs) -> CliResult<()> {
    let config = args.config()?;
    let bytes = args.source.read()?;

    let mut api = detect(&bytes, &config)?;
    if !args.selected.is_empty() {
        api.endpoints
            .apply_selector(&SelectedIds(args.selected.clone()));
    }
    log_warnings(&api);
    info!(
        "Rendering {} of {} endpoints ({} warnings, {} global)",
        api.endpoints.ids_to_render().len(),
        api.endpoints.len(),
        api.warnings.len(),
        api.warnings.for_endpoint(GLOBAL_WARNING_KEY).len()
    );

    let text = render(&SourceConfig::build(&api, &config), args.format)?;
    match &args.output {
        Some(path) => {
            fs::write(path, text)?;
            info!("Wrote source description to {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const PETS: &str = r#"
openapi: 3.0.0
info: { title: Pets, version: "1" }
paths:
  /pets:
    get:
      operationId: listPets
      parameters:
        - { name: page, in: query, schema: { type: integer } }
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: array
                items:
                  type: object
                  properties:
                    id: { type: integer }
  /pets/{petId}:
    get:
      operationId: showPetById
      parameters:
        - { name: petId, in: path, schema: { type: string } }
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: object
                properties:
                  id: { type: integer }
                  name: { type: string }
"#;

    fn args_for(spec: PathBuf, output: PathBuf, format: OutputFormat) -> DetectArgs {
        DetectArgs {
            source: SourceArgs {
                spec: Some(spec),
                url: None,
                config: None,
                include_methods: Vec::new(),
                allow_openapi_2: false,
            },
            name_resources_by_operation: false,
            global_limit: Some(10),
            selected: vec!["showPetById".to_string()],
            format,
            output: Some(output),
        }
    }

    #[test]
    fn test_execute_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let spec = dir.path().join("pets.yaml");
        fs::File::create(&spec)
            .unwrap()
            .write_all(PETS.as_bytes())
            .unwrap();
        let output = dir.path().join("source.json");

        execute(&args_for(spec, output.clone(), OutputFormat::Json)).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["name"], "pets");
        assert_eq!(written["resource_defaults"]["endpoint"]["params"]["limit"], 10);
        let names: Vec<&str> = written["resources"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|r| r["name"].as_str())
            .collect();
        assert_eq!(names, vec!["pets", "pets_pet_id"]);
        assert_eq!(written["resources"][0]["selected"], false);
    }

    #[test]
    fn test_yaml_output() {
        let dir = tempfile::tempdir().unwrap();
        let spec = dir.path().join("pets.yaml");
        fs::write(&spec, PETS).unwrap();
        let output = dir.path().join("source.yaml");

        execute(&args_for(spec, output.clone(), OutputFormat::Yaml)).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("name: pets\n"));
        assert!(text.contains("type: resolve"));
    }

    #[test]
    fn test_missing_spec_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_for(
            dir.path().join("missing.yaml"),
            dir.path().join("out.yaml"),
            OutputFormat::Yaml,
        );
        assert!(execute(&args).is_err());
        assert!(!dir.path().join("out.yaml").exists());
    }
}
