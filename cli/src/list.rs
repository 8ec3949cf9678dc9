#![deny(missing_docs)]

//! # List Command
//!
//! Prints one line per detected endpoint, so ids can be picked for `detect --select`.

use crate::error::CliResult;
use crate::source::SourceArgs;
use restinit_core::{detect, DetectedEndpoint, Paginator};

/// Arguments for the list command.
#[derive(clap::Args, Debug, Clone)]
pub struct ListArgs {
    /// Document location and parse settings.
    #[clap(flatten)]
    pub source: SourceArgs,
}

fn paginator_label(endpoint: &DetectedEndpoint) -> &'static str {
    match endpoint.pagination().map(|p| &p.paginator) {
        Some(Paginator::Cursor { .. }) => "cursor",
        Some(Paginator::Offset { .. }) => "offset",
        Some(Paginator::PageNumber { .. }) => "page_number",
        Some(Paginator::JsonResponse { .. }) => "json_response",
        None => "-",
    }
}

/// One tab separated line: id, method, path, resource, table, paginator, parent.
pub fn describe(endpoint: &DetectedEndpoint) -> String {
    [
        endpoint.id(),
        endpoint.endpoint.method.as_str(),
        endpoint.path(),
        endpoint.naming.resource_name.as_str(),
        endpoint.naming.table_name.as_str(),
        paginator_label(endpoint),
        endpoint.parent_id().unwrap_or("-"),
    ]
    .join("\t")
}

/// Executes the listing.
pub fn execute(args: &ListArgs) -> CliResult<()> {
    let config = args.source.base_config()?;
    let bytes = args.source.read()?;
    let api = detect(&bytes, &config)?;

    println!("{} {}", api.info.title, api.info.version);
    for endpoint in api.endpoints.endpoints() {
        println!("{}", describe(endpoint));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use restinit_core::Config;

    #[test]
    fn test_describe() {
        let spec = r#"
openapi: 3.0.0
info: { title: Users, version: "1" }
paths:
  /users:
    get:
      operationId: listUsers
      parameters:
        - { name: offset, in: query, schema: { type: integer } }
        - { name: limit, in: query, schema: { type: integer } }
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: array
                items: { type: object, properties: { id: { type: integer } } }
  /users/{id}:
    get:
      operationId: getUser
      parameters:
        - { name: id, in: path, schema: { type: integer } }
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: { type: object, properties: { id: { type: integer } } }
"#;
        let api = detect(spec.as_bytes(), &Config::default()).unwrap();
        let lines: Vec<String> = api.endpoints.endpoints().iter().map(describe).collect();
        assert_eq!(
            lines,
            vec![
                "listUsers\tGET\t/users\tusers\tuser\toffset\t-",
                "getUser\tGET\t/users/{id}\tusers_id\tuser\t-\tlistUsers",
            ]
        );
    }
}
