//! # Source Configuration
//!
//! The serializable description of a REST source handed to a code generator: client settings,
//! shared defaults and one entry per rendered endpoint.

use crate::collection::DetectedEndpoint;
use crate::config::Config;
use crate::detector::pagination::Paginator;
use crate::detector::security::{AuthTemplate, DetectedSecurityScheme};
use crate::detector::DetectedApi;
use crate::oas::parameters::ParamLocation;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Write disposition of resources with a primary key.
pub const MERGE_DISPOSITION: &str = "merge";

/// Auth block of the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Key in a header, query parameter or cookie.
    ApiKey {
        /// Header, query or cookie name.
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// `header`, `query` or `cookie`.
        #[serde(skip_serializing_if = "Option::is_none")]
        location: Option<String>,
        /// Secret placeholder.
        api_key: String,
    },
    /// HTTP basic auth.
    HttpBasic {
        /// Secret placeholder.
        username: String,
        /// Secret placeholder.
        password: String,
    },
    /// HTTP bearer token.
    Bearer {
        /// Secret placeholder.
        token: String,
    },
}

fn secret(name: &str) -> String {
    format!("<{name}>")
}

impl AuthConfig {
    /// Auth block for a supported scheme.
    pub fn from_scheme(scheme: &DetectedSecurityScheme) -> Option<Self> {
        let config = match scheme.auth? {
            AuthTemplate::ApiKey => Self::ApiKey {
                name: scheme.scheme.name.clone(),
                location: scheme.scheme.location.clone(),
                api_key: secret("api_key"),
            },
            AuthTemplate::HttpBasic => Self::HttpBasic {
                username: secret("username"),
                password: secret("password"),
            },
            AuthTemplate::Bearer => Self::Bearer {
                token: secret("token"),
            },
        };
        Some(config)
    }
}

/// Client-level settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientConfig {
    /// Base URL from the first server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Auth of the global security scheme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
    /// Paginator shared by every resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paginator: Option<Paginator>,
}

/// Limit applied to every resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultParams {
    /// Maximum number of items.
    pub limit: u64,
}

/// Endpoint settings shared by every resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultEndpoint {
    /// Shared parameters.
    pub params: DefaultParams,
}

/// Settings shared by every resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDefaults {
    /// Shared endpoint settings.
    pub endpoint: DefaultEndpoint,
}

/// A parameter filled from the parent resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "resolve")]
pub struct ResolveParam {
    /// Parent resource name.
    pub resource: String,
    /// JSON path into the parent record.
    pub field: String,
}

/// Value of a rendered parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Filled from the parent.
    Resolve(ResolveParam),
    /// A literal the user may have to replace.
    Literal(Value),
}

/// Marker for runtime paginator detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoPaginator {
    /// Serialized as `"auto"`.
    Auto,
}

/// Paginator of a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PaginatorSetting {
    /// A detected configuration.
    Config(Paginator),
    /// Detect at runtime.
    Auto(AutoPaginator),
}

/// Endpoint of a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointConfig {
    /// Path template.
    pub path: String,
    /// JSON path of the records.
    pub data_selector: String,
    /// Path and query parameters.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, ParamValue>,
    /// Paginator, absent when the client one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paginator: Option<PaginatorSetting>,
}

/// One generated resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceConfig {
    /// Unique resource name.
    pub name: String,
    /// Destination table.
    pub table_name: String,
    /// Record key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    /// `merge` when a primary key exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_disposition: Option<String>,
    /// `false` for resources rendered only to feed a child.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    /// Endpoint settings.
    pub endpoint: EndpointConfig,
}

/// A complete source description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceConfig {
    /// Source name.
    pub name: String,
    /// Client settings.
    pub client: ClientConfig,
    /// Settings shared by every resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_defaults: Option<ResourceDefaults>,
    /// Rendered resources in collection order.
    pub resources: Vec<ResourceConfig>,
}

impl SourceConfig {
    /// Builds the description of every endpoint selected for rendering.
    pub fn build(api: &DetectedApi, config: &Config) -> Self {
        let collection = &api.endpoints;
        let resources = collection
            .endpoints_to_render()
            .into_iter()
            .map(|endpoint| {
                let parent_resource = collection
                    .parent_of(endpoint)
                    .map(|parent| parent.naming.resource_name.as_str());
                let mut resource = ResourceConfig::build(endpoint, parent_resource, config);
                if collection.is_deselected(endpoint.id()) {
                    resource.selected = Some(false);
                }
                resource
            })
            .collect();

        Self {
            name: config.source_name(&api.info.title),
            client: ClientConfig {
                base_url: api.info.base_url().map(str::to_string),
                auth: api.security.global.as_ref().and_then(AuthConfig::from_scheme),
                paginator: api
                    .global_pagination
                    .as_ref()
                    .map(|pagination| pagination.paginator.clone()),
            },
            resource_defaults: (config.global_limit > 0).then(|| ResourceDefaults {
                endpoint: DefaultEndpoint {
                    params: DefaultParams {
                        limit: config.global_limit,
                    },
                },
            }),
            resources,
        }
    }
}

impl ResourceConfig {
    fn build(endpoint: &DetectedEndpoint, parent_resource: Option<&str>, config: &Config) -> Self {
        let mut params = IndexMap::new();

        if let (Some(transformer), Some(parent)) = (&endpoint.transformer, parent_resource) {
            let mapping = transformer.path_params_mapping();
            params.insert(
                mapping.param,
                ParamValue::Resolve(ResolveParam {
                    resource: parent.to_string(),
                    field: mapping.field,
                }),
            );
        }
        for name in endpoint.unresolvable_path_param_names() {
            let value = endpoint.default_for_param(ParamLocation::Path, name, config);
            params.insert(name.to_string(), ParamValue::Literal(value));
        }
        for param in endpoint.unresolvable_query_params() {
            if param.required {
                let value = endpoint.default_for_param(ParamLocation::Query, &param.name, config);
                params.insert(param.name.clone(), ParamValue::Literal(value));
            }
        }

        let paginator = match endpoint.paginator_to_render() {
            Some(paginator) => Some(PaginatorSetting::Config(paginator.clone())),
            None if endpoint.render_auto_paginator() => {
                Some(PaginatorSetting::Auto(AutoPaginator::Auto))
            }
            None => None,
        };

        let primary_key = endpoint.primary_key().map(str::to_string);
        Self {
            name: endpoint.naming.resource_name.clone(),
            table_name: endpoint.naming.table_name.clone(),
            write_disposition: primary_key
                .as_ref()
                .map(|_| MERGE_DISPOSITION.to_string()),
            primary_key,
            selected: None,
            endpoint: EndpointConfig {
                path: endpoint.path().to_string(),
                data_selector: endpoint.data_selector(),
                params,
                paginator,
            },
        }
    }
}
