//! Bitbucket Terraform Provider Implementation
//!
//! Host-facing entry points. Each call decodes the host's values, routes to
//! the resource named by `type_name` and reports failures as diagnostics.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::client::{BitbucketClient, HttpClient};
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::resources::group::{self, GroupResource};
use crate::resources::Resource;
use crate::schema::{self, Schema};
use crate::state::{get_optional_string_attr, DynamicValue, WireValue};

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Problem reported back to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

/// Provider and resource schemas
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSchema {
    pub provider: Schema,
    pub resource_schemas: HashMap<String, Schema>,
}

#[derive(Debug, Clone, Default)]
pub struct ReadResourceResponse {
    /// `None` when the object no longer exists remotely
    pub new_state: Option<WireValue>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct PlanResourceChangeResponse {
    pub planned_state: Option<WireValue>,
    /// Attributes whose change forces destroy-and-create
    pub requires_replace: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplyResourceChangeResponse {
    pub new_state: Option<WireValue>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct ImportedResource {
    pub type_name: String,
    pub state: WireValue,
}

#[derive(Debug, Clone, Default)]
pub struct ImportResourceStateResponse {
    pub imported_resources: Vec<ImportedResource>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Bitbucket Terraform Provider
pub struct BitbucketProvider {
    client: Arc<dyn HttpClient>,
}

impl BitbucketProvider {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }

    /// Build the provider from its configuration block layered over `base`
    pub fn configure(base: ProviderConfig, config: &WireValue) -> Result<Self> {
        info!("ConfigureProvider called");

        let value = config.decode()?;
        let mut config = base;
        if let Some(username) = get_optional_string_attr(&value, "username") {
            config.username = Some(username);
        }
        if let Some(password) = get_optional_string_attr(&value, "password") {
            config.password = Some(password);
        }
        if let Some(base_url) = get_optional_string_attr(&value, "base_url") {
            config.base_url = base_url;
        }

        let client = BitbucketClient::new(&config)?;
        info!("Using Bitbucket API at {}", client.base_url());
        Ok(Self::new(Arc::new(client)))
    }

    pub fn get_provider_schema(&self) -> ProviderSchema {
        info!("GetProviderSchema called");

        ProviderSchema {
            provider: schema::provider_schema(),
            resource_schemas: [(GroupResource::type_name().to_string(), GroupResource::schema())]
                .into_iter()
                .collect(),
        }
    }

    fn resource_schema(type_name: &str) -> Result<Schema> {
        match type_name {
            group::TYPE_NAME => Ok(GroupResource::schema()),
            _ => Err(Error::UnknownResourceType(type_name.to_string())),
        }
    }

    pub fn validate_resource_config(&self, type_name: &str, config: &WireValue) -> Vec<Diagnostic> {
        debug!("ValidateResourceConfig called for {}", type_name);

        let config = match config.decode() {
            Ok(value) => value,
            Err(e) => return vec![Diagnostic::error("Invalid configuration value", e.to_string())],
        };

        let problems = match type_name {
            group::TYPE_NAME => GroupResource::validate(&config),
            _ => {
                let e = Error::UnknownResourceType(type_name.to_string());
                return vec![Diagnostic::error("Unknown resource type", e.to_string())];
            }
        };

        problems
            .into_iter()
            .map(|p| Diagnostic::error("Invalid resource configuration", p))
            .collect()
    }

    pub async fn read_resource(
        &self,
        type_name: &str,
        current_state: Option<&WireValue>,
    ) -> ReadResourceResponse {
        info!("ReadResource called for {}", type_name);

        match self.read(type_name, current_state).await {
            Ok(state) => ReadResourceResponse {
                new_state: state,
                diagnostics: vec![],
            },
            Err(e) => {
                error!("Failed to read {}: {}", type_name, e);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![Diagnostic::error("Failed to read resource", e.to_string())],
                }
            }
        }
    }

    async fn read(&self, type_name: &str, current_state: Option<&WireValue>) -> Result<Option<WireValue>> {
        let current = decode_optional(current_state)?;
        let client = self.client.as_ref();

        let new_state = match type_name {
            group::TYPE_NAME => GroupResource::read(client, &current).await?,
            _ => return Err(Error::UnknownResourceType(type_name.to_string())),
        };

        encode_optional(&new_state)
    }

    pub fn plan_resource_change(
        &self,
        type_name: &str,
        prior_state: Option<&WireValue>,
        proposed_new_state: Option<&WireValue>,
    ) -> PlanResourceChangeResponse {
        debug!("PlanResourceChange called for {}", type_name);

        match Self::plan(type_name, prior_state, proposed_new_state) {
            Ok(response) => response,
            Err(e) => PlanResourceChangeResponse {
                diagnostics: vec![Diagnostic::error("Failed to plan resource change", e.to_string())],
                ..Default::default()
            },
        }
    }

    fn plan(
        type_name: &str,
        prior_state: Option<&WireValue>,
        proposed_new_state: Option<&WireValue>,
    ) -> Result<PlanResourceChangeResponse> {
        let schema = Self::resource_schema(type_name)?;
        let prior = decode_optional(prior_state)?;
        let proposed = decode_optional(proposed_new_state)?;

        let (prior_map, proposed_map) = match (prior.as_map(), proposed.as_map()) {
            (Some(prior_map), Some(proposed_map)) => (prior_map, proposed_map),
            // Create or destroy: the proposal is the plan.
            _ => {
                return Ok(PlanResourceChangeResponse {
                    planned_state: encode_optional(&proposed)?,
                    ..Default::default()
                })
            }
        };

        let requires_replace: Vec<String> = schema
            .attributes
            .iter()
            .filter(|a| a.force_new && prior_map.get(a.name) != proposed_map.get(a.name))
            .map(|a| a.name.to_string())
            .collect();

        let mut planned = proposed_map.clone();
        if requires_replace.is_empty() {
            // Computed attributes keep their known values across in-place updates.
            for attr in schema.attributes.iter().filter(|a| a.computed && !a.optional) {
                let unset = planned.get(attr.name).map_or(true, DynamicValue::is_null);
                if let (true, Some(known)) = (unset, prior_map.get(attr.name)) {
                    planned.insert(attr.name.to_string(), known.clone());
                }
            }
        }

        Ok(PlanResourceChangeResponse {
            planned_state: Some(WireValue::encode(&DynamicValue::Map(planned))?),
            requires_replace,
            diagnostics: vec![],
        })
    }

    pub async fn apply_resource_change(
        &self,
        type_name: &str,
        prior_state: Option<&WireValue>,
        planned_state: Option<&WireValue>,
    ) -> ApplyResourceChangeResponse {
        info!("ApplyResourceChange called for {}", type_name);

        match self.apply(type_name, prior_state, planned_state).await {
            Ok(new_state) => ApplyResourceChangeResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(e) => {
                error!("Failed to apply {}: {}", type_name, e);
                ApplyResourceChangeResponse {
                    new_state: None,
                    diagnostics: vec![Diagnostic::error("Failed to apply resource change", e.to_string())],
                }
            }
        }
    }

    async fn apply(
        &self,
        type_name: &str,
        prior_state: Option<&WireValue>,
        planned_state: Option<&WireValue>,
    ) -> Result<Option<WireValue>> {
        let prior = decode_optional(prior_state)?;
        let planned = decode_optional(planned_state)?;
        let client = self.client.as_ref();

        if type_name != group::TYPE_NAME {
            return Err(Error::UnknownResourceType(type_name.to_string()));
        }

        let new_state = match (prior.is_null(), planned.is_null()) {
            // Create
            (true, false) => GroupResource::create(client, &planned).await?,
            // Delete
            (false, true) => {
                GroupResource::delete(client, &prior).await?;
                DynamicValue::Null
            }
            // Update
            (false, false) => GroupResource::update(client, &prior, &planned).await?,
            // No change
            (true, true) => DynamicValue::Null,
        };

        encode_optional(&new_state)
    }

    pub async fn import_resource_state(&self, type_name: &str, id: &str) -> ImportResourceStateResponse {
        info!("ImportResourceState called for {} with ID {}", type_name, id);

        let state = match type_name {
            group::TYPE_NAME => GroupResource::import(self.client.as_ref(), id).await,
            _ => Err(Error::UnknownResourceType(type_name.to_string())),
        };

        let result = state.and_then(|s| {
            encode_optional(&s)?
                .ok_or_else(|| Error::ImportNotFound(format!("{} ({})", type_name, id)))
        });

        match result {
            Ok(state) => ImportResourceStateResponse {
                imported_resources: vec![ImportedResource {
                    type_name: type_name.to_string(),
                    state,
                }],
                diagnostics: vec![],
            },
            Err(e) => ImportResourceStateResponse {
                imported_resources: vec![],
                diagnostics: vec![Diagnostic::error("Failed to import resource", e.to_string())],
            },
        }
    }
}

fn decode_optional(value: Option<&WireValue>) -> Result<DynamicValue> {
    value.map(WireValue::decode).transpose().map(Option::unwrap_or_default)
}

fn encode_optional(value: &DynamicValue) -> Result<Option<WireValue>> {
    if value.is_null() {
        Ok(None)
    } else {
        WireValue::encode(value).map(Some)
    }
}
