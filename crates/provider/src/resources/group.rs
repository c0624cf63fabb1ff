//! Group Resource handler for Terraform
//!
//! Manages user groups scoped to a workspace through the 1.0 groups API.
//! Creation only submits the group name as a form field; `auto_add` and
//! `permission` reach the API on the first update.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::HttpClient;
use crate::error::{Error, Result};
use crate::identity::{valid_segment, workspace_path, GroupId};
use crate::schema::{self, Schema, GROUP_PERMISSIONS};
use crate::state::{
    DynamicValue, get_string_attr, get_optional_string_attr, get_optional_bool_attr,
    make_state, string_value, optional_string_value, bool_value,
};
use super::Resource;

pub const TYPE_NAME: &str = "bitbucket_group";

/// Repository permission a group grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    Admin,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Admin => "admin",
        }
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            "admin" => Ok(Permission::Admin),
            other => Err(Error::InvalidConfig(format!(
                "expected permission to be one of {:?}, got {:?}",
                GROUP_PERMISSIONS, other
            ))),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group document as exchanged with the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_add: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}

/// Create response; the server-assigned slug is mandatory
#[derive(Debug, Deserialize)]
struct CreatedGroup {
    slug: String,
}

/// Typed group configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupConfig {
    pub workspace: String,
    pub name: String,
    /// Unset, explicitly false, or true
    pub auto_add: Option<bool>,
    pub permission: Option<Permission>,
}

impl GroupConfig {
    pub fn new(workspace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            name: name.into(),
            auto_add: None,
            permission: None,
        }
    }

    pub fn with_auto_add(mut self, auto_add: bool) -> Self {
        self.auto_add = Some(auto_add);
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }

    /// Build from a host configuration value
    pub fn from_value(config: &DynamicValue) -> Result<Self> {
        let problems = validate_config(config);
        if !problems.is_empty() {
            return Err(Error::InvalidConfig(problems.join("; ")));
        }

        let permission = get_optional_string_attr(config, "permission")
            .map(|p| p.parse::<Permission>())
            .transpose()?;

        Ok(Self {
            workspace: get_string_attr(config, "workspace"),
            name: get_string_attr(config, "name"),
            auto_add: get_optional_bool_attr(config, "auto_add"),
            permission,
        })
    }

    /// Request document for this configuration
    pub fn to_group(&self) -> Group {
        Group {
            name: self.name.clone(),
            slug: None,
            auto_add: self.auto_add,
            permission: self.permission.map(|p| p.as_str().to_string()),
        }
    }
}

/// Check a configuration value against the group schema
pub fn validate_config(config: &DynamicValue) -> Vec<String> {
    let mut problems = Vec::new();

    if config.as_map().is_none() {
        problems.push("configuration must be an object".to_string());
        return problems;
    }

    for attr in schema::group_schema().attributes.iter().filter(|a| a.required) {
        if get_string_attr(config, attr.name).is_empty() {
            problems.push(format!("the argument \"{}\" is required", attr.name));
        }
    }

    let workspace = get_string_attr(config, "workspace");
    if !workspace.is_empty() && !valid_segment(&workspace) {
        problems.push(format!("workspace {:?} must not contain '/'", workspace));
    }

    match config.get("auto_add") {
        None | Some(DynamicValue::Null) | Some(DynamicValue::Bool(_)) => {}
        Some(other) => problems.push(format!("auto_add must be a bool, got {:?}", other)),
    }

    if let Some(permission) = get_optional_string_attr(config, "permission") {
        if let Err(e) = permission.parse::<Permission>() {
            problems.push(e.to_string());
        }
    }

    problems
}

/// Local state of a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupState {
    pub id: GroupId,
    pub slug: String,
    pub name: String,
    pub auto_add: bool,
    pub permission: Option<String>,
}

impl GroupState {
    pub fn to_value(&self) -> DynamicValue {
        make_state(vec![
            ("id", string_value(self.id.to_string())),
            ("workspace", string_value(self.id.workspace())),
            ("slug", string_value(&self.slug)),
            ("name", string_value(&self.name)),
            ("auto_add", bool_value(self.auto_add)),
            ("permission", optional_string_value(self.permission.clone())),
        ])
    }
}

/// Identity recorded in a state value, from `id` or `workspace` + `slug`
pub fn state_identity(state: &DynamicValue) -> Result<GroupId> {
    let id = get_string_attr(state, "id");
    if !id.is_empty() {
        return id.parse();
    }
    GroupId::new(get_string_attr(state, "workspace"), get_string_attr(state, "slug"))
}

pub struct GroupResource;

impl GroupResource {
    /// Create the group, then read it back. `None` if it vanished in between.
    pub async fn create_group(
        client: &dyn HttpClient,
        config: &GroupConfig,
    ) -> Result<Option<GroupState>> {
        if !valid_segment(&config.workspace) {
            return Err(Error::InvalidConfig(format!(
                "workspace {:?} must be non-empty and must not contain '/'",
                config.workspace
            )));
        }

        let group = config.to_group();
        debug!("Group Request: {:?}", group);

        // The create endpoint only understands the name field.
        let body = serde_urlencoded::to_string(vec![("name", group.name.as_str())])
            .map_err(|e| Error::InvalidConfig(format!("cannot encode group name: {}", e)))?;

        let path = workspace_path(&config.workspace);
        let response = client
            .post_form(&path, body.into_bytes())
            .await?
            .error_for_status("POST", &path)?;

        let body = response.body.unwrap_or_default();
        debug!("Group Req Response JSON: {}", String::from_utf8_lossy(&body));

        let created: CreatedGroup = serde_json::from_slice(&body)?;
        debug!("Group Req Response Decoded: {:?}", created);

        if created.slug.is_empty() {
            return Err(Error::Decode(serde::de::Error::custom(
                "create response carries an empty slug",
            )));
        }
        let id = GroupId::new(config.workspace.as_str(), created.slug)?;
        Self::read_group(client, &id).await
    }

    /// Read the group. `None` means it no longer exists remotely.
    pub async fn read_group(client: &dyn HttpClient, id: &GroupId) -> Result<Option<GroupState>> {
        let path = id.api_path();
        let response = client.get(&path).await?;

        if response.status == 404 {
            warn!("Group ({}) not found, removing from state", id);
            return Ok(None);
        }

        let response = response.error_for_status("GET", &path)?;
        let body = response
            .body_bytes()
            .ok_or_else(|| Error::EmptyResponse(format!("Group ({})", id)))?;
        debug!("Groups Response JSON: {}", String::from_utf8_lossy(body));

        let group: Group = serde_json::from_slice(body)?;
        debug!("Groups Response Decoded: {:?}", group);

        Ok(Some(GroupState {
            id: id.clone(),
            slug: group.slug.unwrap_or_else(|| id.slug().to_string()),
            name: group.name,
            auto_add: group.auto_add.unwrap_or(false),
            permission: group.permission,
        }))
    }

    /// Replace the mutable fields, then read the group back
    pub async fn update_group(
        client: &dyn HttpClient,
        id: &GroupId,
        config: &GroupConfig,
    ) -> Result<Option<GroupState>> {
        let group = config.to_group();
        debug!("Group Request: {:?}", group);
        let body = serde_json::to_vec(&group)?;

        let path = format!("{}/", id.api_path());
        client
            .put(&path, body)
            .await?
            .error_for_status("PUT", &path)?;

        Self::read_group(client, id).await
    }

    /// Delete the group. A missing group is reported as an error.
    pub async fn delete_group(client: &dyn HttpClient, id: &GroupId) -> Result<()> {
        let path = id.api_path();
        client
            .delete(&path)
            .await?
            .error_for_status("DELETE", &path)?;
        Ok(())
    }
}

fn into_value(state: Option<GroupState>) -> DynamicValue {
    state.map(|s| s.to_value()).unwrap_or(DynamicValue::Null)
}

#[async_trait::async_trait]
impl Resource for GroupResource {
    fn type_name() -> &'static str {
        TYPE_NAME
    }

    fn schema() -> Schema {
        schema::group_schema()
    }

    fn validate(config: &DynamicValue) -> Vec<String> {
        validate_config(config)
    }

    async fn create(client: &dyn HttpClient, config: &DynamicValue) -> Result<DynamicValue> {
        let config = GroupConfig::from_value(config)?;
        Ok(into_value(Self::create_group(client, &config).await?))
    }

    async fn read(client: &dyn HttpClient, state: &DynamicValue) -> Result<DynamicValue> {
        if state.is_null() {
            return Ok(DynamicValue::Null);
        }
        let id = state_identity(state)?;
        Ok(into_value(Self::read_group(client, &id).await?))
    }

    async fn update(client: &dyn HttpClient, state: &DynamicValue, config: &DynamicValue) -> Result<DynamicValue> {
        let id = state_identity(state)?;
        let config = GroupConfig::from_value(config)?;
        Ok(into_value(Self::update_group(client, &id, &config).await?))
    }

    async fn delete(client: &dyn HttpClient, state: &DynamicValue) -> Result<()> {
        let id = state_identity(state)?;
        Self::delete_group(client, &id).await
    }

    async fn import(client: &dyn HttpClient, id: &str) -> Result<DynamicValue> {
        let id: GroupId = id.parse()?;
        Ok(into_value(Self::read_group(client, &id).await?))
    }
}
