//! Terraform Schema Definitions
//!
//! Describes the provider configuration block and each resource's attributes.

use serde::Serialize;

/// Attribute value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Bool,
}

/// A single schema attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: AttributeType,
    pub description: &'static str,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    /// Changing the value destroys and recreates the resource
    pub force_new: bool,
    /// Allowed values for string attributes; empty means unrestricted
    #[serde(skip_serializing_if = "is_unrestricted")]
    pub allowed_values: &'static [&'static str],
}

fn is_unrestricted(values: &&'static [&'static str]) -> bool {
    values.is_empty()
}

impl Attribute {
    fn new(name: &'static str, ty: AttributeType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            description,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            force_new: false,
            allowed_values: &[],
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.allowed_values = values;
        self
    }
}

/// Schema of a resource or of the provider block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub version: i64,
    pub description: &'static str,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Permission levels accepted by the group API
pub const GROUP_PERMISSIONS: &[&str] = &["read", "write", "admin"];

/// Provider configuration schema
pub fn provider_schema() -> Schema {
    Schema {
        version: 0,
        description: "Bitbucket Cloud provider",
        attributes: vec![
            Attribute::new("username", AttributeType::String, "Username for basic auth")
                .optional(),
            Attribute::new("password", AttributeType::String, "App password for basic auth")
                .optional()
                .sensitive(),
            Attribute::new("base_url", AttributeType::String, "API root URL").optional(),
        ],
    }
}

/// Group resource schema
pub fn group_schema() -> Schema {
    Schema {
        version: 0,
        description: "A user group within a Bitbucket workspace",
        attributes: vec![
            Attribute::new("id", AttributeType::String, "workspace/slug identifier").computed(),
            Attribute::new("workspace", AttributeType::String, "Workspace owning the group")
                .required()
                .force_new(),
            Attribute::new("name", AttributeType::String, "Group display name").required(),
            Attribute::new("slug", AttributeType::String, "Server-assigned group slug").computed(),
            Attribute::new("auto_add", AttributeType::Bool, "Add new workspace members automatically")
                .optional(),
            Attribute::new("permission", AttributeType::String, "Repository permission granted")
                .optional()
                .one_of(GROUP_PERMISSIONS),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_schema_flags() {
        let schema = group_schema();
        let workspace = schema.attribute("workspace").unwrap();
        assert!(workspace.required && workspace.force_new);

        let slug = schema.attribute("slug").unwrap();
        assert!(slug.computed && !slug.optional);

        let permission = schema.attribute("permission").unwrap();
        assert_eq!(permission.allowed_values, &["read", "write", "admin"]);
    }

    #[test]
    fn test_schema_json() {
        let json = serde_json::to_value(group_schema()).unwrap();
        assert_eq!(json["attributes"][4]["name"], "auto_add");
        assert_eq!(json["attributes"][4]["type"], "bool");
        assert!(json["attributes"][4].get("allowed_values").is_none());
        assert!(provider_schema().attribute("password").unwrap().sensitive);
    }
}
