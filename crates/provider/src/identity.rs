//! Composite `workspace/slug` identity for groups

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Externally visible key of a group resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupId {
    workspace: String,
    slug: String,
}

impl GroupId {
    /// Both segments must be non-empty and free of `/`
    pub fn new(workspace: impl Into<String>, slug: impl Into<String>) -> Result<Self, Error> {
        let workspace = workspace.into();
        let slug = slug.into();
        if !valid_segment(&workspace) || !valid_segment(&slug) {
            return Err(Error::InvalidIdentity(format!("{}/{}", workspace, slug)));
        }
        Ok(Self { workspace, slug })
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// API path of this group, without trailing slash
    pub fn api_path(&self) -> String {
        format!("{}/{}", workspace_path(&self.workspace), urlencoding::encode(&self.slug))
    }
}

/// Groups collection path of a workspace, segments percent-encoded
pub fn workspace_path(workspace: &str) -> String {
    format!("1.0/groups/{}", urlencoding::encode(workspace))
}

/// Non-empty and free of `/`
pub fn valid_segment(s: &str) -> bool {
    !s.is_empty() && !s.contains('/')
}

impl FromStr for GroupId {
    type Err = Error;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = id.split('/').collect();
        match parts.as_slice() {
            [workspace, slug] if !workspace.is_empty() && !slug.is_empty() => Ok(Self {
                workspace: workspace.to_string(),
                slug: slug.to_string(),
            }),
            _ => Err(Error::InvalidIdentity(id.to_string())),
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.workspace, self.slug)
    }
}
