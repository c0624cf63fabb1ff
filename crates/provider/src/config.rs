//! Provider configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Default Bitbucket Cloud API root. Resource paths carry their own API version.
pub const DEFAULT_BASE_URL: &str = "https://api.bitbucket.org/";

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API root every request path is joined onto
    pub base_url: String,

    /// Username for HTTP basic auth
    pub username: Option<String>,

    /// App password for HTTP basic auth
    pub password: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: None,
            password: None,
            timeout_secs: 60,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `BITBUCKET_USERNAME`, `BITBUCKET_PASSWORD` and `BITBUCKET_BASE_URL`
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(username) = lookup("BITBUCKET_USERNAME") {
            self.username = Some(username);
        }
        if let Some(password) = lookup("BITBUCKET_PASSWORD") {
            self.password = Some(password);
        }
        if let Some(base_url) = lookup("BITBUCKET_BASE_URL") {
            self.base_url = base_url;
        }
        self
    }

    /// Check the configuration can produce a working client
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::InvalidConfig("base_url must not be empty".to_string()));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(Error::InvalidConfig(
                "password is set but username is missing".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL with a guaranteed trailing slash so relative paths join under it
    pub fn normalized_base_url(&self) -> String {
        if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProviderConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ProviderConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provider.toml");
        std::fs::write(
            &path,
            "base_url = \"http://localhost:8080\"\nusername = \"ci-bot\"\n",
        )
        .unwrap();

        let config = ProviderConfig::load(&path).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.username.as_deref(), Some("ci-bot"));
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.normalized_base_url(), "http://localhost:8080/");
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provider.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();

        assert!(matches!(ProviderConfig::load(&path), Err(Error::ConfigFile(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("BITBUCKET_USERNAME", "alice"),
            ("BITBUCKET_PASSWORD", "app-password"),
        ]
        .into_iter()
        .collect();

        let config = ProviderConfig::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.password.as_deref(), Some("app-password"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_password_without_username_is_rejected() {
        let config = ProviderConfig {
            password: Some("secret".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
