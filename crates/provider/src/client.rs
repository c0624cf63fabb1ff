//! Client for communicating with the Bitbucket REST API

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{Error, Result};

/// Raw answer from the API. Non-2xx statuses are not errors at this level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Option<Vec<u8>>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: Some(body.into()),
        }
    }

    /// Response without any payload
    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Convert a non-2xx response into `Error::Remote`
    pub fn error_for_status(self, method: &'static str, path: &str) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let body = self
            .body
            .as_deref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default();
        Err(Error::Remote {
            method,
            path: path.to_string(),
            status: self.status,
            body,
        })
    }

    /// Payload bytes, treating a zero-length body as absent
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref().filter(|b| !b.is_empty())
    }
}

/// HTTP operations the resources need. Paths are relative to the API root.
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, path: &str) -> Result<HttpResponse>;

    /// PUT a JSON document
    async fn put(&self, path: &str, body: Vec<u8>) -> Result<HttpResponse>;

    async fn delete(&self, path: &str) -> Result<HttpResponse>;

    /// POST an `application/x-www-form-urlencoded` body
    async fn post_form(&self, path: &str, body: Vec<u8>) -> Result<HttpResponse>;
}

/// reqwest-backed client wrapper carrying base URL and credentials
pub struct BitbucketClient {
    http: reqwest::Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl BitbucketClient {
    /// Build a client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.normalized_base_url())
            .map_err(|e| Error::InvalidConfig(format!("invalid base_url: {}", e)))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::InvalidConfig(format!("invalid request path {}: {}", path, e)))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<(&'static str, Vec<u8>)>,
    ) -> Result<HttpResponse> {
        let url = self.url(path)?;
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, url);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }
        if let Some((content_type, bytes)) = body {
            request = request.header(CONTENT_TYPE, content_type).body(bytes);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        Ok(HttpResponse {
            status,
            body: if bytes.is_empty() {
                None
            } else {
                Some(bytes.to_vec())
            },
        })
    }
}

#[async_trait::async_trait]
impl HttpClient for BitbucketClient {
    async fn get(&self, path: &str) -> Result<HttpResponse> {
        self.send(Method::GET, path, None).await
    }

    async fn put(&self, path: &str, body: Vec<u8>) -> Result<HttpResponse> {
        self.send(Method::PUT, path, Some(("application/json", body)))
            .await
    }

    async fn delete(&self, path: &str) -> Result<HttpResponse> {
        self.send(Method::DELETE, path, None).await
    }

    async fn post_form(&self, path: &str, body: Vec<u8>) -> Result<HttpResponse> {
        self.send(
            Method::POST,
            path,
            Some(("application/x-www-form-urlencoded", body)),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_for_status() {
        let ok = HttpResponse::new(200, "{}");
        assert!(ok.error_for_status("GET", "1.0/groups/acme").is_ok());

        let err = HttpResponse::new(403, "forbidden")
            .error_for_status("DELETE", "1.0/groups/acme/eng")
            .unwrap_err();
        match err {
            Error::Remote { method, path, status, body } => {
                assert_eq!(method, "DELETE");
                assert_eq!(path, "1.0/groups/acme/eng");
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_body_is_absent() {
        assert!(HttpResponse::new(200, Vec::new()).body_bytes().is_none());
        assert!(HttpResponse::empty(200).body_bytes().is_none());
        assert_eq!(HttpResponse::new(200, "x").body_bytes(), Some(&b"x"[..]));
    }

    #[test]
    fn test_paths_join_under_base() {
        let config = ProviderConfig {
            base_url: "https://bitbucket.example.com/api".to_string(),
            ..Default::default()
        };
        let client = BitbucketClient::new(&config).unwrap();
        assert_eq!(
            client.url("1.0/groups/acme").unwrap().as_str(),
            "https://bitbucket.example.com/api/1.0/groups/acme"
        );
        assert_eq!(
            client.url("/1.0/groups/acme/eng/").unwrap().as_str(),
            "https://bitbucket.example.com/api/1.0/groups/acme/eng/"
        );
    }
}
