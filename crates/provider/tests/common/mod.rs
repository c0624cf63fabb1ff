//! Scripted in-memory HTTP client shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;

use parking_lot::Mutex;

use bitbucket_provider::{HttpClient, HttpResponse, Result};

/// A request the fake received
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Vec<u8>>,
}

impl Call {
    pub fn body_str(&self) -> &str {
        std::str::from_utf8(self.body.as_deref().unwrap_or_default()).unwrap()
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(self.body.as_deref().unwrap_or_default()).unwrap()
    }
}

/// Answers requests from a queue, in order, and records every call
#[derive(Default)]
pub struct FakeClient {
    responses: Mutex<VecDeque<HttpResponse>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses.lock().push_back(HttpResponse::new(status, body));
        self
    }

    pub fn respond_empty(self, status: u16) -> Self {
        self.responses.lock().push_back(HttpResponse::empty(status));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, method: &'static str, path: &str, body: Option<Vec<u8>>) -> HttpResponse {
        self.calls.lock().push(Call {
            method,
            path: path.to_string(),
            body,
        });
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response for {method} {path}"))
    }
}

#[async_trait::async_trait]
impl HttpClient for FakeClient {
    async fn get(&self, path: &str) -> Result<HttpResponse> {
        Ok(self.record("GET", path, None))
    }

    async fn put(&self, path: &str, body: Vec<u8>) -> Result<HttpResponse> {
        Ok(self.record("PUT", path, Some(body)))
    }

    async fn delete(&self, path: &str) -> Result<HttpResponse> {
        Ok(self.record("DELETE", path, None))
    }

    async fn post_form(&self, path: &str, body: Vec<u8>) -> Result<HttpResponse> {
        Ok(self.record("POST", path, Some(body)))
    }
}

pub const ENGINEERS: &str = r#"{"slug":"engineers","name":"Engineers"}"#;
