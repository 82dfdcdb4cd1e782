#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use userbase_api::config::AppConfig;
use userbase_api::database::MemoryStore;

/// The full router over a fresh memory store, driven in-process
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(&AppConfig::development())
    }

    pub fn with_config(config: &AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let router = userbase_api::app(store.clone(), config);
        Self { store, router }
    }

    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    /// Send a body verbatim, for malformed payloads
    pub async fn call_raw(&self, method: Method, uri: &str, body: &'static str) -> Result<(StatusCode, Value)> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))?;
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::DELETE, uri, None).await
    }

    /// Create through the API and return the new identifier
    pub async fn create(&self, uri: &str, body: Value, primary_key: &str) -> Result<i64> {
        let (status, body) = self.post(uri, body).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create at {} returned {}: {}", uri, status, body);
        body["results"][primary_key]
            .as_i64()
            .with_context(|| format!("missing {} in {}", primary_key, body))
    }
}

pub fn assert_success(body: &Value) {
    assert_eq!(body["success"], Value::Bool(true), "success flag false or missing: {}", body);
    assert!(body["message"].is_string(), "missing message: {}", body);
}

pub fn assert_failure(body: &Value) {
    assert_eq!(body["success"], Value::Bool(false), "success flag true or missing: {}", body);
    assert!(body["message"].is_string(), "missing message: {}", body);
    assert!(body.get("results").is_none(), "failure carries results: {}", body);
}
