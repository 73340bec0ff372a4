//! Upstream content API client
//!
//! One GET per call, no retries. Every way the upstream can fail, including a
//! body that is not a JSON object, comes back as [`ProxyError::UpstreamFetch`].

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use url::Url;
use wikiproxy_core::{JsonObject, ProxyError, Result, UpstreamSettings};

/// Fetches JSON documents from the content API
#[async_trait]
pub trait ContentClient: Send + Sync {
    /// GET `url` and return its JSON object body
    async fn fetch(&self, url: &Url) -> Result<JsonObject>;
}

/// Thread-safe shared content client
pub type SharedContentClient = Arc<dyn ContentClient>;

/// reqwest-based client for a MediaWiki `api.php` endpoint
#[derive(Debug, Clone)]
pub struct WikiClient {
    client: reqwest::Client,
}

impl WikiClient {
    /// Create a new client
    pub fn new(settings: &UpstreamSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ProxyError::validation(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ContentClient for WikiClient {
    async fn fetch(&self, url: &Url) -> Result<JsonObject> {
        let started = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error("request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::upstream_status(
                status.as_u16(),
                format!("upstream returned {}", status),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| transport_error("failed to read JSON body", e))?;

        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Upstream fetch completed"
        );

        match body {
            Value::Object(object) => Ok(object),
            other => Err(ProxyError::upstream(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn transport_error(context: &str, e: reqwest::Error) -> ProxyError {
    if e.is_timeout() {
        ProxyError::upstream_timeout(format!("{}: {}", context, e))
    } else {
        ProxyError::upstream(format!("{}: {}", context, e))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
