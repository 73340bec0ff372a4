//! HTTP handlers for the wikiproxy server

use crate::search::SearchService;
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wikiproxy_core::{ProxyConfig, Result};
use wikiproxy_infra::{create_store, SharedCacheStore, SharedContentClient, WikiClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
}

impl AppState {
    /// Wire the configured cache store and content client
    ///
    /// Does not contact Redis or the upstream; both connect on first use.
    pub fn from_config(config: &ProxyConfig) -> Result<Self> {
        let store = create_store(&config.cache)?;
        let upstream: SharedContentClient = Arc::new(WikiClient::new(&config.upstream)?);

        Self::with_components(config, store, upstream)
    }

    /// Create application state from injected components (for testing)
    pub fn with_components(
        config: &ProxyConfig,
        store: SharedCacheStore,
        upstream: SharedContentClient,
    ) -> Result<Self> {
        let search = SearchService::from_config(config, store, upstream)?;

        Ok(Self {
            search: Arc::new(search),
        })
    }
}

/// Handler for server health check
///
/// Always answers 200; an unreachable cache only degrades the status since
/// searches still succeed through the upstream.
pub async fn handle_health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let store = state.search.store();
    let reachable = match store.ping().await {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(backend = store.backend(), error = %e, "Cache health check failed");
            false
        }
    };

    Json(HealthCheckResponse {
        status: if reachable { "healthy" } else { "degraded" }.to_string(),
        version: crate::VERSION.to_string(),
        timestamp: Utc::now(),
        cache: CacheStatus {
            backend: store.backend().to_string(),
            reachable,
        },
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub cache: CacheStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStatus {
    pub backend: String,
    pub reachable: bool,
}
