//! Cache-or-fetch search service
//!
//! One call per inbound request: read the cache, fall back to the upstream
//! content API on a miss, and write the fetched document back in a
//! background task. Cache failures never fail a request; a corrupt cache
//! entry or an upstream failure does.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;
use wikiproxy_core::{
    with_source, JsonObject, ProxyConfig, ProxyError, Result, SearchQuery, Source,
};
use wikiproxy_infra::{SharedCacheStore, SharedContentClient};

/// Result of a single lookup
#[derive(Debug)]
pub struct SearchOutcome {
    /// Payload returned to the caller, with its `source` field set
    pub payload: JsonObject,
    /// Where the payload came from
    pub source: Source,
    /// Background cache write started by a miss, if any
    pub cache_write: Option<JoinHandle<()>>,
}

/// Read-through cache in front of the content API
pub struct SearchService {
    store: SharedCacheStore,
    upstream: SharedContentClient,
    endpoint: Url,
    ttl: Duration,
}

impl SearchService {
    /// Create a service over an injected store and client
    pub fn new(
        store: SharedCacheStore,
        upstream: SharedContentClient,
        endpoint: Url,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            upstream,
            endpoint,
            ttl,
        }
    }

    /// Create a service using the endpoint and TTL from `config`
    pub fn from_config(
        config: &ProxyConfig,
        store: SharedCacheStore,
        upstream: SharedContentClient,
    ) -> Result<Self> {
        Ok(Self::new(
            store,
            upstream,
            config.upstream.endpoint_url()?,
            config.cache.ttl(),
        ))
    }

    /// The shared cache store, for health checks
    pub fn store(&self) -> &SharedCacheStore {
        &self.store
    }

    /// Serve `raw_query`, leaving any cache write running in the background
    pub async fn handle(&self, raw_query: Option<&str>) -> Result<JsonObject> {
        self.lookup(raw_query).await.map(|outcome| outcome.payload)
    }

    /// Serve `raw_query` and hand back the pending cache write
    pub async fn lookup(&self, raw_query: Option<&str>) -> Result<SearchOutcome> {
        let query = SearchQuery::parse(raw_query)?;
        let key = query.cache_key();

        if let Some(cached) = self.read_cache(&key).await? {
            info!(key = %key, "Served from cache");
            return Ok(SearchOutcome {
                payload: cached,
                source: Source::Cache,
                cache_write: None,
            });
        }

        let url = query.page_url(&self.endpoint);
        let body = self.upstream.fetch(&url).await.map_err(|e| {
            warn!(key = %key, url = %url, error = %e, "Upstream fetch failed");
            e
        })?;

        let cache_write =
            self.spawn_cache_write(key.clone(), with_source(&body, Source::Cache));
        info!(key = %key, "Served from upstream");

        Ok(SearchOutcome {
            payload: with_source(&body, Source::Upstream),
            source: Source::Upstream,
            cache_write,
        })
    }

    /// Cache lookup that fails open on store errors other than corruption
    async fn read_cache(&self, key: &str) -> Result<Option<JsonObject>> {
        match self.store.get(key).await {
            Ok(Some(raw)) => decode_entry(key, &raw).map(Some),
            Ok(None) => {
                debug!(key = key, "Cache miss");
                Ok(None)
            }
            Err(e @ ProxyError::CacheCorruption { .. }) => Err(e),
            Err(e) => {
                warn!(
                    key = key,
                    backend = self.store.backend(),
                    error = %e,
                    "Cache read failed, falling back to upstream"
                );
                Ok(None)
            }
        }
    }

    fn spawn_cache_write(&self, key: String, payload: JsonObject) -> Option<JoinHandle<()>> {
        let value = match serde_json::to_string(&payload) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize cache entry");
                return None;
            }
        };

        let store = Arc::clone(&self.store);
        let ttl = self.ttl;
        Some(tokio::spawn(async move {
            match store.set_with_ttl(&key, &value, ttl).await {
                Ok(()) => {
                    debug!(key = %key, ttl_seconds = ttl.as_secs(), "Cache entry written")
                }
                Err(e) => warn!(
                    key = %key,
                    backend = store.backend(),
                    error = %e,
                    "Cache write failed"
                ),
            }
        }))
    }
}

/// Parse a stored entry; anything but a JSON object is corruption
fn decode_entry(key: &str, raw: &str) -> Result<JsonObject> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(ProxyError::cache_corruption(
            key,
            "stored value is not a JSON object",
        )),
        Err(e) => Err(ProxyError::cache_corruption(key, e.to_string())),
    }
}
