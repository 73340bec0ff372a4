//! Cache store adapters for wikiproxy
//!
//! The search service talks to a [`CacheStore`] and never to a concrete
//! backend. Two implementations exist: [`RedisStore`] for the shared
//! deployment and [`MemoryStore`] for single-process runs and tests.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use wikiproxy_core::{CacheBackend, CacheSettings, Result};

mod memory;
mod redis_store;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

/// An expiring string key-value store
///
/// Implementations report transport failures as errors and leave the
/// fail-open policy to the caller. A key holding an empty string is reported
/// as absent; a value that is not text is reported as
/// [`ProxyError::CacheCorruption`](wikiproxy_core::ProxyError::CacheCorruption).
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read `key`; `Ok(None)` when absent, expired or empty
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, expiring after `ttl`
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Check that the backend answers
    async fn ping(&self) -> Result<bool>;

    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;
}

/// Thread-safe shared cache store
pub type SharedCacheStore = Arc<dyn CacheStore>;

/// Builds the store selected by `settings.backend`
///
/// Redis connections are established lazily on first use, so this succeeds
/// while the Redis server is still down.
pub fn create_store(settings: &CacheSettings) -> Result<SharedCacheStore> {
    let store: SharedCacheStore = match settings.backend {
        CacheBackend::Redis => Arc::new(RedisStore::new(settings)?),
        CacheBackend::Memory => Arc::new(MemoryStore::new(settings.max_capacity)),
    };

    tracing::info!(backend = store.backend(), "Cache store configured");
    Ok(store)
}

/// Treat empty stored strings the same as missing keys
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_filters_empty() {
        assert_eq!(present(None), None);
        assert_eq!(present(Some(String::new())), None);
        assert_eq!(present(Some("{}".to_string())), Some("{}".to_string()));
    }

    #[tokio::test]
    async fn test_create_memory_store() {
        let settings = CacheSettings {
            backend: CacheBackend::Memory,
            ..Default::default()
        };
        let store = create_store(&settings).unwrap();
        assert_eq!(store.backend(), "memory");
        assert!(store.ping().await.unwrap());
    }

    #[tokio::test]
    async fn test_create_redis_store_is_lazy() {
        let settings = CacheSettings {
            url: "redis://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let store = create_store(&settings).unwrap();
        assert_eq!(store.backend(), "redis");
    }

    #[test]
    fn test_create_redis_store_rejects_bad_url() {
        let settings = CacheSettings {
            url: "definitely not a url".to_string(),
            ..Default::default()
        };
        assert!(create_store(&settings).is_err());
    }
}
