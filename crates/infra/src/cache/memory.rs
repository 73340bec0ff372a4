//! In-process cache store using Moka
//!
//! Not shared between processes and lost on restart. Each entry keeps the TTL
//! it was written with.

use super::{present, CacheStore};
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};
use tracing::debug;
use wikiproxy_core::Result;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expires every entry after the TTL it was last written with
struct WrittenTtl;

impl Expiry<String, Entry> for WrittenTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Moka-backed [`CacheStore`]
#[derive(Clone)]
pub struct MemoryStore {
    cache: Cache<String, Entry>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("max_capacity", &self.cache.policy().max_capacity())
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl MemoryStore {
    /// Create a store holding at most `max_capacity` entries
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(WrittenTtl)
            .build();

        debug!(max_capacity = max_capacity, "Memory cache store created");
        Self { cache }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = present(self.cache.get(key).await.map(|entry| entry.value));
        debug!(key = key, hit = value.is_some(), "Memory GET");
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let entry = Entry {
            value: value.to_string(),
            ttl,
        };
        self.cache.insert(key.to_string(), entry).await;
        debug!(key = key, ttl_ms = ttl.as_millis() as u64, "Memory SET");
        Ok(())
    }

    async fn ping(&self) -> Result<bool> {
        Ok(true)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
