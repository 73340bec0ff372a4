//! Redis-backed cache store
//!
//! Uses `redis::aio::ConnectionManager` for a multiplexed connection with
//! automatic reconnection. The manager is created on first use; a failed
//! attempt leaves it unset so the next operation tries again.

use super::{present, CacheStore};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;
use wikiproxy_core::{CacheSettings, ProxyError, Result};

/// Cache store speaking `GET`/`SETEX` to a single Redis instance
pub struct RedisStore {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
    operation_timeout: Duration,
    display_url: String,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("url", &self.display_url)
            .field("connected", &self.connection.initialized())
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

impl RedisStore {
    /// Create a store for `settings.url` without connecting
    pub fn new(settings: &CacheSettings) -> Result<Self> {
        let display_url = redact_url(&settings.url);
        let client = redis::Client::open(settings.url.as_str()).map_err(|e| {
            ProxyError::validation(format!("Invalid Redis URL '{}': {}", display_url, e))
        })?;

        debug!(url = %display_url, "Redis cache store created");

        Ok(Self {
            client,
            connection: OnceCell::new(),
            operation_timeout: settings.operation_timeout(),
            display_url,
        })
    }

    async fn connection(&self) -> redis::RedisResult<ConnectionManager> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let manager = ConnectionManager::new(self.client.clone()).await?;
                debug!(url = %self.display_url, "Redis connection established");
                Ok::<_, redis::RedisError>(manager)
            })
            .await?;
        Ok(manager.clone())
    }

    /// Run one Redis round trip (including a pending connect) under the
    /// operation timeout
    async fn bounded<T, F>(&self, command: &str, operation: F) -> std::result::Result<T, String>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, operation).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(format!("Redis {} failed: {}", command, e)),
            Err(_) => Err(format!(
                "Redis {} timed out after {}ms",
                command,
                self.operation_timeout.as_millis()
            )),
        }
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .bounded("GET", async {
                let mut conn = self.connection().await?;
                let value: Option<Vec<u8>> =
                    redis::cmd("GET").arg(key).query_async(&mut conn).await?;
                Ok::<_, redis::RedisError>(value)
            })
            .await
            .map_err(ProxyError::cache_read)?;

        let value = present(value.map(|bytes| decode_utf8(key, bytes)).transpose()?);
        debug!(key = key, hit = value.is_some(), "Redis GET");
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let ttl_seconds = ttl.as_secs().max(1);

        self.bounded("SETEX", async {
            let mut conn = self.connection().await?;
            let _: () = redis::cmd("SETEX")
                .arg(key)
                .arg(ttl_seconds)
                .arg(value)
                .query_async(&mut conn)
                .await?;
            Ok::<_, redis::RedisError>(())
        })
        .await
        .map_err(ProxyError::cache_write)?;

        debug!(key = key, ttl_seconds = ttl_seconds, "Redis SETEX");
        Ok(())
    }

    async fn ping(&self) -> Result<bool> {
        let pong = self
            .bounded("PING", async {
                let mut conn = self.connection().await?;
                let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
                Ok::<_, redis::RedisError>(pong)
            })
            .await
            .map_err(ProxyError::cache_read)?;

        Ok(pong == "PONG")
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// A stored value that is not UTF-8 cannot be JSON; report it as corruption
/// rather than a transport failure
fn decode_utf8(key: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        ProxyError::cache_corruption(key, format!("stored value is not UTF-8: {}", e))
    })
}

/// Mask the password of a Redis URL for logging
fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            // set_password only fails for cannot-be-a-base URLs, which carry no password
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        _ => raw.to_string(),
    }
}
