//! Configuration types for the wikiproxy core library
//!
//! Settings are layered with the `config` crate: built-in defaults, an
//! optional `wikiproxy.{yaml,toml,json}` in the working directory, an optional
//! explicit file, then `WIKIPROXY_<SECTION>__<KEY>` environment variables.

use crate::{ProxyError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

const LOCAL_CONFIG_BASENAME: &str = "wikiproxy";
const ENV_PREFIX: &str = "WIKIPROXY";
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// HTTP listener settings
    pub server: ServerSettings,
    /// Cache store settings
    pub cache: CacheSettings,
    /// Upstream content API settings
    pub upstream: UpstreamSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
    /// Maximum accepted request body in bytes
    pub max_request_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_enabled: false,
            max_request_size: 64 * 1024,
        }
    }
}

impl ServerSettings {
    /// `host:port` string the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which cache store implementation backs the proxy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Shared Redis instance
    #[default]
    Redis,
    /// In-process store, lost on restart and not shared between instances
    Memory,
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redis => write!(f, "redis"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Cache store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    /// Redis connection URL
    pub url: String,
    /// Lifetime of a cache entry in seconds
    pub ttl_seconds: u64,
    /// Upper bound on a single store command in milliseconds
    pub operation_timeout_ms: u64,
    /// Entry limit for the memory backend
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            url: "redis://127.0.0.1:6379".to_string(),
            ttl_seconds: 3600,
            operation_timeout_ms: 1000,
            max_capacity: 10_000,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

/// Upstream content API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    /// MediaWiki `api.php` endpoint
    pub endpoint: String,
    /// User-Agent sent with every upstream request
    pub user_agent: String,
    /// Request timeout in seconds; unset means no client-side timeout
    pub timeout_seconds: Option<u64>,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://en.wikipedia.org/w/api.php".to_string(),
            user_agent: format!("wikiproxy/{}", crate::VERSION),
            timeout_seconds: None,
        }
    }
}

impl UpstreamSettings {
    /// Parsed endpoint URL
    pub fn endpoint_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.endpoint)?)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ProxyConfig {
    /// Load configuration from the default sources plus an optional file
    ///
    /// An explicitly named file must exist; the working-directory
    /// `wikiproxy.*` file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            Config::builder().add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        tracing::debug!(backend = %config.cache.backend, "Configuration loaded");
        Ok(config)
    }

    /// Serialize the effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| ProxyError::validation(format!("Failed to render configuration: {}", e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(ProxyError::validation("Server host cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(ProxyError::validation("Server port cannot be 0"));
        }

        if self.server.max_request_size == 0 {
            return Err(ProxyError::validation("Max request size cannot be 0"));
        }

        if self.cache.ttl_seconds == 0 {
            return Err(ProxyError::validation("Cache TTL must be at least 1 second"));
        }

        if self.cache.operation_timeout_ms == 0 {
            return Err(ProxyError::validation(
                "Cache operation timeout cannot be 0",
            ));
        }

        match self.cache.backend {
            CacheBackend::Redis => {
                let url = Url::parse(&self.cache.url).map_err(|e| {
                    ProxyError::validation(format!("Invalid cache URL '{}': {}", self.cache.url, e))
                })?;
                if !matches!(url.scheme(), "redis" | "rediss" | "redis+unix" | "unix") {
                    return Err(ProxyError::validation(format!(
                        "Cache URL must use a redis scheme, got '{}'",
                        url.scheme()
                    )));
                }
            }
            CacheBackend::Memory => {
                if self.cache.max_capacity == 0 {
                    return Err(ProxyError::validation(
                        "Memory cache capacity cannot be 0",
                    ));
                }
            }
        }

        let endpoint = self.upstream.endpoint_url().map_err(|e| {
            ProxyError::validation(format!(
                "Invalid upstream endpoint '{}': {}",
                self.upstream.endpoint, e
            ))
        })?;
        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(ProxyError::validation(
                "Upstream endpoint must use http or https scheme",
            ));
        }

        if self.upstream.user_agent.trim().is_empty() {
            return Err(ProxyError::validation("Upstream user agent cannot be empty"));
        }

        if self.upstream.timeout_seconds == Some(0) {
            return Err(ProxyError::validation(
                "Upstream timeout cannot be 0; leave it unset to disable",
            ));
        }

        let level = self.logging.level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ProxyError::validation(format!(
                "Invalid log level: {}. Valid levels: {}",
                self.logging.level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}
