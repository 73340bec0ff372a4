//! Error handling for the wikiproxy core library

use thiserror::Error;

/// Result type alias for wikiproxy operations
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Main error type for wikiproxy operations
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The `query` parameter was absent or blank after trimming
    #[error("Missing search query: the `query` parameter must be a non-empty string")]
    MissingQuery,

    /// Cache store unreachable or protocol failure on read
    #[error("Cache read error: {message}")]
    CacheRead { message: String },

    /// A stored value is not a well-formed JSON object
    #[error("Corrupt cache entry under '{key}': {message}")]
    CacheCorruption { key: String, message: String },

    /// Cache store unreachable or protocol failure on write
    #[error("Cache write error: {message}")]
    CacheWrite { message: String },

    /// Transport failure, timeout, non-success status or unusable body from upstream
    #[error("Upstream fetch error: {message}")]
    UpstreamFetch {
        message: String,
        status: Option<u16>,
        timed_out: bool,
    },

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Network connectivity errors outside the request path (bind, serve)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl ProxyError {
    /// Create a cache read error
    pub fn cache_read<S: Into<String>>(message: S) -> Self {
        Self::CacheRead {
            message: message.into(),
        }
    }

    /// Create a cache corruption error for the given key
    pub fn cache_corruption<K: Into<String>, S: Into<String>>(key: K, message: S) -> Self {
        Self::CacheCorruption {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a cache write error
    pub fn cache_write<S: Into<String>>(message: S) -> Self {
        Self::CacheWrite {
            message: message.into(),
        }
    }

    /// Create an upstream error without an HTTP status
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::UpstreamFetch {
            message: message.into(),
            status: None,
            timed_out: false,
        }
    }

    /// Create an upstream error for a non-success HTTP status
    pub fn upstream_status<S: Into<String>>(status: u16, message: S) -> Self {
        Self::UpstreamFetch {
            message: message.into(),
            status: Some(status),
            timed_out: false,
        }
    }

    /// Create an upstream timeout error
    pub fn upstream_timeout<S: Into<String>>(message: S) -> Self {
        Self::UpstreamFetch {
            message: message.into(),
            status: None,
            timed_out: true,
        }
    }

    /// Create a network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the caller sent a bad request
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingQuery | Self::Validation { .. })
    }

    /// Whether the error came from the upstream content API
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamFetch { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingQuery | Self::Validation { .. } => ErrorCategory::Validation,
            Self::CacheRead { .. } | Self::CacheWrite { .. } => ErrorCategory::Cache,
            Self::CacheCorruption { .. } => ErrorCategory::Corruption,
            Self::UpstreamFetch { .. } => ErrorCategory::Upstream,
            Self::Config(_) | Self::Url(_) => ErrorCategory::Configuration,
            Self::Network { .. } => ErrorCategory::Network,
        }
    }
}

/// Error categories for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    Cache,
    Corruption,
    Upstream,
    Configuration,
    Network,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::Cache => "cache",
            Self::Corruption => "corruption",
            Self::Upstream => "upstream",
            Self::Configuration => "configuration",
            Self::Network => "network",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_query_is_client_error() {
        let err = ProxyError::MissingQuery;
        assert!(err.is_client_error());
        assert!(!err.is_upstream());
        assert_eq!(err.category(), ErrorCategory::Validation);

        assert!(ProxyError::validation("bad input").is_client_error());
        assert!(!ProxyError::cache_corruption("search:x", "bad json").is_client_error());
        assert!(!ProxyError::upstream("refused").is_client_error());
    }

    #[test]
    fn test_upstream_constructors() {
        let err = ProxyError::upstream_status(503, "service unavailable");
        match err {
            ProxyError::UpstreamFetch {
                status, timed_out, ..
            } => {
                assert_eq!(status, Some(503));
                assert!(!timed_out);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = ProxyError::upstream_timeout("deadline elapsed");
        assert!(err.is_upstream());
        assert!(matches!(
            err,
            ProxyError::UpstreamFetch {
                timed_out: true,
                ..
            }
        ));
    }

    #[test]
    fn test_cache_errors_are_distinct() {
        let read = ProxyError::cache_read("connection refused");
        let corrupt = ProxyError::cache_corruption("search:OpenAI", "expected value at line 1");

        assert_eq!(read.category(), ErrorCategory::Cache);
        assert_eq!(corrupt.category(), ErrorCategory::Corruption);
        assert_eq!(
            corrupt.to_string(),
            "Corrupt cache entry under 'search:OpenAI': expected value at line 1"
        );
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Upstream.to_string(), "upstream");
        assert_eq!(ErrorCategory::Configuration.to_string(), "configuration");
    }
}
