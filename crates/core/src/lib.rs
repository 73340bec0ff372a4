//! wikiproxy Core Library
//!
//! Shared building blocks for the wikiproxy read-through cache: the error
//! taxonomy, layered configuration, search queries with their cache keys and
//! upstream URLs, and the provenance tagging applied to result payloads.

pub mod config;
pub mod error;
pub mod payload;
pub mod query;

// Re-export commonly used types
pub use config::{
    CacheBackend, CacheSettings, LoggingSettings, ProxyConfig, ServerSettings, UpstreamSettings,
};
pub use error::{ErrorCategory, ProxyError, Result};
pub use payload::{with_source, JsonObject, Source, SOURCE_FIELD};
pub use query::{SearchQuery, CACHE_NAMESPACE};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = "wikiproxy";

/// Get version information
pub fn version_info() -> String {
    format!("{} v{}", NAME, VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert!(info.starts_with("wikiproxy v"));
        assert!(info.contains(VERSION));
    }
}
