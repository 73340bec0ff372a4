//! wikiproxy Infrastructure Library
//!
//! Adapters to the outside world: the Redis and in-process cache stores, the
//! MediaWiki content client and the logging setup.

pub mod cache;
pub mod logger;
pub mod upstream;

pub use cache::{create_store, CacheStore, MemoryStore, RedisStore, SharedCacheStore};
pub use logger::{init_logger, init_test_logger, LoggerConfig};
pub use upstream::{ContentClient, SharedContentClient, WikiClient};

/// Infrastructure version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
