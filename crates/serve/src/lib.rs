//! wikiproxy Serve Library
//!
//! HTTP front end for the read-through page cache: the `/api/search` route,
//! the `/health` check and the request middleware.

pub mod api;
pub mod handlers;
pub mod middleware;
pub mod search;
pub mod server;

pub use handlers::{AppState, CacheStatus, HealthCheckResponse};
pub use search::{SearchOutcome, SearchService};
pub use server::{create_app, ProxyServer};

/// Server version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
