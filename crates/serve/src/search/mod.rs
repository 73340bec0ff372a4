//! Search API module
//!
//! The single read-through lookup the proxy exists for.
//!
//! # Architecture
//!
//! - `types`: Query parameters and the error-to-HTTP mapping
//! - `service`: Cache-or-fetch logic, independent of HTTP
//! - `handlers`: The axum handler and router for `/search`
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::Router;
//! use wikiproxy_serve::search::handlers::search_routes;
//! use wikiproxy_serve::AppState;
//!
//! # fn example(state: AppState) {
//! let app: Router = Router::new().nest("/api", search_routes()).with_state(state);
//! # }
//! ```

pub mod handlers;
pub mod service;
pub mod types;

pub use handlers::{handle_search, search_routes};
pub use service::{SearchOutcome, SearchService};
pub use types::{ApiError, ErrorResponse, SearchParams};
