//! API routes for the wikiproxy server

use crate::handlers::{handle_health_check, AppState};
use crate::search::search_routes;
use axum::{routing::get, Router};

/// API routes configuration
///
/// `/health` sits at the root; the search route is nested under `/api`.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handle_health_check))
        .nest("/api", search_routes())
}
