//! Search API handlers
//!
//! # Endpoints
//!
//! - `GET /search?query=<title>` - Cached page lookup
//!
//! # Examples
//!
//! ```text
//! GET /api/search?query=OpenAI
//!
//! 200 OK
//! {"parse": {"title": "OpenAI", ...}, "source": "Upstream API"}
//! ```

use crate::handlers::AppState;
use crate::search::types::{ApiError, SearchParams};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use tracing::debug;
use wikiproxy_core::JsonObject;

/// Create search routes
pub fn search_routes() -> Router<AppState> {
    Router::new().route("/search", get(handle_search))
}

/// Handle `GET /search`
///
/// Returns the page document with a `source` field naming where it came
/// from. A missing or blank `query` is rejected before any cache or upstream
/// access.
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<JsonObject>, ApiError> {
    debug!(query = ?params.query, "Search request");

    let payload = state.search.handle(params.query.as_deref()).await?;

    Ok(Json(payload))
}
