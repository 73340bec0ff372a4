//! Request and error types for the search API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use wikiproxy_core::ProxyError;

/// Query parameters for `GET /api/search`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchParams {
    /// Page title to look up; required, trimmed before use
    pub query: Option<String>,
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Optional error details
    pub details: Option<String>,
}

/// Maps [`ProxyError`] onto an HTTP status and JSON body
#[derive(Debug)]
pub struct ApiError(pub ProxyError);

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamFetch {
                timed_out: true, ..
            } => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::UpstreamFetch { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_message, details) = match self.0 {
            ProxyError::MissingQuery => (self.0.to_string(), None),
            ProxyError::Validation { message } => (message, None),
            ProxyError::UpstreamFetch { message, .. } => (
                "Upstream content API request failed".to_string(),
                Some(message),
            ),
            other => {
                error!(category = %other.category(), error = %other, "Search request failed");
                ("Internal server error".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status, body).into_response()
    }
}
