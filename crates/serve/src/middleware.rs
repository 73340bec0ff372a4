//! Middleware module for the wikiproxy server

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the handler latency
pub const RESPONSE_TIME_HEADER: &str = "x-response-time";

/// Request ID middleware for tracing
///
/// Reuses an inbound `x-request-id` when it is valid, otherwise generates
/// one, and echoes it on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .filter(|value| !value.is_empty())
        .cloned()
        .unwrap_or_else(generate_request_id);

    request.headers_mut().insert(REQUEST_ID_HEADER, request_id.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id.to_str().unwrap_or_default()
    );

    let mut response = next.run(request).instrument(span).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, request_id);
    response
}

fn generate_request_id() -> HeaderValue {
    // a hyphenated UUID is always a valid header value
    HeaderValue::from_str(&Uuid::new_v4().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}

/// Timing middleware: logs each request and sets `x-response-time`
pub async fn response_time_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let mut response = next.run(request).await;

    let duration = start.elapsed();
    let elapsed = format_duration_ms(duration.as_secs_f64() * 1000.0);
    if let Ok(value) = HeaderValue::from_str(&elapsed) {
        response.headers_mut().insert(RESPONSE_TIME_HEADER, value);
    }

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = duration.as_millis() as u64,
        "Request completed"
    );

    response
}

/// Format milliseconds with three decimals, e.g. `12.345ms`
fn format_duration_ms(ms: f64) -> String {
    format!("{:.3}ms", ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{self, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(response_time_middleware))
            .layer(middleware::from_fn(request_id_middleware))
    }

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration_ms(12.3456), "12.346ms");
        assert_eq!(format_duration_ms(0.0), "0.000ms");
    }

    #[tokio::test]
    async fn test_generates_request_id_and_response_time() {
        let response = app()
            .oneshot(http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let request_id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(Uuid::parse_str(request_id.to_str().unwrap()).is_ok());

        let elapsed = response.headers().get(RESPONSE_TIME_HEADER).unwrap();
        let elapsed = elapsed.to_str().unwrap();
        assert!(elapsed.ends_with("ms"));
        assert!(elapsed.trim_end_matches("ms").parse::<f64>().is_ok());
    }

    #[tokio::test]
    async fn test_reuses_inbound_request_id() {
        let response = app()
            .oneshot(
                http::Request::builder()
                    .uri("/")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).unwrap(),
            "abc-123"
        );
    }
}
