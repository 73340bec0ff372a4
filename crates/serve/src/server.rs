//! Server module for the wikiproxy serve crate

use crate::api::create_routes;
use crate::handlers::AppState;
use crate::middleware::{request_id_middleware, response_time_middleware};

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, Method,
    },
    middleware, Router,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use wikiproxy_core::{ProxyConfig, ProxyError, Result, ServerSettings};

/// wikiproxy HTTP server
pub struct ProxyServer {
    config: ProxyConfig,
    app: Router,
}

impl ProxyServer {
    /// Create a new server instance
    ///
    /// Builds the cache store and upstream client without connecting to
    /// either, so the server starts while Redis is unavailable.
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let state = AppState::from_config(&config)?;
        let app = create_app(state, &config.server);

        Ok(Self { config, app })
    }

    /// Start the server and run until Ctrl+C or SIGTERM
    pub async fn start(self) -> Result<()> {
        let addr = self.config.server.bind_address();

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ProxyError::network(format!("Failed to bind to {}: {}", addr, e)))?;

        tracing::info!(
            address = %addr,
            cache_backend = %self.config.cache.backend,
            upstream = %self.config.upstream.endpoint,
            "Starting wikiproxy server"
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ProxyError::network(format!("Server error: {}", e)))?;

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Get the server configuration
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Create the Axum application with middleware
pub fn create_app(state: AppState, settings: &ServerSettings) -> Router {
    let mut app = create_routes()
        .with_state(state)
        .layer(middleware::from_fn(response_time_middleware))
        .layer(middleware::from_fn(request_id_middleware));

    app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(settings.max_request_size)),
    );

    if settings.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([ACCEPT, CONTENT_TYPE])
            .expose_headers([
                HeaderName::from_static(crate::middleware::REQUEST_ID_HEADER),
                HeaderName::from_static(crate::middleware::RESPONSE_TIME_HEADER),
            ]);

        app = app.layer(cors);
    }

    app
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikiproxy_core::{CacheBackend, CacheSettings};

    fn memory_config() -> ProxyConfig {
        ProxyConfig {
            cache: CacheSettings {
                backend: CacheBackend::Memory,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_server_new_does_not_connect() {
        // unreachable Redis must not prevent construction
        let config = ProxyConfig {
            cache: CacheSettings {
                url: "redis://127.0.0.1:1".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let server = ProxyServer::new(config).unwrap();
        assert_eq!(server.config().server.port, 3000);
    }

    #[tokio::test]
    async fn test_server_new_rejects_bad_endpoint() {
        let mut config = memory_config();
        config.upstream.endpoint = "not a url".to_string();

        assert!(ProxyServer::new(config).is_err());
    }

    #[tokio::test]
    async fn test_create_app_with_cors() {
        let mut config = memory_config();
        config.server.cors_enabled = true;

        let state = AppState::from_config(&config).unwrap();
        let _app = create_app(state, &config.server);
    }
}
