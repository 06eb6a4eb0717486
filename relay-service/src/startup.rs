//! Route table and server lifecycle.

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Method,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::path::Path;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::handlers;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route("/google", get(handlers::places::text_search))
        .route("/gemini", post(handlers::gemini::generate_content));

    let router = match &state.config.server.static_dir {
        Some(dir) => with_web_client(router, dir),
        None => router,
    };

    router
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state)
}

/// Serve the built client for every path the API does not own, falling back
/// to `index.html` for client-side routes.
fn with_web_client(router: Router<AppState>, dir: &Path) -> Router<AppState> {
    let index_path = dir.join("index.html");
    if !index_path.exists() {
        tracing::warn!("Static directory {:?} has no index.html, not serving it", dir);
        return router;
    }

    tracing::info!("Serving web client from {:?}", dir);
    router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index_path)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application. Port `0` binds a random port (tests).
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        let address = config.common.bind_address();
        let state = AppState::new(config)?;

        tracing::info!(
            model = %state.gemini.model(),
            timeout_secs = state.config.upstream.timeout.as_secs(),
            "Initialized upstream clients"
        );

        let router = build_router(state);

        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM. In-flight requests finish first.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!("relay-service listening on port {}", self.port);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}
