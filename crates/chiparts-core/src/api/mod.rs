//! REST API implementation
//!
//! This module provides the HTTP API for ChiParts.

pub mod error;
pub mod handlers;
pub mod routes;

pub use error::ApiError;
pub use handlers::AppState;
pub use routes::create_router;

use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::error::Result;
use crate::intake::OrderIntake;

/// HTTP API server
pub struct HttpServer {
    state: AppState,
    static_dir: PathBuf,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(
        intake: OrderIntake,
        metrics: Option<PrometheusHandle>,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            state: AppState { intake, metrics },
            static_dir: static_dir.into(),
        }
    }

    /// Router with every layer the server applies
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone(), &self.static_dir).layer(cors)
    }

    /// Serve on an already bound listener until Ctrl+C
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let app = self.router();

        if let Ok(addr) = listener.local_addr() {
            info!("HTTP server listening on {}", addr);
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::error::Error::Internal(e.to_string()))?;

        info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C received, shutting down..."),
        Err(e) => {
            warn!(error = %e, "Ctrl+C handler unavailable, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
