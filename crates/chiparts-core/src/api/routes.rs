//! API routes

use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower_http::{
    catch_panic::CatchPanicLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::error::handle_panic;
use super::handlers::{self, AppState};

/// Create the API router.
///
/// Paths outside the API are served from `static_dir`; anything that is not
/// a file there gets the front-end entry document.
pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    let frontend =
        ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        // Health
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))

        // Orders
        .route("/api/order", post(handlers::create_order))
        .route("/api/stats", get(handlers::get_stats))

        // Front end
        .fallback_service(frontend)

        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
