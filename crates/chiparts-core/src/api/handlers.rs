//! API handlers for the HTTP REST API

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tracing::error;

use super::error::ApiError;
use crate::intake::OrderIntake;
use crate::models::{Order, OrderRequest};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub intake: OrderIntake,
    pub metrics: Option<PrometheusHandle>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Order submission response
#[derive(Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub message: String,
    pub order: Order,
}

/// Accept an order from the web form
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let Json(request) = payload?;
    let order = state.intake.submit(request).await?;

    Ok(Json(OrderResponse {
        success: true,
        message: "Заявка успешно отправлена".to_string(),
        order,
    }))
}

/// Stats response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub success: bool,
    pub total_orders: usize,
    pub last_update: String,
}

/// Report how many orders the log holds
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.intake.stats().await.map_err(|e| {
        error!(error = %e, "Failed to read order log");
        ApiError::StatsUnavailable
    })?;

    Ok(Json(StatsResponse {
        success: true,
        total_orders: stats.total_orders,
        last_update: stats.last_update,
    }))
}

/// Prometheus exposition, when a recorder is installed
pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
