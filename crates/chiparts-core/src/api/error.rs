//! HTTP error responses
//!
//! Every failure leaves the API as `{ success: false, message[, error] }`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use tracing::error;

use crate::error::Error;

/// Failure envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Errors returned by API handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("no destination accepted the order")]
    DeliveryFailed,

    #[error("stats unavailable")]
    StatsUnavailable,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(message) => Self::BadRequest(message),
            Error::Delivery { .. } => Self::DeliveryFailed,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("Некорректные данные заявки: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, error) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            Self::DeliveryFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Ошибка при отправке заявки. Попробуйте позже.".to_string(),
                None,
            ),
            Self::StatsUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Ошибка получения статистики".to_string(),
                None,
            ),
            Self::Internal(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Внутренняя ошибка сервера".to_string(),
                Some(details),
            ),
        };

        let body = ErrorResponse {
            success: false,
            message,
            error,
        };
        (status, Json(body)).into_response()
    }
}

/// Render a handler panic as an internal error
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };

    error!(details = %details, "Handler panicked");
    ApiError::Internal(details).into_response()
}
