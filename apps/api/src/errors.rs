use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Index {0} not in range")]
    OutOfRange(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("{0}")]
    Conflict(String),

    #[error("Persistence error: {0:#}")]
    Persistence(anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            StoreError::OutOfRange { index } => AppError::OutOfRange(index),
            StoreError::MissingFields(fields) => AppError::MissingFields(fields),
            err @ StoreError::IdsExhausted { .. } => AppError::Conflict(err.to_string()),
            StoreError::Persistence(e) => AppError::Persistence(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            AppError::OutOfRange(_) => (StatusCode::BAD_REQUEST, "OUT_OF_RANGE"),
            AppError::MissingFields(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELDS"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR")
            }
        };

        let message = match &self {
            AppError::Persistence(_) => "Failed to save data".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}
