//! Application error types and Axum response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application-level errors with HTTP status code mapping.
#[derive(Debug)]
pub enum AppError {
    Internal(String),
}

impl From<leakage_core::ModelError> for AppError {
    fn from(e: leakage_core::ModelError) -> Self {
        AppError::Internal(format!("model prediction failed with error {e}"))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Internal(detail) = self;
        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { detail })).into_response()
    }
}
