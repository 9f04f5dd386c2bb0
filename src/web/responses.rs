//! Bridges [`AppError`] into HTTP responses. The suggestions/queue/worker
//! JSON shapes are fixed by the specification, so handlers return them
//! directly rather than through a generic envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::errors::AppError;

pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::RateLimited { retry_after_ms } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("rate limited, retry after {retry_after_ms}ms"),
            ),
            AppError::ClientInput { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::EmptyResult { context } => (StatusCode::NOT_FOUND, context.clone()),
            AppError::Configuration { message } => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
            AppError::Fetch(_) | AppError::InvariantViolation { .. } | AppError::Internal { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
