//! Error-to-response mapping.
//!
//! The core signals NotFound, ValidationError, and backend failures
//! distinctly; this module maps each to an HTTP status without
//! string-matching error messages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use taskvault_core::{StoreError, ValidationError};

/// Structured error body returned on every failure.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

/// Boundary-level error. Converts into a response with the right status.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed input: 400.
    Validation(ValidationError),
    /// The addressed task does not exist: 404.
    NotFound,
    /// The key-value backend is unreachable or failing: 503.
    BackendUnavailable(String),
    /// Anything that should never happen in a healthy deployment: 500.
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(e) => ApiError::Validation(e),
            StoreError::Backend(e) => ApiError::BackendUnavailable(e.to_string()),
            StoreError::Codec(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Validation(err) => (StatusCode::BAD_REQUEST, "validation_error", err.to_string()),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                "task not found".to_string(),
            ),
            ApiError::BackendUnavailable(reason) => {
                tracing::error!(reason = %reason, "backend unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "backend_unavailable",
                    "storage backend unavailable".to_string(),
                )
            }
            ApiError::Internal(reason) => {
                tracing::error!(reason = %reason, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error, message })).into_response()
    }
}
