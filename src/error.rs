use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error types with appropriate HTTP status codes.
///
/// # Transport Errors
///
/// Everything that goes wrong between this process and the sidecar is
/// reported as either `SidecarError` or `OperationTimeout`. Both map to the
/// same 500 response: a timed out call is treated like any other transport
/// failure, and nothing in this crate retries either of them.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to deserialize report: {0}")]
    DecodeError(#[from] serde_json::Error),

    #[error("Invalid event data: {0}")]
    InvalidEventData(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Sidecar request failed: {0}")]
    SidecarError(String),

    #[error("Operation timed out: {0}")]
    OperationTimeout(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Error response body for API endpoints.
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full error details server-side for debugging
        // but only expose fixed messages to clients
        tracing::error!(error = %self, "Request failed");

        let (status, error, message) = match &self {
            AppError::DecodeError(_) | AppError::InvalidEventData(_) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                "Invalid request body",
            ),
            AppError::MethodNotAllowed(_) => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                "Method not allowed",
            ),
            AppError::SidecarError(_)
            | AppError::OperationTimeout(_)
            | AppError::ServerError(_)
            | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
            ),
            AppError::ConfigError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "config_error",
                "Service configuration error. Please contact support.",
            ),
        };

        (status, axum::Json(ErrorResponse { error, message })).into_response()
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
