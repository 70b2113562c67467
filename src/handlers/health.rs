//! Health endpoint.
//!
//! `GET /health` answers on both binaries without authentication, so the
//! container platform can probe the process independently of the sidecar.

use axum::Json;
use chrono::Utc;
use tracing::instrument;

use crate::models::HealthResponse;

/// Health check.
///
/// # Response Body
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "endpoint",
///   "version": "0.1.0",
///   "timestamp": "2024-01-15T10:30:00Z"
/// }
/// ```
#[instrument]
pub async fn health_check(service: &'static str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: service.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}
