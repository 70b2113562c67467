//! Report ingestion.
//!
//! # Endpoints
//!
//! - `POST /reports` - Accept a report and hand it to the configured reporter
//!
//! Any other verb on `/reports` answers 405.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use tracing::{error, info, instrument};

use crate::error::{AppError, AppResult};
use crate::metrics::record_report_received;
use crate::models::ReportRequest;
use crate::report::Report;
use crate::state::EndpointState;

/// Create a report.
///
/// # Request Body
///
/// ```json
/// { "id": "123", "data": "data" }
/// ```
///
/// # Response Body
///
/// The accepted report in its wire shape, payload base64 encoded:
///
/// ```json
/// { "id": "123", "data": "ZGF0YQ==" }
/// ```
#[instrument(skip(state, body), fields(size = body.len()))]
pub async fn create_report(
    State(state): State<EndpointState>,
    body: Bytes,
) -> AppResult<Json<Report>> {
    let request: ReportRequest = serde_json::from_slice(&body).inspect_err(|_| {
        record_report_received("bad_request");
    })?;
    info!(id = %request.id, data = %request.data, "Received report.");

    let report = Report::from(request);
    if let Err(e) = state.service.create(report.clone()).await {
        error!(error = %e, id = %report.id, "Error creating report.");
        record_report_received("error");
        return Err(e);
    }

    info!(id = %report.id, "Report sent for creation.");
    record_report_received("success");
    Ok(Json(report))
}

/// Fallback for unsupported verbs on `/reports`.
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method.to_string())
}
