//! Prometheus metrics for application observability.
//!
//! Metrics are exposed via a dedicated HTTP listener when a metrics port is
//! configured (`ENDPOINT_METRICS_PORT` / `WORKER_METRICS_PORT`).
//!
//! # Available Metrics
//!
//! ## Counters
//! - `relay_reports_received_total` - Reports accepted by the endpoint (labels: status)
//! - `relay_sidecar_calls_total` - Outbound sidecar calls (labels: operation, status)
//! - `relay_worker_events_total` - Deliveries handled by the worker (labels: mode, outcome)
//!
//! ## Histograms
//! - `relay_sidecar_call_duration_seconds` - Sidecar call duration (labels: operation)
//!
//! # Usage
//!
//! ```rust,ignore
//! use report_relay::metrics::{try_init_metrics, record_sidecar_call};
//!
//! try_init_metrics(addr);
//! record_sidecar_call("publish", "success", started.elapsed().as_secs_f64());
//! ```

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const REPORTS_RECEIVED_TOTAL: &str = "relay_reports_received_total";
    pub const SIDECAR_CALLS_TOTAL: &str = "relay_sidecar_calls_total";
    pub const WORKER_EVENTS_TOTAL: &str = "relay_worker_events_total";
    pub const SIDECAR_CALL_DURATION_SECONDS: &str = "relay_sidecar_call_duration_seconds";
}

/// Initialize the Prometheus metrics exporter on `metrics_addr`.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::REPORTS_RECEIVED_TOTAL,
        "Total number of reports received by the ingestion endpoint"
    );
    describe_counter!(
        names::SIDECAR_CALLS_TOTAL,
        "Total number of calls made to the Dapr sidecar"
    );
    describe_counter!(
        names::WORKER_EVENTS_TOTAL,
        "Total number of deliveries handled by the worker"
    );
    describe_histogram!(
        names::SIDECAR_CALL_DURATION_SECONDS,
        "Sidecar call duration in seconds"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

/// Record a report received on `POST /reports`.
pub fn record_report_received(status: &'static str) {
    counter!(names::REPORTS_RECEIVED_TOTAL, "status" => status).increment(1);
}

/// Record one sidecar call and its duration.
pub fn record_sidecar_call(operation: &'static str, status: &'static str, duration_secs: f64) {
    counter!(names::SIDECAR_CALLS_TOTAL, "operation" => operation, "status" => status)
        .increment(1);
    histogram!(names::SIDECAR_CALL_DURATION_SECONDS, "operation" => operation)
        .record(duration_secs);
}

/// Record one worker delivery.
pub fn record_worker_event(mode: &'static str, outcome: &'static str) {
    counter!(names::WORKER_EVENTS_TOTAL, "mode" => mode, "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Recording without an installed recorder is a no-op.

    #[test]
    fn test_record_report_received() {
        record_report_received("success");
        record_report_received("error");
    }

    #[test]
    fn test_record_sidecar_call() {
        record_sidecar_call("publish", "success", 0.01);
        record_sidecar_call("binding", "timeout", 10.0);
    }

    #[test]
    fn test_record_worker_event() {
        record_worker_event("queue", "processed");
        record_worker_event("pubsub", "dropped");
    }
}
