//! Routers for the two binaries, with their middleware stacks.
//!
//! # Middleware Stack (outermost first)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │   Request ID     │ ← Adds X-Request-Id header
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← Request span carrying `request_id`
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │   Body Limit     │ ← 413 if exceeded
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │  Authentication  │ ← 401 if invalid (endpoint `/reports` only)
//! └────────┬─────────┘
//!          │
//!          ▼
//!      Handler
//! ```
//!
//! # Route Groups
//!
//! Endpoint:
//! - `GET /health` - Health check (no auth)
//! - `POST /reports` - Report ingestion
//!
//! Worker (queue mode):
//! - `GET /health`
//! - `POST /{name}`, `OPTIONS /{name}` - Input binding callback
//!
//! Worker (pub/sub mode):
//! - `GET /health`
//! - `GET /dapr/subscribe` - Subscription discovery
//! - `POST /{name}` - Topic delivery

use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::{Span, info, info_span};

use crate::config::WorkerMode;
use crate::handlers;
use crate::middleware::{ApiKeyAuth, REQUEST_ID_HEADER, RequestIdLayer, SecurityKeys};
use crate::state::{EndpointState, WorkerState};

/// Route the sidecar queries for pub/sub subscriptions.
pub const SUBSCRIBE_ROUTE: &str = "/dapr/subscribe";

/// Build the ingestion endpoint router.
pub fn endpoint_router(state: EndpointState, keys: SecurityKeys, body_limit: usize) -> Router {
    info!(keys = keys.len(), "API key authentication enabled");

    let reports = post(handlers::create_report)
        .fallback(handlers::method_not_allowed)
        .layer(ApiKeyAuth::new(keys));

    let router = Router::new()
        .route("/health", get(|| handlers::health_check("endpoint")))
        .route("/reports", reports)
        .with_state(state);

    with_common_layers(router, body_limit)
}

/// Build the worker router for `mode`.
pub fn worker_router(state: WorkerState, mode: WorkerMode, body_limit: usize) -> Router {
    let route = state.dispatcher.route();
    info!(%mode, route = %route, "Worker routes configured");

    let router = Router::new().route("/health", get(|| handlers::health_check("worker")));

    let router = match mode {
        WorkerMode::Queue => router.route(
            &route,
            post(handlers::binding_event).options(handlers::binding_probe),
        ),
        WorkerMode::Pubsub => router
            .route(SUBSCRIBE_ROUTE, get(handlers::subscriptions))
            .route(&route, post(handlers::topic_event)),
    };

    with_common_layers(router.with_state(state), body_limit)
}

fn with_common_layers(router: Router, body_limit: usize) -> Router {
    info!(
        max_size_kb = body_limit / 1024,
        "Request body size limit configured"
    );

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(RequestIdLayer::new())
}

/// Span for one request. `RequestIdLayer` runs first, so the header is set.
fn request_span(req: &Request<Body>) -> Span {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    info_span!(
        "request",
        method = %req.method(),
        uri = %req.uri(),
        request_id,
    )
}
