//! Sidecar callbacks served by the worker.
//!
//! # Endpoints
//!
//! - `OPTIONS /{name}` - binding probe, always 200
//! - `POST /{name}` - binding delivery (queue mode) or topic delivery (pub/sub mode)
//! - `GET /dapr/subscribe` - subscription discovery (pub/sub mode)

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use tracing::{error, instrument};

use crate::error::AppResult;
use crate::metrics::record_worker_event;
use crate::models::{BindingEvent, Subscription, TopicEvent, TopicEventResponse, TopicEventStatus};
use crate::state::WorkerState;

/// Binding delivery. Responds with the acknowledgement body, or the error
/// status of the failure so the sidecar sees the delivery as failed.
#[instrument(skip_all, fields(size = body.len()))]
pub async fn binding_event(
    State(state): State<WorkerState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Vec<u8>> {
    state
        .dispatcher
        .handle_binding(BindingEvent::from_parts(&headers, &body))
        .await
}

/// The sidecar probes input binding routes with `OPTIONS` before delivering.
pub async fn binding_probe() -> StatusCode {
    StatusCode::OK
}

/// Subscription discovery.
pub async fn subscriptions(State(state): State<WorkerState>) -> Json<Vec<Subscription>> {
    Json(vec![state.dispatcher.subscription()])
}

/// Topic delivery.
///
/// Always answers 200; the body tells the sidecar what to do with the
/// event. An envelope that cannot be parsed is dropped.
#[instrument(skip_all, fields(size = body.len()))]
pub async fn topic_event(
    State(state): State<WorkerState>,
    body: Bytes,
) -> Json<TopicEventResponse> {
    let event: TopicEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            error!(error = %e, "Failed to decode event envelope.");
            record_worker_event("pubsub", "decode_error");
            return Json(TopicEventResponse::new(TopicEventStatus::Drop));
        }
    };

    let status = match state.dispatcher.handle_topic_event(event).await {
        (_, Ok(())) => TopicEventStatus::Success,
        (true, Err(_)) => TopicEventStatus::Retry,
        (false, Err(_)) => TopicEventStatus::Drop,
    };

    Json(TopicEventResponse::new(status))
}
