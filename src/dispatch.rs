//! Worker dispatch: turn one sidecar delivery into a [`Service::create`] call.
//!
//! ```text
//! binding:  payload ─decode─▶ Report ─create─▶ "Message processed."
//! pub/sub:  event.data ─as string─▶ payload ─decode─▶ Report ─create─▶ (retry=false, Ok)
//! ```
//!
//! Any step may fail. Failures are logged with the delivery's context and
//! returned; nothing here asks the sidecar to redeliver.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::WorkerMode;
use crate::error::{AppError, AppResult};
use crate::metrics::record_worker_event;
use crate::models::{BindingEvent, Subscription, TopicEvent};
use crate::report::{Report, Service};

/// Acknowledgement body returned for a processed binding delivery.
pub const BINDING_ACK: &[u8] = b"Message processed.";

/// Routes deliveries to the report service.
#[derive(Clone)]
pub struct ReportDispatcher {
    service: Arc<dyn Service>,
    name: String,
    topic: String,
}

impl ReportDispatcher {
    /// `name` is the binding or pub/sub component name; `topic` only matters
    /// in pub/sub mode.
    pub fn new(service: Arc<dyn Service>, name: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            service,
            name: name.into(),
            topic: topic.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Route the sidecar delivers to.
    pub fn route(&self) -> String {
        format!("/{}", self.name)
    }

    /// The single topic subscription this worker declares.
    pub fn subscription(&self) -> Subscription {
        Subscription {
            pubsubname: self.name.clone(),
            topic: self.topic.clone(),
            route: self.route(),
        }
    }

    /// Handle one input binding delivery.
    ///
    /// Returns the acknowledgement body on success.
    pub async fn handle_binding(&self, event: BindingEvent) -> AppResult<Vec<u8>> {
        let metadata = &event.metadata;
        info!(?metadata, "Message received.");

        let report = match Report::from_json(&event.data) {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, ?metadata, "Failed to deserialize report.");
                record_worker_event(mode_label(WorkerMode::Queue), "decode_error");
                return Err(e.into());
            }
        };

        if let Err(e) = self.service.create(report).await {
            error!(error = %e, ?metadata, "Failed to create report.");
            record_worker_event(mode_label(WorkerMode::Queue), "create_error");
            return Err(e);
        }

        record_worker_event(mode_label(WorkerMode::Queue), "processed");
        Ok(BINDING_ACK.to_vec())
    }

    /// Handle one topic delivery.
    ///
    /// Returns `(retry, result)`. `retry` is always `false`: a failed
    /// delivery is dropped rather than redelivered.
    pub async fn handle_topic_event(&self, event: TopicEvent) -> (bool, AppResult<()>) {
        let TopicEvent {
            id,
            pubsubname: pubsub,
            topic,
            data,
            ..
        } = event;
        info!(%id, %pubsub, %topic, "Event received.");

        let payload = match data {
            serde_json::Value::String(payload) => payload,
            other => {
                let e = AppError::InvalidEventData(format!(
                    "expected a string, found {}",
                    json_kind(&other)
                ));
                error!(error = %e, %id, %pubsub, %topic, "Failed to cast data to string.");
                record_worker_event(mode_label(WorkerMode::Pubsub), "decode_error");
                return (false, Err(e));
            }
        };

        let report = match Report::from_json(payload.as_bytes()) {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, %id, %pubsub, %topic, "Failed to deserialize report.");
                record_worker_event(mode_label(WorkerMode::Pubsub), "decode_error");
                return (false, Err(e.into()));
            }
        };

        if let Err(e) = self.service.create(report).await {
            error!(error = %e, %id, %pubsub, %topic, "Failed to create report.");
            record_worker_event(mode_label(WorkerMode::Pubsub), "create_error");
            return (false, Err(e));
        }

        info!(%id, %pubsub, %topic, "Report created.");
        record_worker_event(mode_label(WorkerMode::Pubsub), "processed");
        (false, Ok(()))
    }
}

fn mode_label(mode: WorkerMode) -> &'static str {
    match mode {
        WorkerMode::Queue => "queue",
        WorkerMode::Pubsub => "pubsub",
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::report::{MockStorer, ReportService};
    use serde_json::json;

    fn dispatcher(storer: MockStorer) -> ReportDispatcher {
        let service = ReportService::with_storer(Arc::new(storer));
        ReportDispatcher::new(Arc::new(service), "reports", "create")
    }

    fn topic_event(data: serde_json::Value) -> TopicEvent {
        TopicEvent {
            id: "e-1".to_string(),
            pubsubname: "reports".to_string(),
            topic: "create".to_string(),
            data,
            ..TopicEvent::default()
        }
    }

    #[test]
    fn test_subscription_routes_to_name() {
        let dispatcher = dispatcher(MockStorer::new());
        assert_eq!(
            dispatcher.subscription(),
            Subscription {
                pubsubname: "reports".to_string(),
                topic: "create".to_string(),
                route: "/reports".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_binding_success_acks() {
        let mut storer = MockStorer::new();
        storer
            .expect_store()
            .withf(|r| r.id == "123" && r.data == b"testdata".as_slice())
            .times(1)
            .returning(|_| Ok(()));

        let event = BindingEvent {
            data: Report::new("123", "testdata").to_json().unwrap(),
            ..BindingEvent::default()
        };
        let out = dispatcher(storer).handle_binding(event).await.unwrap();
        assert_eq!(out, b"Message processed.");
    }

    #[tokio::test]
    async fn test_binding_accepts_literal_wire_payload() {
        let mut storer = MockStorer::new();
        storer
            .expect_store()
            .withf(|r| r.id == "123")
            .times(1)
            .returning(|_| Ok(()));

        let event = BindingEvent {
            data: br#"{"id":"123","data":"testdata"}"#.to_vec(),
            ..BindingEvent::default()
        };
        let out = dispatcher(storer).handle_binding(event).await.unwrap();
        assert_eq!(out, BINDING_ACK);
    }

    #[tokio::test]
    async fn test_binding_malformed_payload_skips_storer() {
        let mut storer = MockStorer::new();
        storer.expect_store().never();

        let event = BindingEvent {
            data: br#"{"id":"123","data":"testdata""#.to_vec(),
            ..BindingEvent::default()
        };
        let err = dispatcher(storer).handle_binding(event).await.unwrap_err();
        assert!(matches!(err, AppError::DecodeError(_)));
    }

    #[tokio::test]
    async fn test_binding_store_failure_is_returned() {
        let mut storer = MockStorer::new();
        storer
            .expect_store()
            .returning(|_| Err(AppError::SidecarError("down".to_string())));

        let event = BindingEvent {
            data: Report::new("1", "x").to_json().unwrap(),
            ..BindingEvent::default()
        };
        let err = dispatcher(storer).handle_binding(event).await.unwrap_err();
        assert!(matches!(err, AppError::SidecarError(_)));
    }

    #[tokio::test]
    async fn test_topic_success() {
        let mut storer = MockStorer::new();
        storer
            .expect_store()
            .withf(|r| r.id == "1" && r.data == b"x".as_slice())
            .times(1)
            .returning(|_| Ok(()));

        let (retry, result) = dispatcher(storer)
            .handle_topic_event(topic_event(json!(r#"{"id":"1","data":"eA=="}"#)))
            .await;
        assert!(!retry);
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_topic_non_string_data_is_dropped() {
        let mut storer = MockStorer::new();
        storer.expect_store().never();

        let (retry, result) = dispatcher(storer)
            .handle_topic_event(topic_event(json!({"id": "1", "data": "eA=="})))
            .await;
        assert!(!retry);
        assert!(matches!(result, Err(AppError::InvalidEventData(_))));
    }

    #[tokio::test]
    async fn test_topic_undecodable_report_is_dropped() {
        let mut storer = MockStorer::new();
        storer.expect_store().never();

        let (retry, result) = dispatcher(storer)
            .handle_topic_event(topic_event(json!("not json")))
            .await;
        assert!(!retry);
        assert!(matches!(result, Err(AppError::DecodeError(_))));
    }

    #[tokio::test]
    async fn test_topic_store_failure_never_retries() {
        let mut storer = MockStorer::new();
        storer
            .expect_store()
            .returning(|_| Err(AppError::OperationTimeout("binding".to_string())));

        let (retry, result) = dispatcher(storer)
            .handle_topic_event(topic_event(json!(r#"{"id":"1","data":""}"#)))
            .await;
        assert!(!retry);
        assert!(matches!(result, Err(AppError::OperationTimeout(_))));
    }
}
