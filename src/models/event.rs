//! Messages the sidecar delivers to the worker.
//!
//! Binding mode: the sidecar `POST`s the raw payload to `/{name}` and passes
//! binding metadata as request headers. Pub/sub mode: the sidecar discovers
//! subscriptions through `GET /dapr/subscribe` and `POST`s a CloudEvents
//! envelope to the subscription route, expecting a [`TopicEventResponse`].

use std::collections::HashMap;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

/// One input binding delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingEvent {
    pub data: Vec<u8>,
    pub metadata: HashMap<String, String>,
}

impl BindingEvent {
    /// Build an event from a callback request. Headers that are not valid
    /// UTF-8 are skipped.
    pub fn from_parts(headers: &HeaderMap, body: &[u8]) -> Self {
        let metadata = headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Self {
            data: body.to_vec(),
            metadata,
        }
    }
}

/// CloudEvents envelope for one topic delivery.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TopicEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub specversion: String,
    #[serde(default)]
    pub datacontenttype: String,
    /// Event payload. Reports are published as text, so this is expected to
    /// be a JSON string.
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub pubsubname: String,
}

/// Entry of the `GET /dapr/subscribe` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub pubsubname: String,
    pub topic: String,
    pub route: String,
}

/// What the sidecar should do with a delivered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TopicEventStatus {
    Success,
    Retry,
    Drop,
}

/// Body of the reply to a topic delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEventResponse {
    pub status: TopicEventStatus,
}

impl TopicEventResponse {
    pub fn new(status: TopicEventStatus) -> Self {
        Self { status }
    }
}
