//! Shared fakes and helpers for the integration suites.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;
use tracing::subscriber::DefaultGuard;

use report_relay::sidecar::BindingRequest;
use report_relay::{AppError, AppResult, Report, Service, SidecarClient};

/// Service that records every report and optionally fails.
#[derive(Clone, Default)]
pub struct RecordingService {
    reports: Arc<Mutex<Vec<Report>>>,
    failure: Option<String>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl Service for RecordingService {
    async fn create(&self, report: Report) -> AppResult<()> {
        self.reports.lock().unwrap().push(report);
        match &self.failure {
            Some(message) => Err(AppError::SidecarError(message.clone())),
            None => Ok(()),
        }
    }
}

/// One published event as seen by [`FakeSidecar`].
#[derive(Debug, Clone)]
pub struct Published {
    pub pubsub: String,
    pub topic: String,
    pub data: Vec<u8>,
    pub content_type: String,
}

/// In-memory sidecar that records calls.
#[derive(Clone, Default)]
pub struct FakeSidecar {
    published: Arc<Mutex<Vec<Published>>>,
    bindings: Arc<Mutex<Vec<BindingRequest>>>,
}

impl FakeSidecar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }

    pub fn bindings(&self) -> Vec<BindingRequest> {
        self.bindings.lock().unwrap().clone()
    }
}

#[async_trait]
impl SidecarClient for FakeSidecar {
    async fn publish_event(
        &self,
        pubsub: &str,
        topic: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> AppResult<()> {
        self.published.lock().unwrap().push(Published {
            pubsub: pubsub.to_string(),
            topic: topic.to_string(),
            data,
            content_type: content_type.to_string(),
        });
        Ok(())
    }

    async fn invoke_binding(&self, request: BindingRequest) -> AppResult<Vec<u8>> {
        self.bindings.lock().unwrap().push(request);
        Ok(Vec::new())
    }
}

/// Read a response body as a string.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Captures JSON log lines emitted on the current thread.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the thread-local default subscriber.
    pub fn install(&self) -> DefaultGuard {
        let buffer = self.buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || CaptureWriter(buffer.clone()))
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Every captured line, parsed.
    pub fn events(&self) -> Vec<serde_json::Value> {
        let buffer = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer)
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Captured events whose message is exactly `message`.
    pub fn with_message(&self, message: &str) -> Vec<serde_json::Value> {
        self.events()
            .into_iter()
            .filter(|event| event["message"] == message)
            .collect()
    }
}
