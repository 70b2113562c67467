//! Narrow capability interface over the Dapr sidecar.
//!
//! Reporters and storers hold an `Arc<dyn SidecarClient>` field and call
//! through it; nothing else in the crate knows how the sidecar is reached.
//!
//! ```text
//! QueueReporter, BlobStorer ──▶ invoke_binding ──┐
//!                                                ├──▶ Dapr sidecar HTTP API
//! PubsubReporter ────────────▶ publish_event ────┘
//! ```

mod http;

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::metrics::record_sidecar_call;

pub use http::DaprHttpClient;

/// Header carrying the sidecar API token, when one is configured.
pub const API_TOKEN_HEADER: &str = "dapr-api-token";

/// Request to invoke an output binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingRequest {
    /// Binding component name (part of the URL, not the body).
    #[serde(skip)]
    pub name: String,
    /// Payload handed to the binding.
    pub data: serde_json::Value,
    /// Binding operation, e.g. `create`.
    pub operation: String,
    /// Component specific metadata.
    pub metadata: HashMap<String, String>,
}

impl BindingRequest {
    /// Create a binding request without metadata.
    pub fn new(
        name: impl Into<String>,
        operation: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            data,
            operation: operation.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Operations this crate needs from the sidecar.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SidecarClient: Send + Sync {
    /// Publish `data` to `topic` on the pub/sub component `pubsub`.
    async fn publish_event(
        &self,
        pubsub: &str,
        topic: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> AppResult<()>;

    /// Invoke an output binding and return the response body.
    async fn invoke_binding(&self, request: BindingRequest) -> AppResult<Vec<u8>>;
}

/// Run one sidecar call under `limit`.
///
/// An elapsed limit becomes `AppError::OperationTimeout` and is reported the
/// same way as any other transport failure.
pub(crate) async fn bounded<T, F>(operation: &'static str, limit: Duration, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    let started = Instant::now();
    let result = match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::OperationTimeout(format!(
            "{operation} did not complete within {limit:?}"
        ))),
    };

    let status = match &result {
        Ok(_) => "success",
        Err(AppError::OperationTimeout(_)) => "timeout",
        Err(_) => "error",
    };
    record_sidecar_call(operation, status, started.elapsed().as_secs_f64());

    result
}
