//! HTTP implementation of [`SidecarClient`] for the Dapr sidecar API.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use super::{API_TOKEN_HEADER, BindingRequest, SidecarClient};
use crate::config::SidecarConfig;
use crate::error::{AppError, AppResult};

/// Dapr sidecar client over HTTP.
///
/// Cheap to clone; the underlying `reqwest::Client` shares its connection
/// pool. Requests are not bounded here: callers wrap each call in their own
/// timeout.
#[derive(Clone)]
pub struct DaprHttpClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl DaprHttpClient {
    /// Create a client for the sidecar described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if the HTTP client cannot be built.
    pub fn new(config: &SidecarConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build sidecar client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.http_endpoint.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    /// Base URL of the sidecar HTTP API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.post(format!("{}{path}", self.base_url));
        match &self.api_token {
            Some(token) => builder.header(API_TOKEN_HEADER, token),
            None => builder,
        }
    }
}

#[async_trait]
impl SidecarClient for DaprHttpClient {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn publish_event(
        &self,
        pubsub: &str,
        topic: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> AppResult<()> {
        let response = self
            .post(&format!("/v1.0/publish/{pubsub}/{topic}"))
            .header(CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| AppError::SidecarError(format!("publish to {pubsub}/{topic}: {e}")))?;

        read_success_body(response).await?;
        debug!("Event published");
        Ok(())
    }

    #[instrument(skip(self, request), fields(binding = %request.name, operation = %request.operation))]
    async fn invoke_binding(&self, request: BindingRequest) -> AppResult<Vec<u8>> {
        let response = self
            .post(&format!("/v1.0/bindings/{}", request.name))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::SidecarError(format!("invoke binding {}: {e}", request.name)))?;

        let body = read_success_body(response).await?;
        debug!(response_size = body.len(), "Binding invoked");
        Ok(body)
    }
}

/// Return the body of a 2xx response, or a `SidecarError` carrying the status
/// and whatever the sidecar said.
async fn read_success_body(response: reqwest::Response) -> AppResult<Vec<u8>> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| AppError::SidecarError(format!("reading sidecar response: {e}")))?;

    if status.is_success() {
        Ok(body.to_vec())
    } else {
        Err(AppError::SidecarError(format!(
            "sidecar returned {status}: {}",
            String::from_utf8_lossy(&body)
        )))
    }
}
