use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::DEFAULT_REPORTER_NAME;
use crate::config::DEFAULT_CALL_TIMEOUT;
use crate::error::AppResult;
use crate::report::{Report, Reporter};
use crate::sidecar::{BindingRequest, SidecarClient, bounded};

/// Default queue operation.
pub const DEFAULT_REPORTER_QUEUE: &str = "create";

/// Settings for a [`QueueReporter`]. Empty or zero values fall back to the
/// defaults.
#[derive(Debug, Clone, Default)]
pub struct QueueReporterOptions {
    pub name: String,
    pub queue: String,
    pub timeout: Duration,
}

/// Reporter that sends reports through a queue output binding.
pub struct QueueReporter {
    client: Arc<dyn SidecarClient>,
    name: String,
    queue: String,
    timeout: Duration,
}

impl QueueReporter {
    pub fn new(client: Arc<dyn SidecarClient>, options: QueueReporterOptions) -> Self {
        Self {
            client,
            name: or_default(options.name, DEFAULT_REPORTER_NAME),
            queue: or_default(options.queue, DEFAULT_REPORTER_QUEUE),
            timeout: if options.timeout.is_zero() {
                DEFAULT_CALL_TIMEOUT
            } else {
                options.timeout
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Reporter for QueueReporter {
    #[instrument(skip(self, report), fields(id = %report.id, binding = %self.name))]
    async fn run(&self, report: Report) -> AppResult<()> {
        let request = BindingRequest::new(&self.name, &self.queue, report.to_value()?)
            .with_metadata("queueName", &self.name);

        bounded("binding", self.timeout, self.client.invoke_binding(request)).await?;
        debug!("Report queued");
        Ok(())
    }
}

pub(super) fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::sidecar::MockSidecarClient;

    #[test]
    fn test_empty_options_use_defaults() {
        let reporter = QueueReporter::new(
            Arc::new(MockSidecarClient::new()),
            QueueReporterOptions::default(),
        );
        assert_eq!(reporter.name(), "reports");
        assert_eq!(reporter.queue(), "create");
        assert_eq!(reporter.timeout(), DEFAULT_CALL_TIMEOUT);
    }

    #[test]
    fn test_options_override_defaults() {
        let reporter = QueueReporter::new(
            Arc::new(MockSidecarClient::new()),
            QueueReporterOptions {
                name: "incoming".to_string(),
                queue: "enqueue".to_string(),
                timeout: Duration::from_secs(3),
            },
        );
        assert_eq!(reporter.name(), "incoming");
        assert_eq!(reporter.queue(), "enqueue");
        assert_eq!(reporter.timeout(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_run_sends_report_with_queue_metadata() {
        let mut client = MockSidecarClient::new();
        client
            .expect_invoke_binding()
            .withf(|req| {
                req.name == "reports"
                    && req.operation == "create"
                    && req.metadata.get("queueName").map(String::as_str) == Some("reports")
                    && req.data == serde_json::json!({"id": "123", "data": "ZGF0YQ=="})
            })
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let reporter = QueueReporter::new(Arc::new(client), QueueReporterOptions::default());
        reporter.run(Report::new("123", "data")).await.unwrap();
    }

    #[tokio::test]
    async fn test_run_surfaces_sidecar_error() {
        let mut client = MockSidecarClient::new();
        client
            .expect_invoke_binding()
            .returning(|_| Err(AppError::SidecarError("queue full".to_string())));

        let reporter = QueueReporter::new(Arc::new(client), QueueReporterOptions::default());
        let err = reporter.run(Report::new("1", "x")).await.unwrap_err();
        assert!(matches!(err, AppError::SidecarError(msg) if msg == "queue full"));
    }
}
