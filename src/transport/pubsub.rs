use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::DEFAULT_REPORTER_NAME;
use super::queue::or_default;
use crate::config::DEFAULT_CALL_TIMEOUT;
use crate::error::AppResult;
use crate::report::{Report, Reporter};
use crate::sidecar::{SidecarClient, bounded};

/// Default topic.
pub const DEFAULT_REPORTER_TOPIC: &str = "create";

/// Content type of published reports. Subscribers receive the event data as
/// a JSON string holding the encoded report.
pub const PUBLISH_CONTENT_TYPE: &str = "text/plain";

/// Settings for a [`PubsubReporter`]. Empty or zero values fall back to the
/// defaults.
#[derive(Debug, Clone, Default)]
pub struct PubsubReporterOptions {
    pub name: String,
    pub topic: String,
    pub timeout: Duration,
}

/// Reporter that publishes reports to a pub/sub topic.
pub struct PubsubReporter {
    client: Arc<dyn SidecarClient>,
    name: String,
    topic: String,
    timeout: Duration,
}

impl PubsubReporter {
    pub fn new(client: Arc<dyn SidecarClient>, options: PubsubReporterOptions) -> Self {
        Self {
            client,
            name: or_default(options.name, DEFAULT_REPORTER_NAME),
            topic: or_default(options.topic, DEFAULT_REPORTER_TOPIC),
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

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Reporter for PubsubReporter {
    #[instrument(skip(self, report), fields(id = %report.id, pubsub = %self.name, topic = %self.topic))]
    async fn run(&self, report: Report) -> AppResult<()> {
        let payload = report.to_json()?;

        bounded(
            "publish",
            self.timeout,
            self.client
                .publish_event(&self.name, &self.topic, payload, PUBLISH_CONTENT_TYPE),
        )
        .await?;
        debug!("Report published");
        Ok(())
    }
}
