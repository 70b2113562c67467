//! Reporters: how the endpoint hands a report to the worker.
//!
//! Both transports go through the sidecar and differ only in the call they
//! make:
//!
//! - [`QueueReporter`]: output binding on a queue
//! - [`PubsubReporter`]: publish to a topic
//!
//! [`setup_reporter`] picks one from configuration at startup.

mod pubsub;
mod queue;

use std::sync::Arc;

use tracing::info;

use crate::config::{ReporterConfig, ReporterKind};
use crate::report::{ReportService, Reporter};
use crate::sidecar::SidecarClient;

pub use pubsub::{PubsubReporter, PubsubReporterOptions};
pub use queue::{QueueReporter, QueueReporterOptions};

/// Default component name for both transports.
pub const DEFAULT_REPORTER_NAME: &str = "reports";

/// Build the endpoint's report service from configuration.
pub fn setup_reporter(
    config: &ReporterConfig,
    client: Arc<dyn SidecarClient>,
) -> ReportService<dyn Reporter> {
    let reporter: Arc<dyn Reporter> = match config.kind {
        ReporterKind::Queue => Arc::new(QueueReporter::new(
            client,
            QueueReporterOptions {
                name: config.name.clone(),
                queue: config.queue.clone(),
                timeout: config.timeout,
            },
        )),
        ReporterKind::Pubsub => Arc::new(PubsubReporter::new(
            client,
            PubsubReporterOptions {
                name: config.name.clone(),
                topic: config.topic.clone(),
                timeout: config.timeout,
            },
        )),
    };

    info!(
        kind = %config.kind,
        name = %config.name,
        timeout_secs = config.timeout.as_secs(),
        "Reporter configured"
    );

    ReportService::with_reporter(reporter)
}
