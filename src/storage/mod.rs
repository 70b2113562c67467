//! Storers: where the worker persists reports.

mod blob;

use std::sync::Arc;

use tracing::info;

use crate::config::{StorerConfig, StorerKind};
use crate::report::{ReportService, Storer};
use crate::sidecar::SidecarClient;

pub use blob::{BlobStorer, BlobStorerOptions};

/// Build the worker's report service from configuration.
pub fn setup_storer(
    config: &StorerConfig,
    client: Arc<dyn SidecarClient>,
) -> ReportService<dyn Storer> {
    let storer: Arc<dyn Storer> = match config.kind {
        StorerKind::Blob => Arc::new(BlobStorer::new(
            client,
            BlobStorerOptions {
                name: config.name.clone(),
                timeout: config.timeout,
            },
        )),
    };

    info!(
        kind = %config.kind,
        name = %config.name,
        timeout_secs = config.timeout.as_secs(),
        "Storer configured"
    );

    ReportService::with_storer(storer)
}
