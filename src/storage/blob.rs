use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::config::DEFAULT_CALL_TIMEOUT;
use crate::error::AppResult;
use crate::report::{Report, Storer};
use crate::sidecar::{BindingRequest, SidecarClient, bounded};

/// Default output binding name.
pub const DEFAULT_STORER_NAME: &str = "reports-output";

/// Settings for a [`BlobStorer`]. Empty or zero values fall back to the
/// defaults.
#[derive(Debug, Clone, Default)]
pub struct BlobStorerOptions {
    pub name: String,
    pub timeout: Duration,
}

/// Storer that writes each report as `<id>.json` through a blob output
/// binding.
pub struct BlobStorer {
    client: Arc<dyn SidecarClient>,
    name: String,
    timeout: Duration,
}

impl BlobStorer {
    pub fn new(client: Arc<dyn SidecarClient>, options: BlobStorerOptions) -> Self {
        Self {
            client,
            name: if options.name.trim().is_empty() {
                DEFAULT_STORER_NAME.to_string()
            } else {
                options.name
            },
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

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Storer for BlobStorer {
    #[instrument(skip(self, report), fields(id = %report.id, binding = %self.name))]
    async fn store(&self, report: Report) -> AppResult<()> {
        let request = BindingRequest::new(&self.name, "create", report.to_value()?)
            .with_metadata("key", &report.id)
            .with_metadata("blobName", format!("{}.json", report.id));

        bounded("binding", self.timeout, self.client.invoke_binding(request)).await?;
        debug!("Report stored");
        Ok(())
    }
}
