//! Capability interfaces and the report service façade.
//!
//! Ingestion and worker code depend only on [`Service::create`]. Which
//! transport or store sits behind it is decided once at startup by the
//! factories in [`crate::transport`] and [`crate::storage`].

use std::sync::Arc;

use async_trait::async_trait;

use super::Report;
use crate::error::AppResult;

/// Sends one report into the messaging layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Dispatch the report. Implementations bound the call by their own
    /// configured timeout.
    async fn run(&self, report: Report) -> AppResult<()>;
}

/// Persists one report.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Storer: Send + Sync {
    /// Persist the report. Success means the sidecar acknowledged the write.
    async fn store(&self, report: Report) -> AppResult<()>;
}

/// Creates one report, whatever capability backs it.
#[async_trait]
pub trait Service: Send + Sync {
    async fn create(&self, report: Report) -> AppResult<()>;
}

/// Owner of exactly one capability: a [`Reporter`] on the endpoint side, a
/// [`Storer`] on the worker side.
///
/// Holds no per-call state, so a single instance is shared by every in-flight
/// request.
pub struct ReportService<C: ?Sized> {
    capability: Arc<C>,
}

impl<C: ?Sized> Clone for ReportService<C> {
    fn clone(&self) -> Self {
        Self {
            capability: self.capability.clone(),
        }
    }
}

impl ReportService<dyn Reporter> {
    /// Build a service that forwards reports to a transport.
    pub fn with_reporter(reporter: Arc<dyn Reporter>) -> Self {
        Self {
            capability: reporter,
        }
    }
}

impl ReportService<dyn Storer> {
    /// Build a service that persists reports.
    pub fn with_storer(storer: Arc<dyn Storer>) -> Self {
        Self { capability: storer }
    }
}

#[async_trait]
impl Service for ReportService<dyn Reporter> {
    async fn create(&self, report: Report) -> AppResult<()> {
        self.capability.run(report).await
    }
}

#[async_trait]
impl Service for ReportService<dyn Storer> {
    async fn create(&self, report: Report) -> AppResult<()> {
        self.capability.store(report).await
    }
}
