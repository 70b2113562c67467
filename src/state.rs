//! Shared application state for Axum handlers.
//!
//! Both states are built once at startup and never mutated afterwards, so
//! handlers share them through cheap `Arc` clones without locking.

use std::sync::Arc;

use crate::dispatch::ReportDispatcher;
use crate::report::Service;

/// State of the ingestion endpoint.
#[derive(Clone)]
pub struct EndpointState {
    /// Report service backed by the configured reporter
    pub service: Arc<dyn Service>,
}

impl EndpointState {
    pub fn new(service: Arc<dyn Service>) -> Self {
        Self { service }
    }
}

/// State of the storage worker.
#[derive(Clone)]
pub struct WorkerState {
    pub dispatcher: Arc<ReportDispatcher>,
}

impl WorkerState {
    pub fn new(dispatcher: ReportDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}
