//! # Report Relay
//!
//! Two small services that move reports through a Dapr sidecar:
//!
//! - **endpoint**: accepts `POST /reports` from authenticated clients and
//!   hands each report to the sidecar, over a queue binding or a pub/sub topic
//! - **worker**: receives those reports back from its sidecar and persists
//!   them through a blob output binding
//!
//! ## Architecture
//!
//! ```text
//!  client ──POST /reports──▶ endpoint ──▶ sidecar ══ queue / topic ══▶ sidecar ──▶ worker
//!                                                                                    │
//!                                                      blob store ◀── sidecar ◀──────┘
//! ```
//!
//! Inside each binary:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Request ID → Trace → Auth on /reports)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (reports, health, sidecar callbacks)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Service (ReportService over a Reporter or a Storer)        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SidecarClient (DaprHttpClient)                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use report_relay::{DaprHttpClient, EndpointConfig, EndpointState, SecurityKeys, Server};
//! use report_relay::{endpoint_router, setup_reporter, shutdown_signal};
//!
//! #[tokio::main]
//! async fn main() -> report_relay::AppResult<()> {
//!     let config = EndpointConfig::from_env()?;
//!     let client = Arc::new(DaprHttpClient::new(&config.sidecar)?);
//!     let service = setup_reporter(&config.reporter, client);
//!
//!     let router = endpoint_router(
//!         EndpointState::new(Arc::new(service)),
//!         SecurityKeys::from(config.security_keys.clone()),
//!         config.max_request_body_size,
//!     );
//!
//!     Server::bind("endpoint", &config.server_addr(), router)
//!         .await?
//!         .run(shutdown_signal())
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod report;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod sidecar;
pub mod state;
pub mod storage;
pub mod transport;

// Re-exports for convenience
pub use config::{EndpointConfig, WorkerConfig};
pub use dispatch::ReportDispatcher;
pub use error::{AppError, AppResult};
pub use middleware::SecurityKeys;
pub use report::{Report, ReportService, Service};
pub use routes::{endpoint_router, worker_router};
pub use server::{LifecycleState, Server, Stopped};
pub use shutdown::{ShutdownSignal, shutdown_signal};
pub use sidecar::{DaprHttpClient, SidecarClient};
pub use state::{EndpointState, WorkerState};
pub use storage::setup_storer;
pub use transport::setup_reporter;
