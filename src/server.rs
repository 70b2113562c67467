//! HTTP server lifecycle shared by both binaries.
//!
//! ```text
//! Created ──run──▶ Listening ──signal──▶ Draining ──▶ Stopped
//!                      │                                 ▲
//!                      └──── listener exits early ───────┘ (fatal)
//! ```
//!
//! Each transition happens once. Draining stops accepting connections and
//! lets in-flight requests finish. The wait is bounded by the shutdown
//! timeout; past it the server stops waiting and reports a drain error.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::shutdown::ShutdownSignal;

/// Upper bound on the drain phase.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a [`Server`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Listening,
    Draining,
    Stopped,
}

/// Outcome of a completed [`Server::run`].
#[derive(Debug)]
pub struct Stopped {
    /// The signal that ended serving.
    pub signal: ShutdownSignal,
    /// Set when draining failed or overran the timeout. Already logged.
    pub drain_error: Option<AppError>,
}

/// A bound listener plus the router it will serve.
pub struct Server {
    kind: &'static str,
    listener: TcpListener,
    router: Router,
    shutdown_timeout: Duration,
    state: watch::Sender<LifecycleState>,
}

impl Server {
    /// Bind `addr` for the service named `kind` (used in log lines).
    ///
    /// # Errors
    ///
    /// Returns `AppError::ServerError` if the address cannot be bound.
    pub async fn bind(kind: &'static str, addr: &str, router: Router) -> AppResult<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::ServerError(format!("Failed to bind to {addr}: {e}")))?;

        let (state, _) = watch::channel(LifecycleState::Created);

        Ok(Self {
            kind,
            listener,
            router,
            shutdown_timeout: SHUTDOWN_TIMEOUT,
            state,
        })
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> AppResult<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| AppError::ServerError(format!("Failed to read local address: {e}")))
    }

    /// Observe lifecycle transitions.
    pub fn state_watcher(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Serve until `signal` resolves, then drain.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ServerError` if the listener stops before a signal
    /// arrives. Drain failures are not errors; they are reported in
    /// [`Stopped::drain_error`].
    pub async fn run<F>(self, signal: F) -> AppResult<Stopped>
    where
        F: Future<Output = ShutdownSignal>,
    {
        let Self {
            kind,
            listener,
            router,
            shutdown_timeout,
            state,
        } = self;

        let address = listener
            .local_addr()
            .map_err(|e| AppError::ServerError(format!("Failed to read local address: {e}")))?;

        let token = CancellationToken::new();
        let serve = axum::serve(listener, router)
            .with_graceful_shutdown(token.clone().cancelled_owned());
        let mut task = tokio::spawn(async move { serve.await });

        state.send_replace(LifecycleState::Listening);
        info!(kind, %address, "Server started.");

        let signal = tokio::select! {
            signal = signal => signal,
            exited = &mut task => {
                let e = match exited {
                    Ok(Ok(())) => AppError::ServerError("listener exited unexpectedly".to_string()),
                    Ok(Err(e)) => AppError::ServerError(e.to_string()),
                    Err(e) => AppError::ServerError(format!("listener task failed: {e}")),
                };
                error!(kind, error = %e, "Server failed to start.");
                state.send_replace(LifecycleState::Stopped);
                return Err(e);
            }
        };

        state.send_replace(LifecycleState::Draining);
        token.cancel();

        let drain_error = match tokio::time::timeout(shutdown_timeout, &mut task).await {
            Ok(Ok(Ok(()))) => None,
            Ok(Ok(Err(e))) => Some(AppError::ServerError(e.to_string())),
            Ok(Err(e)) => Some(AppError::ServerError(format!("listener task failed: {e}"))),
            Err(_) => {
                task.abort();
                Some(AppError::OperationTimeout(format!(
                    "connections still open after {shutdown_timeout:?}"
                )))
            }
        };

        if let Some(e) = &drain_error {
            error!(kind, error = %e, "Error stopping server.");
        }

        state.send_replace(LifecycleState::Stopped);
        info!(kind, reason = %signal, "Server stopped.");

        Ok(Stopped {
            signal,
            drain_error,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::routing::get;

    fn router() -> Router {
        Router::new().route("/", get(|| async { "ok" }))
    }

    #[tokio::test]
    async fn test_bind_failure_is_server_error() {
        let taken = Server::bind("test", "127.0.0.1:0", router()).await.unwrap();
        let addr = taken.local_addr().unwrap().to_string();

        let err = Server::bind("test", &addr, router()).await.err().unwrap();
        assert!(matches!(err, AppError::ServerError(_)));
    }

    #[tokio::test]
    async fn test_run_walks_through_every_state() {
        let server = Server::bind("test", "127.0.0.1:0", router()).await.unwrap();
        let mut states = server.state_watcher();
        assert_eq!(*states.borrow(), LifecycleState::Created);

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let run = tokio::spawn(server.run(async move {
            let _ = rx.await;
            ShutdownSignal::Interrupt
        }));

        states
            .wait_for(|s| *s == LifecycleState::Listening)
            .await
            .unwrap();
        tx.send(()).unwrap();

        let stopped = run.await.unwrap().unwrap();
        assert_eq!(stopped.signal, ShutdownSignal::Interrupt);
        assert!(stopped.drain_error.is_none());
        assert_eq!(*states.borrow(), LifecycleState::Stopped);
    }
}
