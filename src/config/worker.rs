//! Configuration for the storage worker.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::{
    DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_REQUEST_BODY_SIZE, SidecarConfig, parse_secs, parse_var,
    process_env, require_non_empty, require_positive, string_var,
};
use crate::error::{AppError, AppResult};

/// How the worker receives reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerMode {
    /// Input binding callback.
    #[default]
    Queue,
    /// Pub/sub topic subscription.
    Pubsub,
}

impl FromStr for WorkerMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queue" => Ok(Self::Queue),
            "pubsub" => Ok(Self::Pubsub),
            other => Err(AppError::ConfigError(format!(
                "unknown worker type: {other:?}"
            ))),
        }
    }
}

impl fmt::Display for WorkerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queue => f.write_str("queue"),
            Self::Pubsub => f.write_str("pubsub"),
        }
    }
}

/// Storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorerKind {
    #[default]
    Blob,
}

impl FromStr for StorerKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blob" => Ok(Self::Blob),
            other => Err(AppError::ConfigError(format!(
                "unknown storer type: {other:?}"
            ))),
        }
    }
}

impl fmt::Display for StorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob => f.write_str("blob"),
        }
    }
}

/// Storer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorerConfig {
    pub kind: StorerKind,
    /// Output binding name (default: "reports-output")
    pub name: String,
    /// Bound on one sidecar call (default: 10 seconds)
    pub timeout: Duration,
}

impl Default for StorerConfig {
    fn default() -> Self {
        Self {
            kind: StorerKind::Blob,
            name: "reports-output".to_string(),
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Storage worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 3001)
    pub port: u16,

    /// Maximum request body size in bytes (default: 1 MiB)
    pub max_request_body_size: usize,

    // =========================================================================
    // Input Configuration
    // =========================================================================
    pub mode: WorkerMode,

    /// Input binding or pub/sub component name (default: "reports").
    /// Also the route the sidecar delivers to.
    pub name: String,

    /// Queue name in queue mode (default: "create")
    pub queue: String,

    /// Topic in pub/sub mode (default: "create")
    pub topic: String,

    // =========================================================================
    // Output Configuration
    // =========================================================================
    pub storer: StorerConfig,

    pub sidecar: SidecarConfig,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Port for Prometheus metrics endpoint (default: 0 = disabled)
    pub metrics_port: u16,
}

impl WorkerConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if any value is malformed or fails
    /// validation.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(&process_env())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: &F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storer = StorerConfig::default();

        let config = Self {
            host: string_var(lookup, "WORKER_HOST", "0.0.0.0"),
            port: parse_var(lookup, "WORKER_PORT", 3001)?,
            max_request_body_size: parse_var(
                lookup,
                "WORKER_MAX_REQUEST_BODY_SIZE",
                DEFAULT_MAX_REQUEST_BODY_SIZE,
            )?,

            mode: parse_var(lookup, "WORKER_TYPE", WorkerMode::default())?,
            name: string_var(lookup, "WORKER_NAME", "reports"),
            queue: string_var(lookup, "WORKER_QUEUE", "create"),
            topic: string_var(lookup, "WORKER_TOPIC", "create"),

            storer: StorerConfig {
                kind: parse_var(lookup, "WORKER_STORER_TYPE", storer.kind)?,
                name: string_var(lookup, "WORKER_STORER_NAME", &storer.name),
                timeout: parse_secs(lookup, "WORKER_STORER_TIMEOUT_SECS", storer.timeout)?,
            },
            sidecar: SidecarConfig::from_lookup(lookup)?,

            metrics_port: parse_var(lookup, "WORKER_METRICS_PORT", 0)?,
        };

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        require_non_empty(&self.name, "WORKER_NAME")?;
        require_non_empty(&self.queue, "WORKER_QUEUE")?;
        require_non_empty(&self.topic, "WORKER_TOPIC")?;
        require_non_empty(&self.storer.name, "WORKER_STORER_NAME")?;
        require_positive(self.storer.timeout, "WORKER_STORER_TIMEOUT_SECS")?;

        // The name doubles as a route segment.
        if self.name.contains(['/', '{', '}', '*']) {
            return Err(AppError::ConfigError(format!(
                "WORKER_NAME must be a single path segment: {:?}",
                self.name
            )));
        }

        if self.max_request_body_size == 0 {
            return Err(AppError::ConfigError(
                "WORKER_MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the metrics endpoint address, or `None` when metrics are disabled.
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        (self.metrics_port > 0)
            .then(|| std::net::SocketAddr::from(([0, 0, 0, 0], self.metrics_port)))
    }
}
