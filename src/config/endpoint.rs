//! Configuration for the ingestion endpoint.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::{
    DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_REQUEST_BODY_SIZE, SidecarConfig, parse_key_set, parse_secs,
    parse_var, process_env, require_non_empty, require_positive, string_var,
};
use crate::error::{AppError, AppResult};

/// Transport used by the endpoint to hand reports to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReporterKind {
    /// Output binding on a queue (point-to-point).
    #[default]
    Queue,
    /// Publish to a pub/sub topic.
    Pubsub,
}

impl FromStr for ReporterKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queue" => Ok(Self::Queue),
            "pubsub" => Ok(Self::Pubsub),
            other => Err(AppError::ConfigError(format!(
                "unknown reporter type: {other:?}"
            ))),
        }
    }
}

impl fmt::Display for ReporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queue => f.write_str("queue"),
            Self::Pubsub => f.write_str("pubsub"),
        }
    }
}

/// Reporter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterConfig {
    /// Which transport to use (default: queue)
    pub kind: ReporterKind,
    /// Binding or pub/sub component name (default: "reports")
    pub name: String,
    /// Queue operation used in queue mode (default: "create")
    pub queue: String,
    /// Topic used in pub/sub mode (default: "create")
    pub topic: String,
    /// Bound on one sidecar call (default: 10 seconds)
    pub timeout: Duration,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            kind: ReporterKind::Queue,
            name: "reports".to_string(),
            queue: "create".to_string(),
            topic: "create".to_string(),
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Ingestion endpoint configuration.
///
/// # Example
///
/// ```rust,ignore
/// let config = EndpointConfig::from_env()?;
/// println!("Endpoint will listen on {}", config.server_addr());
/// ```
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 3000)
    pub port: u16,

    /// Maximum request body size in bytes (default: 1 MiB)
    pub max_request_body_size: usize,

    // =========================================================================
    // Security Configuration
    // =========================================================================
    /// Accepted values of the `X-API-Key` header
    pub security_keys: HashSet<String>,

    // =========================================================================
    // Transport Configuration
    // =========================================================================
    pub reporter: ReporterConfig,

    pub sidecar: SidecarConfig,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Port for Prometheus metrics endpoint (default: 0 = disabled)
    pub metrics_port: u16,
}

impl EndpointConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if any value is malformed or fails
    /// validation (e.g. no security keys configured).
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(&process_env())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: &F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ReporterConfig::default();

        let config = Self {
            // Server
            host: string_var(lookup, "ENDPOINT_HOST", "0.0.0.0"),
            port: parse_var(lookup, "ENDPOINT_PORT", 3000)?,
            max_request_body_size: parse_var(
                lookup,
                "ENDPOINT_MAX_REQUEST_BODY_SIZE",
                DEFAULT_MAX_REQUEST_BODY_SIZE,
            )?,

            // Security
            security_keys: lookup("ENDPOINT_SECURITY_KEYS")
                .map(|raw| parse_key_set(&raw))
                .unwrap_or_default(),

            // Transport
            reporter: ReporterConfig {
                kind: parse_var(lookup, "ENDPOINT_REPORTER_TYPE", defaults.kind)?,
                name: string_var(lookup, "ENDPOINT_REPORTER_NAME", &defaults.name),
                queue: string_var(lookup, "ENDPOINT_REPORTER_QUEUE", &defaults.queue),
                topic: string_var(lookup, "ENDPOINT_REPORTER_TOPIC", &defaults.topic),
                timeout: parse_secs(lookup, "ENDPOINT_REPORTER_TIMEOUT_SECS", defaults.timeout)?,
            },
            sidecar: SidecarConfig::from_lookup(lookup)?,

            // Observability
            metrics_port: parse_var(lookup, "ENDPOINT_METRICS_PORT", 0)?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    fn validate(&self) -> AppResult<()> {
        if self.security_keys.is_empty() {
            return Err(AppError::ConfigError(
                "ENDPOINT_SECURITY_KEYS must contain at least one key".to_string(),
            ));
        }

        require_non_empty(&self.reporter.name, "ENDPOINT_REPORTER_NAME")?;
        require_non_empty(&self.reporter.queue, "ENDPOINT_REPORTER_QUEUE")?;
        require_non_empty(&self.reporter.topic, "ENDPOINT_REPORTER_TOPIC")?;
        require_positive(self.reporter.timeout, "ENDPOINT_REPORTER_TIMEOUT_SECS")?;

        if self.max_request_body_size == 0 {
            return Err(AppError::ConfigError(
                "ENDPOINT_MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
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
        (self.metrics_port > 0).then(|| std::net::SocketAddr::from(([0, 0, 0, 0], self.metrics_port)))
    }
}
