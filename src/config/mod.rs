//! Application configuration loaded from environment variables.
//!
//! # Configuration Hierarchy
//!
//! All configuration is loaded from environment variables with sensible defaults
//! for development. In production, configure via environment variables or a `.env` file.
//!
//! - [`EndpointConfig`]: `ENDPOINT_*` variables for the ingestion service
//! - [`WorkerConfig`]: `WORKER_*` variables for the storage worker
//! - [`SidecarConfig`]: `DAPR_*` variables shared by both
//!
//! # Security Configuration
//!
//! - `ENDPOINT_SECURITY_KEYS`: Comma-separated list of accepted API keys (required)
//!
//! # Testing
//!
//! Every loader has a `from_lookup` twin that takes the variable source as a
//! closure, so tests build configurations from a map instead of mutating the
//! process environment.

mod endpoint;
mod worker;

use std::collections::HashSet;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub use endpoint::{EndpointConfig, ReporterConfig, ReporterKind};
pub use worker::{StorerConfig, StorerKind, WorkerConfig, WorkerMode};

/// Default Dapr sidecar HTTP port.
pub const DEFAULT_DAPR_HTTP_PORT: u16 = 3500;

/// Default bound for one outbound sidecar call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Default maximum request body size (1 MiB).
pub const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024;

/// Connection settings for the Dapr sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarConfig {
    /// Base URL of the sidecar HTTP API, e.g. `http://localhost:3500`
    pub http_endpoint: String,

    /// Token sent as `dapr-api-token` when the sidecar requires one
    pub api_token: Option<String>,
}

impl SidecarConfig {
    /// Resolve sidecar settings.
    ///
    /// `DAPR_HTTP_ENDPOINT` wins when set; otherwise the endpoint is built from
    /// `DAPR_HTTP_PORT` on localhost.
    pub(crate) fn from_lookup<F>(lookup: &F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_endpoint = match non_empty(lookup, "DAPR_HTTP_ENDPOINT") {
            Some(endpoint) => endpoint,
            None => {
                let port: u16 = parse_var(lookup, "DAPR_HTTP_PORT", DEFAULT_DAPR_HTTP_PORT)?;
                format!("http://localhost:{port}")
            }
        };

        Ok(Self {
            http_endpoint,
            api_token: non_empty(lookup, "DAPR_API_TOKEN"),
        })
    }
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            http_endpoint: format!("http://localhost:{DEFAULT_DAPR_HTTP_PORT}"),
            api_token: None,
        }
    }
}

/// Process environment as a lookup function.
///
/// `.env` is loaded once by the binaries before any config is read.
pub(crate) fn process_env() -> impl Fn(&str) -> Option<String> {
    |name: &str| env::var(name).ok()
}

/// Parse a variable into the specified type with a default value.
pub(crate) fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match non_empty(lookup, name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| AppError::ConfigError(format!("Invalid {name}: {e}"))),
        None => Ok(default),
    }
}

/// Parse a whole-second duration variable.
pub(crate) fn parse_secs<F>(lookup: &F, name: &str, default: Duration) -> AppResult<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    parse_var(lookup, name, default.as_secs()).map(Duration::from_secs)
}

/// Read a string variable, falling back to `default` when unset or empty.
pub(crate) fn string_var<F>(lookup: &F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, name).unwrap_or_else(|| default.to_string())
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}

/// Parse a comma-separated key list into a set.
///
/// All whitespace is stripped and empty entries are dropped.
pub fn parse_key_set(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|k| k.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|k| !k.is_empty())
        .collect()
}

pub(crate) fn require_non_empty(value: &str, name: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::ConfigError(format!("{name} must not be empty")));
    }
    Ok(())
}

pub(crate) fn require_positive(value: Duration, name: &str) -> AppResult<()> {
    if value.is_zero() {
        return Err(AppError::ConfigError(format!(
            "{name} must be greater than 0"
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_process_env_reads_process_environment() {
        let lookup = process_env();
        assert_eq!(lookup("PATH"), env::var("PATH").ok());
        assert_eq!(lookup("REPORT_RELAY_SURELY_UNSET_VARIABLE"), None);
    }

    #[test]
    fn test_parse_key_set_strips_whitespace() {
        let keys = parse_key_set(" key-1 , key 2,,key-3 ");
        assert_eq!(keys.len(), 3);
        assert!(keys.contains("key-1"));
        assert!(keys.contains("key2"));
        assert!(keys.contains("key-3"));
    }

    #[test]
    fn test_parse_key_set_empty_input() {
        assert!(parse_key_set("").is_empty());
        assert!(parse_key_set(" , ,").is_empty());
    }

    #[test]
    fn test_sidecar_defaults_to_local_port() {
        let config = SidecarConfig::from_lookup(&lookup_from(&[])).unwrap();
        assert_eq!(config, SidecarConfig::default());
    }

    #[test]
    fn test_sidecar_port_override() {
        let config =
            SidecarConfig::from_lookup(&lookup_from(&[("DAPR_HTTP_PORT", "3601")])).unwrap();
        assert_eq!(config.http_endpoint, "http://localhost:3601");
    }

    #[test]
    fn test_sidecar_endpoint_wins_over_port() {
        let config = SidecarConfig::from_lookup(&lookup_from(&[
            ("DAPR_HTTP_ENDPOINT", "http://dapr:3500"),
            ("DAPR_HTTP_PORT", "3601"),
            ("DAPR_API_TOKEN", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.http_endpoint, "http://dapr:3500");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let result = SidecarConfig::from_lookup(&lookup_from(&[("DAPR_HTTP_PORT", "abc")]));
        let err = result.unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().contains("DAPR_HTTP_PORT"));
    }

    #[test]
    fn test_parse_secs() {
        let lookup = lookup_from(&[("TIMEOUT_SECS", "3")]);
        assert_eq!(
            parse_secs(&lookup, "TIMEOUT_SECS", DEFAULT_CALL_TIMEOUT).unwrap(),
            Duration::from_secs(3)
        );
        assert_eq!(
            parse_secs(&lookup, "OTHER_SECS", DEFAULT_CALL_TIMEOUT).unwrap(),
            DEFAULT_CALL_TIMEOUT
        );
    }
}
