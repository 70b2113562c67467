//! API key authentication middleware.
//!
//! Requests must carry one of the configured keys in the `X-API-Key` header:
//!
//! ```bash
//! curl -H "X-API-Key: your-secret-key" -d '{"id":"1","data":"x"}' http://localhost:3000/reports
//! ```
//!
//! | Header                  | Response                         |
//! |-------------------------|----------------------------------|
//! | absent or empty         | 401 `missing auth header`        |
//! | not in the key set      | 401 `unauthorized`               |
//! | in the key set          | passed to the inner service      |
//!
//! The layer is attached per route, so unprotected routes such as `/health`
//! never see it.

use std::collections::HashSet;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use subtle::{Choice, ConstantTimeEq};
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Header name for API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Message returned when no key is supplied.
pub const MISSING_AUTH_HEADER: &str = "missing auth header";

/// Message returned when the key is not accepted.
pub const UNAUTHORIZED: &str = "unauthorized";

/// Immutable set of accepted API keys.
///
/// Membership is checked against every key with a constant-time comparison,
/// so response timing does not reveal how much of a key matched or which key
/// was closest.
#[derive(Debug, Clone)]
pub struct SecurityKeys {
    keys: Arc<Vec<Vec<u8>>>,
}

impl SecurityKeys {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let unique: HashSet<String> = keys.into_iter().map(Into::into).collect();
        Self {
            keys: Arc::new(unique.into_iter().map(String::into_bytes).collect()),
        }
    }

    /// Returns `true` if `candidate` is one of the accepted keys.
    pub fn contains(&self, candidate: &str) -> bool {
        let candidate = candidate.as_bytes();
        self.keys
            .iter()
            .fold(Choice::from(0), |found, key| found | key.as_slice().ct_eq(candidate))
            .into()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<HashSet<String>> for SecurityKeys {
    fn from(keys: HashSet<String>) -> Self {
        Self::new(keys)
    }
}

/// API key authentication layer.
#[derive(Clone)]
pub struct ApiKeyAuth {
    keys: SecurityKeys,
}

impl ApiKeyAuth {
    pub fn new(keys: SecurityKeys) -> Self {
        Self { keys }
    }
}

impl<S> Layer<S> for ApiKeyAuth {
    type Service = ApiKeyAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiKeyAuthService {
            inner,
            keys: self.keys.clone(),
        }
    }
}

/// API key authentication service wrapper.
#[derive(Clone)]
pub struct ApiKeyAuthService<S> {
    inner: S,
    keys: SecurityKeys,
}

impl<S> Service<Request<Body>> for ApiKeyAuthService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let verdict = check_api_key(&req, &self.keys);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            match verdict {
                KeyCheck::Accepted => {
                    debug!("API key authentication successful");
                    inner.call(req).await
                }
                KeyCheck::Missing => {
                    warn!(path = %req.uri().path(), "Missing API key");
                    Ok(unauthorized_response(MISSING_AUTH_HEADER))
                }
                KeyCheck::Rejected => {
                    warn!(path = %req.uri().path(), "Invalid API key provided");
                    Ok(unauthorized_response(UNAUTHORIZED))
                }
            }
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyCheck {
    Accepted,
    Missing,
    Rejected,
}

fn check_api_key<B>(req: &Request<B>, keys: &SecurityKeys) -> KeyCheck {
    let Some(value) = req.headers().get(API_KEY_HEADER) else {
        return KeyCheck::Missing;
    };

    if value.is_empty() {
        return KeyCheck::Missing;
    }

    // A key that is not visible ASCII can never match a configured key.
    match value.to_str() {
        Ok(key) if keys.contains(key) => KeyCheck::Accepted,
        _ => KeyCheck::Rejected,
    }
}

/// Build an unauthorized (401) response.
fn unauthorized_response(message: &str) -> Response<Body> {
    (
        StatusCode::UNAUTHORIZED,
        [
            ("WWW-Authenticate", "API-Key"),
            ("Content-Type", "application/json"),
        ],
        serde_json::json!({ "error": "unauthorized", "message": message }).to_string(),
    )
        .into_response()
}
