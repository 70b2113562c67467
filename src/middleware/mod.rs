//! HTTP middleware.
//!
//! - **API Key Authentication**: constant-time membership test against the
//!   configured key set, attached to `/reports` only
//! - **Request ID**: generation and propagation for log correlation
//!
//! ```text
//! Request → Request ID → Trace → [Auth on /reports] → Handler → Response
//!                ↓                       ↓
//!        X-Request-Id header       401 Unauthorized
//! ```

pub mod auth;
pub mod request_id;

pub use auth::{API_KEY_HEADER, ApiKeyAuth, SecurityKeys};
pub use request_id::{REQUEST_ID_HEADER, RequestIdLayer};
