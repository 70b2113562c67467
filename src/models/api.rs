use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::report::Report;

/// Body of `POST /reports`.
///
/// `data` is plain text; its UTF-8 bytes become the report payload. Missing
/// fields default to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub data: String,
}

impl From<ReportRequest> for Report {
    fn from(request: ReportRequest) -> Self {
        Report::new(request.id, request.data.into_bytes())
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status
    pub status: String,
    /// Which binary answered: `endpoint` or `worker`
    pub service: String,
    /// Service version
    pub version: String,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_report_request_defaults_missing_fields() {
        let request: ReportRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, ReportRequest::default());

        let request: ReportRequest = serde_json::from_str(r#"{"id":"7"}"#).unwrap();
        assert_eq!(request.id, "7");
        assert!(request.data.is_empty());
    }

    #[test]
    fn test_report_request_rejects_non_string_data() {
        assert!(serde_json::from_str::<ReportRequest>(r#"{"id":"1","data":[1,2]}"#).is_err());
    }

    #[test]
    fn test_report_request_into_report_uses_utf8_bytes() {
        let report: Report = ReportRequest {
            id: "123".to_string(),
            data: "data".to_string(),
        }
        .into();
        assert_eq!(report, Report::new("123", b"data".to_vec()));
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            service: "endpoint".to_string(),
            version: "0.1.0".to_string(),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&response).expect("Serialization should succeed");
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"service\":\"endpoint\""));
    }
}
