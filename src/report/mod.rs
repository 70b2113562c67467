//! The report record and its wire codec.
//!
//! A report is an identifier plus an opaque byte payload. On the wire it is a
//! JSON object whose `data` field carries the payload as standard (padded)
//! base64:
//!
//! ```json
//! { "id": "123", "data": "ZGF0YQ==" }
//! ```
//!
//! The same shape travels from the endpoint to the sidecar and from the
//! sidecar to the worker, so both ends decode with [`Report::from_json`].

mod service;

use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

pub use service::{ReportService, Reporter, Service, Storer};

#[cfg(test)]
pub use service::{MockReporter, MockStorer};

/// A report flowing through the pipeline.
///
/// `id` is not validated: it is used as tracing key and as object key at
/// storage time, and the empty string is accepted.
///
/// Decoding matches field names case-insensitively (`id`, `ID`, `Id` ...).
/// Missing or `null` fields stay empty, unknown fields are skipped, and a
/// repeated field keeps its last value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Report {
    pub id: String,
    #[serde(serialize_with = "base64_bytes::serialize")]
    pub data: Vec<u8>,
}

impl Report {
    /// Create a new report.
    pub fn new(id: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }

    /// Encode the report in its wire shape.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Encode the report as a JSON value, for embedding in binding requests.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Decode a report from its wire shape.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

enum Field {
    Id,
    Data,
    Other,
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldVisitor;

        impl Visitor<'_> for FieldVisitor {
            type Value = Field;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a field name")
            }

            fn visit_str<E: de::Error>(self, name: &str) -> Result<Field, E> {
                Ok(if name.eq_ignore_ascii_case("id") {
                    Field::Id
                } else if name.eq_ignore_ascii_case("data") {
                    Field::Data
                } else {
                    Field::Other
                })
            }
        }

        deserializer.deserialize_identifier(FieldVisitor)
    }
}

/// Base64 payload as a standalone value, so it can be read with `next_value`.
struct Payload(Vec<u8>);

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        base64_bytes::deserialize(deserializer).map(Payload)
    }
}

impl<'de> Deserialize<'de> for Report {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ReportVisitor;

        impl<'de> Visitor<'de> for ReportVisitor {
            type Value = Report;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a report object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Report, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut report = Report::default();
                while let Some(field) = map.next_key::<Field>()? {
                    match field {
                        Field::Id => {
                            if let Some(id) = map.next_value::<Option<String>>()? {
                                report.id = id;
                            }
                        }
                        Field::Data => report.data = map.next_value::<Payload>()?.0,
                        Field::Other => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(report)
            }
        }

        deserializer.deserialize_map(ReportVisitor)
    }
}

/// Serde adapter carrying `Vec<u8>` as a base64 string.
///
/// `null` decodes to an empty payload, matching producers that serialize a
/// nil byte slice that way.
mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD
                .decode(encoded.as_bytes())
                .map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_data_is_base64_on_the_wire() {
        let report = Report::new("123", "data");
        let json = String::from_utf8(report.to_json().unwrap()).unwrap();
        assert_eq!(json, r#"{"id":"123","data":"ZGF0YQ=="}"#);
    }

    #[test]
    fn test_empty_report_roundtrip() {
        let report = Report::default();
        let json = report.to_json().unwrap();
        assert_eq!(json, br#"{"id":"","data":""}"#);
        assert_eq!(Report::from_json(&json).unwrap(), report);
    }

    #[test]
    fn test_non_utf8_payload_survives_repeated_roundtrips() {
        let original = Report::new("bin", vec![0xff, 0x00, 0xfe, 0x80, 0x7f]);
        let mut current = original.clone();
        for _ in 0..3 {
            current = Report::from_json(&current.to_json().unwrap()).unwrap();
        }
        assert_eq!(current, original);
    }

    #[test]
    fn test_null_data_decodes_to_empty() {
        let report = Report::from_json(br#"{"id":"1","data":null}"#).unwrap();
        assert_eq!(report, Report::new("1", Vec::new()));
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let report = Report::from_json(b"{}").unwrap();
        assert_eq!(report, Report::default());
    }

    #[test]
    fn test_capitalised_field_names_are_accepted() {
        let report = Report::from_json(br#"{"ID":"abc","Data":"dGVzdA=="}"#).unwrap();
        assert_eq!(report, Report::new("abc", "test"));
    }

    #[test]
    fn test_field_names_match_in_any_case() {
        let report = Report::from_json(br#"{"Id":"x","DATA":"eA=="}"#).unwrap();
        assert_eq!(report, Report::new("x", "x"));
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        let report =
            Report::from_json(br#"{"id":"1","source":{"a":[1,2]},"data":"eA=="}"#).unwrap();
        assert_eq!(report, Report::new("1", "x"));
    }

    #[test]
    fn test_null_id_stays_empty() {
        let report = Report::from_json(br#"{"id":null,"data":"eA=="}"#).unwrap();
        assert_eq!(report, Report::new("", "x"));
    }

    #[test]
    fn test_repeated_field_keeps_last_value() {
        let report = Report::from_json(br#"{"id":"first","ID":"second"}"#).unwrap();
        assert_eq!(report.id, "second");
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(Report::from_json(br#"["1","eA=="]"#).is_err());
        assert!(Report::from_json(b"\"report\"").is_err());
    }

    #[test]
    fn test_truncated_json_is_rejected() {
        assert!(Report::from_json(br#"{"id":"123","data":"testdata"#).is_err());
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let err = Report::from_json(br#"{"id":"1","data":"not base64!"}"#).unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn test_to_value_embeds_wire_shape() {
        let value = Report::new("7", "x").to_value().unwrap();
        assert_eq!(value, serde_json::json!({"id": "7", "data": "eA=="}));
    }
}
