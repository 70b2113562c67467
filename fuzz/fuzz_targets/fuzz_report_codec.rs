//! Fuzz testing for the report codec and the worker's event decoding.
//!
//! Decoding arbitrary bytes must never panic, and whatever decodes must
//! survive an encode/decode cycle unchanged.
//!
//! # Running the Fuzz Tests
//!
//! ```bash
//! cargo +nightly install cargo-fuzz
//! cargo +nightly fuzz run fuzz_report_codec -- -max_total_time=60
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use report_relay::Report;
use report_relay::models::{ReportRequest, TopicEvent};

#[derive(Debug, Arbitrary)]
enum Input<'a> {
    /// Raw bytes as delivered by a binding or typed by a client.
    Wire(&'a [u8]),
    /// A structurally valid report.
    Report { id: String, data: Vec<u8> },
}

fuzz_target!(|input: Input<'_>| {
    match input {
        Input::Wire(bytes) => {
            if let Ok(report) = Report::from_json(bytes) {
                let encoded = report.to_json().expect("encoding a decoded report");
                assert_eq!(Report::from_json(&encoded).expect("re-decoding"), report);
            }
            let _ = serde_json::from_slice::<ReportRequest>(bytes).map(Report::from);
            let _ = serde_json::from_slice::<TopicEvent>(bytes);
        }
        Input::Report { id, data } => {
            let report = Report::new(id, data);
            let encoded = report.to_json().expect("encoding");
            assert_eq!(Report::from_json(&encoded).expect("decoding"), report);
        }
    }
});
