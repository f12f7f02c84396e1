// crates/workcert-client/src/error/tests.rs
// ============================================================================
// Module: Portal API Error Tests
// Description: Unit tests for status mapping and error categories.
// ============================================================================

//! Status mapping, detail extraction, and category tests.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use proptest::prelude::*;

use super::ApiError;
use super::ErrorCategory;
use super::FailureText;
use super::error_detail;

const STUDENT: FailureText = FailureText {
    not_found: "Student not found",
    bad_request: Some("Invalid email format"),
    rejected: "Failed to fetch applications",
};

#[test]
fn bad_request_prefers_server_detail() {
    let error = FailureText::GENERIC.status_error(400, br#"{"detail":"File too large"}"#);
    assert_eq!(error, ApiError::Validation("File too large".to_string()));
    assert_eq!(error.to_string(), "File too large");
    assert_eq!(error.category(), ErrorCategory::Validation);
}

#[test]
fn bad_request_without_detail_uses_default() {
    let error = FailureText::GENERIC.status_error(400, b"not json");
    assert_eq!(error.to_string(), "Invalid data provided.");
}

#[test]
fn fixed_bad_request_text_ignores_detail() {
    let error = STUDENT.status_error(400, br#"{"detail":"ignored"}"#);
    assert_eq!(error.to_string(), "Invalid email format");
}

#[test]
fn not_found_uses_operation_text() {
    assert_eq!(STUDENT.status_error(404, b"").to_string(), "Student not found");
    assert_eq!(FailureText::GENERIC.status_error(404, b"").to_string(), "Resource not found.");
}

#[test]
fn other_statuses_are_server_errors() {
    let error = STUDENT.status_error(503, b"");
    assert_eq!(error.to_string(), "HTTP 503: Server error. Please try again later.");
    assert_eq!(error.category(), ErrorCategory::Server);
    assert_eq!(error.status(), Some(503));
    assert_eq!(STUDENT.status_error(422, b"").category(), ErrorCategory::Server);
}

#[test]
fn rejection_prefers_envelope_message() {
    assert_eq!(STUDENT.rejected_error(Some("Quota exceeded")).to_string(), "Quota exceeded");
    assert_eq!(STUDENT.rejected_error(Some("")).to_string(), "Failed to fetch applications");
    assert_eq!(STUDENT.rejected_error(None).category(), ErrorCategory::Rejected);
}

#[test]
fn detail_must_be_a_non_empty_string() {
    assert_eq!(error_detail(br#"{"detail":""}"#), None);
    assert_eq!(error_detail(br#"{"detail":[{"loc":"body"}]}"#), None);
    assert_eq!(error_detail(br#"{"detail":"x"}"#).as_deref(), Some("x"));
}

#[test]
fn decode_failures_are_server_category() {
    let error = ApiError::Decode("eof".to_string());
    assert_eq!(error.category(), ErrorCategory::Server);
    assert_eq!(error.status(), None);
}

#[test]
fn fixed_messages_match_taxonomy() {
    assert_eq!(
        ApiError::Network("refused".to_string()).to_string(),
        "Network error. Please check your connection."
    );
    assert_eq!(ApiError::Timeout.to_string(), "Request timeout. Please try again.");
    assert_eq!(ErrorCategory::InvalidInput.to_string(), "invalid_input");
}

proptest! {
    #[test]
    fn other_statuses_map_to_server(
        status in (300u16 .. 600).prop_filter("mapped elsewhere", |s| *s != 400 && *s != 404),
        body in proptest::collection::vec(any::<u8>(), 0 .. 64),
    ) {
        let error = STUDENT.status_error(status, &body);
        prop_assert_eq!(error.category(), ErrorCategory::Server);
        prop_assert_eq!(error.status(), Some(status));
        prop_assert_eq!(
            error.to_string(),
            format!("HTTP {status}: Server error. Please try again later.")
        );
    }
}
