// crates/workcert-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: Tests for config loading limits, defaults, and validation.
// Purpose: Ensure config files are read safely and rejected when malformed.
// Dependencies: workcert-config, tempfile
// ============================================================================

//! ## Overview
//! Exercises the load path: path limits, size and encoding guards, default
//! fallback, environment-style overrides, and per-field validation.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::NamedTempFile;
use workcert_config::ConfigError;
use workcert_config::PortalConfig;
use workcert_config::RequestLogTarget;
use workcert_tracker::RequestKind;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<PortalConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if !message.contains(needle) {
                return Err(format!("error {message} did not contain {needle}"));
            }
            Ok(())
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ============================================================================
// SECTION: Path and File Guards
// ============================================================================

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let path = PathBuf::from("a".repeat(4097));
    assert_invalid(PortalConfig::load(Some(&path)), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let path = PathBuf::from(format!("{}/workcert.toml", "b".repeat(256)));
    assert_invalid(PortalConfig::load(Some(&path)), "config path component too long")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let padding = format!("# {}\n", "x".repeat(1024 * 1024));
    let file = write_config(&padding);
    assert_invalid(PortalConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&[0xff, 0xfe, 0x00]).unwrap();
    file.flush().unwrap();
    assert_invalid(PortalConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_rejects_missing_explicit_file() -> TestResult {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert_invalid(PortalConfig::load(Some(&path)), "config io error")
}

#[test]
fn load_rejects_unknown_fields() -> TestResult {
    let file = write_config("[api]\nbase_url = \"http://localhost:8000\"\nretries = 3\n");
    assert_invalid(PortalConfig::load(Some(file.path())), "config parse error")
}

// ============================================================================
// SECTION: Defaults and Overrides
// ============================================================================

#[test]
fn empty_file_yields_defaults() {
    let file = write_config("");
    let config = PortalConfig::from_file(file.path()).unwrap();
    assert_eq!(config, PortalConfig::default());
    assert_eq!(config.api.base_url, "http://localhost:8000");
    assert_eq!(config.api.timeout_ms, 30_000);
    assert_eq!(config.session.path, ".workcert-session.json");
    assert_eq!(config.logging.request_log, RequestLogTarget::None);
    config.validate().unwrap();
}

#[test]
fn operation_timeouts_override_default() {
    let file = write_config(
        "[api]\ntimeout_ms = 5000\n\n[api.operation_timeouts_ms]\nprocess_document = 120000\n",
    );
    let config = PortalConfig::from_file(file.path()).unwrap();
    config.validate().unwrap();
    assert_eq!(config.api.timeout_for(RequestKind::ProcessDocument), Duration::from_secs(120));
    assert_eq!(config.api.timeout_for(RequestKind::HealthCheck), Duration::from_secs(5));
}

#[test]
fn unknown_operation_timeout_key_is_rejected() -> TestResult {
    let file = write_config("[api.operation_timeouts_ms]\nlaunch_rocket = 10\n");
    assert_invalid(PortalConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn base_url_override_replaces_file_value() {
    let mut config = PortalConfig::default();
    config.apply_overrides(Some(" https://portal.example.edu/api ".to_string()));
    assert_eq!(config.api.base_url, "https://portal.example.edu/api");
    config.validate().unwrap();
}

#[test]
fn blank_override_is_ignored() {
    let mut config = PortalConfig::default();
    config.apply_overrides(Some("   ".to_string()));
    assert_eq!(config.api.base_url, "http://localhost:8000");
}

// ============================================================================
// SECTION: Field Validation
// ============================================================================

#[test]
fn rejects_non_http_base_url() -> TestResult {
    let file = write_config("[api]\nbase_url = \"ftp://files.example.edu\"\n");
    assert_invalid(PortalConfig::load(Some(file.path())), "scheme must be http or https")
}

#[test]
fn rejects_base_url_with_query() -> TestResult {
    let file = write_config("[api]\nbase_url = \"http://localhost:8000/?debug=1\"\n");
    assert_invalid(PortalConfig::load(Some(file.path())), "must not include a query")
}

#[test]
fn rejects_zero_timeout() -> TestResult {
    let file = write_config("[api]\ntimeout_ms = 0\n");
    assert_invalid(PortalConfig::load(Some(file.path())), "api.timeout_ms must be between")
}

#[test]
fn rejects_excessive_operation_timeout() -> TestResult {
    let file = write_config("[api.operation_timeouts_ms]\nupload_certificate = 600001\n");
    assert_invalid(
        PortalConfig::load(Some(file.path())),
        "api.operation_timeouts_ms.upload_certificate must be between",
    )
}

#[test]
fn rejects_zero_response_limit() -> TestResult {
    let file = write_config("[api]\nmax_response_bytes = 0\n");
    assert_invalid(PortalConfig::load(Some(file.path())), "max_response_bytes")
}

#[test]
fn rejects_blank_session_path() -> TestResult {
    let file = write_config("[session]\npath = \"  \"\n");
    assert_invalid(PortalConfig::load(Some(file.path())), "session.path must be non-empty")
}

#[test]
fn file_logging_requires_path() -> TestResult {
    let file = write_config("[logging]\nrequest_log = \"file\"\n");
    assert_invalid(PortalConfig::load(Some(file.path())), "request_log_path is required")
}

#[test]
fn file_logging_with_path_is_accepted() {
    let file = write_config(
        "[logging]\nrequest_log = \"file\"\nrequest_log_path = \"logs/requests.jsonl\"\n",
    );
    let config = PortalConfig::from_file(file.path()).unwrap();
    config.validate().unwrap();
    assert_eq!(config.logging.request_log, RequestLogTarget::File);
}
