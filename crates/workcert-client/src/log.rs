// crates/workcert-client/src/log.rs
// ============================================================================
// Module: Request Log
// Description: Structured per-call records for settled API wrappers.
// Purpose: Emit one JSON line per call without exposing bodies or identities.
// Dependencies: serde, serde_json, time, workcert-tracker
// ============================================================================

//! ## Overview
//! A [`RequestLog`] receives exactly one [`RequestEvent`] per settled wrapper
//! call. Events carry only the request id, operation kind, outcome, error
//! category, HTTP status, and elapsed time; request and response bodies and
//! identity tokens never reach a sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

use serde::Serialize;
use time::OffsetDateTime;
use workcert_tracker::RequestId;
use workcert_tracker::RequestKind;

use crate::error::ErrorCategory;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Settlement outcome of a wrapper call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// The call returned a payload.
    Ok,
    /// The call returned an error or was abandoned.
    Error,
}

/// One settled wrapper call.
///
/// # Invariants
/// - `error_category` is `Some` exactly when `outcome` is
///   [`RequestOutcome::Error`] and an error was produced; abandoned calls
///   have neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestEvent {
    /// Tracker id of the call.
    pub request_id: RequestId,
    /// Operation kind.
    pub kind: RequestKind,
    /// Outcome.
    pub outcome: RequestOutcome,
    /// Error category, when the call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<ErrorCategory>,
    /// HTTP status, when a response was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Wall time from registration to settlement.
    pub elapsed_ms: u64,
    /// Settlement time.
    #[serde(with = "time::serde::rfc3339")]
    pub settled_at: OffsetDateTime,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for settled request events.
///
/// Implementations must not block for long; they run on the settling task.
pub trait RequestLog: Send + Sync {
    /// Records a settled call.
    fn record(&self, event: &RequestEvent);
}

/// Request log that discards events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRequestLog;

impl RequestLog for NoopRequestLog {
    fn record(&self, _event: &RequestEvent) {}
}

// ============================================================================
// SECTION: JSON Lines
// ============================================================================

/// Request log writing one JSON object per line.
///
/// # Invariants
/// - Each event is written and terminated with `\n` under a single lock.
/// - Write failures are dropped; call outcomes never depend on the log.
pub struct JsonLineRequestLog<W: Write + Send> {
    /// Output writer for log records.
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLineRequestLog<W> {
    /// Creates a JSON-lines log over `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Writes one event.
    ///
    /// # Errors
    ///
    /// Returns a description when serialization or the write fails.
    pub fn write_event(&self, event: &RequestEvent) -> Result<(), String> {
        let mut guard =
            self.writer.lock().map_err(|_| "request log mutex poisoned".to_string())?;
        serde_json::to_writer(&mut *guard, event).map_err(|err| err.to_string())?;
        guard.write_all(b"\n").map_err(|err| err.to_string())?;
        guard.flush().map_err(|err| err.to_string())?;
        drop(guard);
        Ok(())
    }
}

impl<W: Write + Send> RequestLog for JsonLineRequestLog<W> {
    fn record(&self, event: &RequestEvent) {
        let _ = self.write_event(event);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
