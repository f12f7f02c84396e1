// crates/workcert-client/src/guard/tests.rs
// ============================================================================
// Module: Tracked Request Guard Tests
// Description: Unit tests for registration, checkpoints, and cleanup.
// ============================================================================

//! Guard lifecycle tests.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use std::sync::Arc;
use std::sync::Mutex;

use workcert_tracker::RequestKind;
use workcert_tracker::RequestTracker;

use super::Checkpoints;
use super::TrackedRequest;
use crate::error::ApiError;
use crate::error::ErrorCategory;
use crate::log::RequestEvent;
use crate::log::RequestLog;
use crate::log::RequestOutcome;

/// Log capturing events in memory.
#[derive(Default)]
struct CaptureLog(Mutex<Vec<RequestEvent>>);

impl RequestLog for CaptureLog {
    fn record(&self, event: &RequestEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

fn progress_history(tracker: &RequestTracker) -> (Arc<Mutex<Vec<Vec<u8>>>>, workcert_tracker::Subscription) {
    let history = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&history);
    let subscription = tracker.subscribe(move |snapshot| {
        sink.lock().unwrap().push(snapshot.iter().map(|record| record.progress).collect());
    });
    (history, subscription)
}

#[test]
fn successful_call_walks_checkpoints_then_removes() {
    let tracker = RequestTracker::new();
    let log = Arc::new(CaptureLog::default());
    let (history, _subscription) = progress_history(&tracker);

    let mut request = TrackedRequest::start(&tracker, log.clone(), RequestKind::HealthCheck, None);
    request.dispatched();
    request.received(200);
    let value = request.finish(Ok::<_, ApiError>(7)).unwrap();

    assert_eq!(value, 7);
    assert_eq!(tracker.active_count(), 0);
    assert_eq!(
        *history.lock().unwrap(),
        vec![vec![0], vec![25], vec![75], vec![100], vec![]]
    );
    let events = log.0.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, RequestOutcome::Ok);
    assert_eq!(events[0].status, Some(200));
    assert_eq!(events[0].kind, RequestKind::HealthCheck);
}

#[test]
fn failed_call_skips_completion_and_logs_category() {
    let tracker = RequestTracker::new();
    let log = Arc::new(CaptureLog::default());
    let (history, _subscription) = progress_history(&tracker);

    let mut request =
        TrackedRequest::start(&tracker, log.clone(), RequestKind::ProcessDocument, Some(("cv.pdf", 10)));
    request.dispatched();
    request.received(400);
    let error = request
        .finish(Err::<(), _>(ApiError::Validation("File too large".to_string())))
        .unwrap_err();

    assert_eq!(error.to_string(), "File too large");
    assert_eq!(*history.lock().unwrap(), vec![vec![0], vec![10], vec![50], vec![]]);
    let events = log.0.lock().unwrap();
    assert_eq!(events[0].error_category, Some(ErrorCategory::Validation));
    assert_eq!(events[0].status, Some(400));
}

#[test]
fn abandoned_guard_still_removes_record() {
    let tracker = RequestTracker::new();
    let log = Arc::new(CaptureLog::default());
    {
        let request = TrackedRequest::start(&tracker, log.clone(), RequestKind::UploadCertificate, None);
        request.dispatched();
        assert_eq!(tracker.active_count(), 1);
    }
    assert_eq!(tracker.active_count(), 0);
    let events = log.0.lock().unwrap();
    assert_eq!(events[0].outcome, RequestOutcome::Error);
    assert_eq!(events[0].error_category, None);
    assert_eq!(events[0].status, None);
}

#[test]
fn checkpoints_depend_on_kind() {
    assert_eq!(Checkpoints::for_kind(RequestKind::ProcessDocument), Checkpoints::DOCUMENT);
    assert_eq!(Checkpoints::for_kind(RequestKind::SubmitReview), Checkpoints::DEFAULT);
}
