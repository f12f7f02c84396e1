// crates/workcert-client/src/guard.rs
// ============================================================================
// Module: Tracked Request Guard
// Description: Scoped registration of one wrapper call in the tracker.
// Purpose: Guarantee record removal and one log event on every exit path.
// Dependencies: time, workcert-tracker
// ============================================================================

//! ## Overview
//! [`TrackedRequest`] registers a record when created and removes it when
//! dropped. Wrappers call [`TrackedRequest::finish`] with their result; a
//! guard dropped without finishing (timeout handled elsewhere, a cancelled
//! future, an early return) still removes the record and logs the call as an
//! abandoned error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use time::OffsetDateTime;
use workcert_tracker::RequestId;
use workcert_tracker::RequestKind;
use workcert_tracker::RequestRecord;
use workcert_tracker::RequestTracker;
use workcert_tracker::RequestUpdate;

use crate::error::ApiError;
use crate::error::ErrorCategory;
use crate::log::RequestEvent;
use crate::log::RequestLog;
use crate::log::RequestOutcome;

// ============================================================================
// SECTION: Checkpoints
// ============================================================================

/// Fixed progress values published around the network boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoints {
    /// Progress published just before the request is sent.
    pub dispatched: u8,
    /// Progress published once response headers arrive.
    pub received: u8,
}

impl Checkpoints {
    /// Checkpoints used by most operations.
    pub const DEFAULT: Self = Self {
        dispatched: 25,
        received: 75,
    };

    /// Checkpoints for one-shot document evaluation.
    pub const DOCUMENT: Self = Self {
        dispatched: 10,
        received: 50,
    };

    /// Returns the checkpoints for `kind`.
    #[must_use]
    pub const fn for_kind(kind: RequestKind) -> Self {
        match kind {
            RequestKind::ProcessDocument => Self::DOCUMENT,
            _ => Self::DEFAULT,
        }
    }
}

// ============================================================================
// SECTION: Guard
// ============================================================================

/// Settlement recorded by [`TrackedRequest::finish`].
#[derive(Debug, Clone, Copy)]
enum Settlement {
    /// Not finished yet.
    Pending,
    /// Finished with a payload.
    Ok,
    /// Finished with an error of this category.
    Failed(ErrorCategory),
}

/// Registration of one wrapper call.
///
/// # Invariants
/// - The record is in the tracker from [`TrackedRequest::start`] until drop.
/// - Exactly one [`RequestEvent`] is logged, on drop.
pub(crate) struct TrackedRequest {
    /// Tracker holding the record.
    tracker: RequestTracker,
    /// Sink receiving the settlement event.
    log: Arc<dyn RequestLog>,
    /// Record id.
    id: RequestId,
    /// Operation kind.
    kind: RequestKind,
    /// Progress checkpoints for the kind.
    checkpoints: Checkpoints,
    /// Registration instant.
    started: Instant,
    /// HTTP status, once received.
    status: Option<u16>,
    /// Whether completion has been published.
    completed: bool,
    /// Settlement state.
    settlement: Settlement,
}

impl TrackedRequest {
    /// Registers a new record for `kind`.
    pub(crate) fn start(
        tracker: &RequestTracker,
        log: Arc<dyn RequestLog>,
        kind: RequestKind,
        file: Option<(&str, u64)>,
    ) -> Self {
        let id = tracker.generate_request_id();
        let mut record = RequestRecord::new(id.clone(), kind);
        if let Some((name, size)) = file {
            record = record.with_file(name, size);
        }
        tracker.add_request(record);
        Self {
            tracker: tracker.clone(),
            log,
            id,
            kind,
            checkpoints: Checkpoints::for_kind(kind),
            started: Instant::now(),
            status: None,
            completed: false,
            settlement: Settlement::Pending,
        }
    }

    /// Returns the operation kind.
    pub(crate) const fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Publishes the dispatched checkpoint.
    pub(crate) fn dispatched(&self) {
        self.progress(self.checkpoints.dispatched);
    }

    /// Records the response status and publishes the received checkpoint.
    pub(crate) fn received(&mut self, status: u16) {
        self.status = Some(status);
        self.progress(self.checkpoints.received);
    }

    /// Publishes `progress` for this record.
    pub(crate) fn progress(&self, progress: u8) {
        self.tracker.update_request(&self.id, &RequestUpdate::progress(progress));
    }

    /// Publishes completion once; later calls are no-ops.
    ///
    /// Envelope endpoints complete as soon as a 2xx body is decoded, before
    /// the `success` flag is inspected.
    pub(crate) fn complete(&mut self) {
        if !self.completed {
            self.completed = true;
            self.progress(workcert_tracker::MAX_PROGRESS);
        }
    }

    /// Settles the call, publishing completion on success.
    pub(crate) fn finish<T>(mut self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        match &result {
            Ok(_) => {
                self.complete();
                self.settlement = Settlement::Ok;
            }
            Err(err) => self.settlement = Settlement::Failed(err.category()),
        }
        result
    }
}

impl Drop for TrackedRequest {
    fn drop(&mut self) {
        self.tracker.remove_request(&self.id);
        let (outcome, error_category) = match self.settlement {
            Settlement::Ok => (RequestOutcome::Ok, None),
            Settlement::Failed(category) => (RequestOutcome::Error, Some(category)),
            Settlement::Pending => (RequestOutcome::Error, None),
        };
        let elapsed_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.log.record(&RequestEvent {
            request_id: self.id.clone(),
            kind: self.kind,
            outcome,
            error_category,
            status: self.status,
            elapsed_ms,
            settled_at: OffsetDateTime::now_utc(),
        });
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
