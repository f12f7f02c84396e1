// crates/workcert-tracker/src/observer.rs
// ============================================================================
// Module: Loading Observers
// Description: Derived read-only views over request tracker snapshots.
// Purpose: Provide aggregate loading state for progress displays.
// Dependencies: std, time
// ============================================================================

//! ## Overview
//! Observers turn tracker snapshots into display-ready aggregates. The pure
//! `from_snapshot` constructors hold the aggregation rules; the attached
//! observers subscribe to a [`RequestTracker`], recompute inside the
//! notification itself, and unsubscribe when dropped.
//!
//! Invariants:
//! - `overall_progress` is the rounded arithmetic mean of active progress
//!   values (halves round up) and is 0 when nothing is active.
//! - `current_operation` is the most recently added active record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use time::OffsetDateTime;

use crate::record::RequestKind;
use crate::record::RequestRecord;
use crate::tracker::RequestTracker;
use crate::tracker::Subscription;

// ============================================================================
// SECTION: Aggregates
// ============================================================================

/// Aggregate loading state across every active request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingState {
    /// Last delivered snapshot.
    pub active_requests: Vec<RequestRecord>,
    /// True when at least one request is active.
    pub has_active_requests: bool,
    /// Rounded mean progress of active requests.
    pub overall_progress: u8,
    /// Most recently added active request.
    pub current_operation: Option<RequestRecord>,
}

impl LoadingState {
    /// Derives loading state from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: Vec<RequestRecord>) -> Self {
        let overall_progress = mean_progress(&snapshot);
        let current_operation = snapshot.last().cloned();
        Self {
            has_active_requests: !snapshot.is_empty(),
            overall_progress,
            current_operation,
            active_requests: snapshot,
        }
    }
}

/// Loading state restricted to one request kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationState {
    /// Tracked kind.
    pub kind: RequestKind,
    /// True when a request of this kind is active.
    pub is_active: bool,
    /// Rounded mean progress over matching requests.
    pub progress: u8,
    /// Most recently added matching request.
    pub current_request: Option<RequestRecord>,
    /// Number of matching active requests.
    pub request_count: usize,
}

impl OperationState {
    /// Derives the state for `kind` from a full snapshot.
    #[must_use]
    pub fn from_snapshot(kind: RequestKind, snapshot: &[RequestRecord]) -> Self {
        let matching: Vec<RequestRecord> =
            snapshot.iter().filter(|record| record.kind == kind).cloned().collect();
        Self {
            kind,
            is_active: !matching.is_empty(),
            progress: mean_progress(&matching),
            request_count: matching.len(),
            current_request: matching.into_iter().last(),
        }
    }

    /// Returns the idle state for `kind`.
    #[must_use]
    pub const fn idle(kind: RequestKind) -> Self {
        Self {
            kind,
            is_active: false,
            progress: 0,
            current_request: None,
            request_count: 0,
        }
    }
}

/// Document processing view over [`RequestKind::ProcessDocument`] requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentProcessingState {
    /// True while a document is being processed.
    pub is_processing: bool,
    /// Rounded mean progress over processing requests.
    pub progress: u8,
    /// File name of the most recent processing request.
    pub file_name: Option<String>,
    /// File size of the most recent processing request.
    pub file_size: Option<u64>,
    /// Start time of the most recent processing request.
    pub started_at: Option<OffsetDateTime>,
}

impl DocumentProcessingState {
    /// Derives document processing state from a full snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &[RequestRecord]) -> Self {
        Self::from(OperationState::from_snapshot(RequestKind::ProcessDocument, snapshot))
    }
}

impl From<OperationState> for DocumentProcessingState {
    fn from(state: OperationState) -> Self {
        let current = state.current_request;
        Self {
            is_processing: state.is_active,
            progress: state.progress,
            file_name: current.as_ref().and_then(|record| record.file_name.clone()),
            file_size: current.as_ref().and_then(|record| record.file_size),
            started_at: current.map(|record| record.started_at),
        }
    }
}

/// Computes the rounded mean progress; 0 for an empty slice.
fn mean_progress(records: &[RequestRecord]) -> u8 {
    if records.is_empty() {
        return 0;
    }
    let count = u64::try_from(records.len()).unwrap_or(u64::MAX);
    let sum: u64 = records.iter().map(|record| u64::from(record.progress)).sum();
    let rounded = (sum * 2 + count) / (count * 2);
    u8::try_from(rounded).unwrap_or(u8::MAX)
}

// ============================================================================
// SECTION: Attached Observers
// ============================================================================

/// Listener invoked after an observer recomputes its state.
type Listener<S> = dyn Fn(&S) + Send + Sync;

/// Observer keeping a [`LoadingState`] in sync with a tracker.
///
/// # Invariants
/// - State is recomputed synchronously within each notification.
/// - Dropping the observer unsubscribes it.
#[derive(Debug)]
pub struct LoadingObserver {
    /// Latest derived state.
    state: Arc<Mutex<LoadingState>>,
    /// Tracker registration.
    subscription: Subscription,
}

impl LoadingObserver {
    /// Attaches an observer primed with the tracker's current snapshot.
    #[must_use]
    pub fn attach(tracker: &RequestTracker) -> Self {
        Self::attach_inner(tracker, None)
    }

    /// Attaches an observer that also calls `listener` after each recompute.
    #[must_use]
    pub fn with_listener<F>(tracker: &RequestTracker, listener: F) -> Self
    where
        F: Fn(&LoadingState) + Send + Sync + 'static,
    {
        Self::attach_inner(tracker, Some(Arc::new(listener)))
    }

    /// Shared attach path.
    fn attach_inner(
        tracker: &RequestTracker,
        listener: Option<Arc<Listener<LoadingState>>>,
    ) -> Self {
        let state = Arc::new(Mutex::new(LoadingState::default()));
        let sink = Arc::clone(&state);
        let subscription = tracker.watch(move |snapshot| {
            let next = LoadingState::from_snapshot(snapshot);
            if let Some(listener) = &listener {
                listener(&next);
            }
            *lock(&sink) = next;
        });
        Self {
            state,
            subscription,
        }
    }

    /// Returns the latest derived state.
    #[must_use]
    pub fn state(&self) -> LoadingState {
        lock(&self.state).clone()
    }

    /// Unsubscribes from the tracker; the last state remains readable.
    pub fn detach(&mut self) {
        self.subscription.unsubscribe();
    }

    /// Returns true while the observer is subscribed.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.subscription.is_active()
    }
}

/// Observer keeping an [`OperationState`] for one kind in sync with a tracker.
///
/// # Invariants
/// - Only records whose kind matches are aggregated.
#[derive(Debug)]
pub struct OperationObserver {
    /// Latest derived state.
    state: Arc<Mutex<OperationState>>,
    /// Tracker registration.
    subscription: Subscription,
}

impl OperationObserver {
    /// Attaches an observer for `kind`, primed with the current snapshot.
    #[must_use]
    pub fn attach(tracker: &RequestTracker, kind: RequestKind) -> Self {
        let state = Arc::new(Mutex::new(OperationState::idle(kind)));
        let sink = Arc::clone(&state);
        let subscription = tracker.watch(move |snapshot| {
            *lock(&sink) = OperationState::from_snapshot(kind, &snapshot);
        });
        Self {
            state,
            subscription,
        }
    }

    /// Returns the latest derived state.
    #[must_use]
    pub fn state(&self) -> OperationState {
        lock(&self.state).clone()
    }

    /// Returns the latest state as a document processing view.
    #[must_use]
    pub fn document_processing(&self) -> DocumentProcessingState {
        DocumentProcessingState::from(self.state())
    }

    /// Unsubscribes from the tracker; the last state remains readable.
    pub fn detach(&mut self) {
        self.subscription.unsubscribe();
    }
}

/// Locks an observer state mutex, tolerating poisoning.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
