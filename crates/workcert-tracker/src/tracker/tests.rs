// crates/workcert-tracker/src/tracker/tests.rs
// ============================================================================
// Module: Request Tracker Tests
// Description: Unit tests for registry mutation and notification rules.
// Purpose: Validate notification ordering, no-op semantics, and scoping.
// Dependencies: workcert-tracker
// ============================================================================

//! ## Overview
//! Exercises the registry directly: which mutations notify, the order in
//! which subscribers are called, and the lifetime of [`super::Subscription`].

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use super::RequestTracker;
use crate::observer::LoadingObserver;
use crate::record::RequestId;
use crate::record::RequestKind;
use crate::record::RequestRecord;
use crate::record::RequestUpdate;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Shared log of snapshot lengths seen by a subscriber.
type Seen = Arc<Mutex<Vec<usize>>>;

/// Subscribes a recorder that logs the length of every snapshot.
fn record_lengths(tracker: &RequestTracker) -> (Seen, super::Subscription) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = tracker.subscribe(move |snapshot| sink.lock().unwrap().push(snapshot.len()));
    (seen, subscription)
}

/// Builds a record with a fixed id.
fn record(id: &str) -> RequestRecord {
    RequestRecord::new(RequestId::new(id), RequestKind::HealthCheck)
}

// ============================================================================
// SECTION: Notification Tests
// ============================================================================

#[test]
fn add_update_remove_each_notify() {
    let tracker = RequestTracker::new();
    let (seen, _subscription) = record_lengths(&tracker);

    tracker.add_request(record("a"));
    tracker.update_request(&RequestId::new("a"), &RequestUpdate::progress(50));
    tracker.remove_request(&RequestId::new("a"));

    assert_eq!(*seen.lock().unwrap(), vec![1, 1, 0]);
}

#[test]
fn update_of_unknown_id_is_silent() {
    let tracker = RequestTracker::new();
    let (seen, _subscription) = record_lengths(&tracker);

    tracker.update_request(&RequestId::new("ghost"), &RequestUpdate::progress(10));

    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(tracker.active_count(), 0);
}

#[test]
fn remove_of_unknown_id_still_notifies() {
    let tracker = RequestTracker::new();
    let (seen, _subscription) = record_lengths(&tracker);

    tracker.remove_request(&RequestId::new("ghost"));

    assert_eq!(*seen.lock().unwrap(), vec![0]);
}

#[test]
fn subscribers_are_called_in_registration_order() {
    let tracker = RequestTracker::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    let first_log = Arc::clone(&order);
    let second_log = Arc::clone(&order);
    let _first = tracker.subscribe(move |_| first_log.lock().unwrap().push("first"));
    let _second = tracker.subscribe(move |_| second_log.lock().unwrap().push("second"));

    tracker.notify();

    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
}

#[test]
fn duplicate_adds_are_not_deduplicated() {
    let tracker = RequestTracker::new();
    tracker.add_request(record("dup"));
    tracker.add_request(record("dup"));
    assert_eq!(tracker.active_count(), 2);
    tracker.remove_request(&RequestId::new("dup"));
    assert_eq!(tracker.active_count(), 0);
}

// ============================================================================
// SECTION: Subscription Lifetime Tests
// ============================================================================

#[test]
fn dropping_subscription_unsubscribes() {
    let tracker = RequestTracker::new();
    let (seen, subscription) = record_lengths(&tracker);
    assert_eq!(tracker.subscriber_count(), 1);

    drop(subscription);
    tracker.add_request(record("a"));

    assert_eq!(tracker.subscriber_count(), 0);
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn subscription_outliving_tracker_is_harmless() {
    let tracker = RequestTracker::new();
    let mut subscription = tracker.subscribe(|_| {});
    drop(tracker);
    subscription.unsubscribe();
    assert!(!subscription.is_active());
}

#[test]
fn watch_primes_with_current_snapshot() {
    let tracker = RequestTracker::new();
    tracker.add_request(record("a"));
    tracker.add_request(record("b"));
    let (seen, subscription) = {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = tracker.watch(move |snapshot| sink.lock().unwrap().push(snapshot.len()));
        (seen, subscription)
    };
    assert_eq!(*seen.lock().unwrap(), vec![2]);
    assert!(subscription.is_active());
}

#[test]
fn callback_may_unsubscribe_other_subscribers() {
    let tracker = RequestTracker::new();
    let victim: Arc<Mutex<Option<super::Subscription>>> = Arc::new(Mutex::new(None));
    let victim_handle = Arc::clone(&victim);
    let _killer = tracker.subscribe(move |_| {
        if let Some(mut subscription) = victim_handle.lock().unwrap().take() {
            subscription.unsubscribe();
        }
    });
    *victim.lock().unwrap() = Some(tracker.subscribe(|_| {}));
    assert_eq!(tracker.subscriber_count(), 2);

    tracker.notify();

    assert_eq!(tracker.subscriber_count(), 1);
}

// ============================================================================
// SECTION: Re-Entrancy Tests
// ============================================================================

#[test]
fn callback_may_attach_observer_to_same_tracker() {
    let tracker = RequestTracker::new();
    let attached: Arc<Mutex<Option<LoadingObserver>>> = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&attached);
    let inner = tracker.clone();
    let _attacher = tracker.subscribe(move |_| {
        let mut slot = slot.lock().unwrap();
        if slot.is_none() {
            *slot = Some(LoadingObserver::attach(&inner));
        }
    });

    let (done, finished) = mpsc::channel();
    let worker = tracker.clone();
    thread::spawn(move || {
        worker.add_request(record("a"));
        worker.add_request(record("b"));
        let _ = done.send(());
    });

    assert!(finished.recv_timeout(Duration::from_secs(5)).is_ok(), "tracker deadlocked");
    let state = attached.lock().unwrap().as_ref().unwrap().state();
    assert_eq!(state.active_requests.len(), 2);
    assert!(state.has_active_requests);
}

#[test]
fn callback_mutation_is_delivered_after_current_round() {
    let tracker = RequestTracker::new();
    let inner = tracker.clone();
    let first_seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let first_sink = Arc::clone(&first_seen);
    let _chained = tracker.subscribe(move |snapshot| {
        first_sink.lock().unwrap().push(snapshot.len());
        if snapshot.len() == 1 {
            inner.add_request(record("follow-up"));
        }
    });
    let (later_seen, _later) = record_lengths(&tracker);

    let (done, finished) = mpsc::channel();
    let worker = tracker.clone();
    thread::spawn(move || {
        worker.add_request(record("a"));
        let _ = done.send(());
    });

    assert!(finished.recv_timeout(Duration::from_secs(5)).is_ok(), "tracker deadlocked");
    assert_eq!(*first_seen.lock().unwrap(), vec![1, 2]);
    assert_eq!(*later_seen.lock().unwrap(), vec![1, 2]);
    assert_eq!(tracker.active_count(), 2);
}

#[test]
fn callback_may_watch_and_is_primed_with_current_round() {
    let tracker = RequestTracker::new();
    let inner = tracker.clone();
    let primed: Seen = Arc::new(Mutex::new(Vec::new()));
    let primed_sink = Arc::clone(&primed);
    let watchers: Arc<Mutex<Vec<super::Subscription>>> = Arc::new(Mutex::new(Vec::new()));
    let keep = Arc::clone(&watchers);
    let _outer = tracker.subscribe(move |_| {
        let mut keep = keep.lock().unwrap();
        if keep.is_empty() {
            let sink = Arc::clone(&primed_sink);
            keep.push(inner.watch(move |snapshot| sink.lock().unwrap().push(snapshot.len())));
        }
    });

    tracker.add_request(record("a"));
    tracker.add_request(record("b"));

    assert_eq!(*primed.lock().unwrap(), vec![1, 2]);
    assert_eq!(watchers.lock().unwrap().len(), 1);
}
