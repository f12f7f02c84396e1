// crates/workcert-tracker/src/tracker.rs
// ============================================================================
// Module: Request Tracker
// Description: Registry of in-flight API requests with snapshot broadcast.
// Purpose: Own the active request list and notify subscribers on change.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`RequestTracker`] is the authoritative registry of active
//! [`RequestRecord`] values. Every mutation broadcasts a fresh snapshot to all
//! subscribers, synchronously and in registration order. The tracker is a
//! cheap cloneable handle so the composition root can inject the same
//! registry into every client and observer.
//!
//! Invariants:
//! - Mutations and their notifications are serialized: subscribers observe
//!   snapshots in mutation order.
//! - Subscribers receive owned copies; nothing they do to a snapshot reaches
//!   the registry.
//! - Callbacks may subscribe, watch, unsubscribe, or mutate the tracker that
//!   is calling them. A change made during a broadcast is queued and delivered
//!   after the current round, in the order it was made.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::Weak;
use std::thread;
use std::thread::ThreadId;

use crate::record::RequestId;
use crate::record::RequestRecord;
use crate::record::RequestUpdate;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Subscriber callback signature.
type SubscriberFn = dyn Fn(Vec<RequestRecord>) + Send + Sync;

/// Registry-internal subscriber handle.
type SubscriberId = u64;

/// Snapshot waiting to be broadcast, with the subscribers it goes to.
struct Delivery {
    /// Records as of the mutation.
    snapshot: Vec<RequestRecord>,
    /// Subscribers registered at the time of the mutation.
    subscribers: Vec<Arc<SubscriberFn>>,
}

/// Mutable registry state guarded by the state lock.
#[derive(Default)]
struct TrackerState {
    /// Active records in insertion order.
    active: Vec<RequestRecord>,
    /// Subscribers in registration order.
    subscribers: Vec<(SubscriberId, Arc<SubscriberFn>)>,
    /// Next subscriber identifier.
    next_subscriber: SubscriberId,
    /// Broadcasts not yet delivered.
    pending: VecDeque<Delivery>,
}

impl TrackerState {
    /// Queues a broadcast of the current records.
    fn enqueue(&mut self) {
        let subscribers = self.subscribers.iter().map(|(_, callback)| Arc::clone(callback)).collect();
        self.pending.push_back(Delivery {
            snapshot: self.active.clone(),
            subscribers,
        });
    }
}

/// Shared tracker internals.
#[derive(Default)]
struct TrackerInner {
    /// Serializes mutation + notification rounds across threads.
    dispatch: Mutex<()>,
    /// Thread currently holding `dispatch`.
    owner: Mutex<Option<ThreadId>>,
    /// Records and subscribers.
    state: Mutex<TrackerState>,
}

// ============================================================================
// SECTION: Request Tracker
// ============================================================================

/// Registry of in-flight requests.
///
/// # Invariants
/// - All operations are total; unknown ids are no-ops.
/// - No de-duplication is performed on insert.
#[derive(Clone, Default)]
pub struct RequestTracker {
    /// Shared registry internals.
    inner: Arc<TrackerInner>,
}

impl std::fmt::Debug for RequestTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("RequestTracker")
            .field("active", &state.active.len())
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

impl RequestTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked with a fresh snapshot on every change.
    ///
    /// The returned [`Subscription`] unsubscribes on [`Subscription::unsubscribe`]
    /// or when dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Vec<RequestRecord>) + Send + Sync + 'static,
    {
        let id = self.register(Arc::new(callback));
        Subscription {
            tracker: Arc::downgrade(&self.inner),
            id,
            active: true,
        }
    }

    /// Registers a callback and immediately delivers the current snapshot.
    ///
    /// Registration and the priming delivery happen inside one dispatch
    /// round, so no change can slip between them. Called from a subscriber,
    /// it joins the round already in progress.
    pub fn watch<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Vec<RequestRecord>) + Send + Sync + 'static,
    {
        let callback: Arc<SubscriberFn> = Arc::new(callback);
        let id = self.dispatch(|| {
            let id = self.register(Arc::clone(&callback));
            callback(self.snapshot());
            id
        });
        Subscription {
            tracker: Arc::downgrade(&self.inner),
            id,
            active: true,
        }
    }

    /// Appends a record and notifies subscribers.
    pub fn add_request(&self, record: RequestRecord) {
        self.mutate(|active| {
            active.push(record);
            true
        });
    }

    /// Merges `update` into the record with `id` and notifies subscribers.
    ///
    /// Silently ignores unknown ids without notifying.
    pub fn update_request(&self, id: &RequestId, update: &RequestUpdate) {
        self.mutate(|active| match active.iter_mut().find(|record| &record.id == id) {
            Some(record) => {
                record.apply(update);
                true
            }
            None => false,
        });
    }

    /// Removes any record with `id` and notifies subscribers.
    pub fn remove_request(&self, id: &RequestId) {
        self.mutate(|active| {
            active.retain(|record| &record.id != id);
            true
        });
    }

    /// Returns a fresh request identifier.
    #[must_use]
    pub fn generate_request_id(&self) -> RequestId {
        RequestId::generate()
    }

    /// Returns a copy of the active records.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RequestRecord> {
        lock(&self.inner.state).active.clone()
    }

    /// Returns the number of active records.
    #[must_use]
    pub fn active_count(&self) -> usize {
        lock(&self.inner.state).active.len()
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.state).subscribers.len()
    }

    /// Broadcasts the current snapshot without mutating it.
    pub fn notify(&self) {
        self.mutate(|_| true);
    }

    /// Adds a subscriber and returns its identifier.
    fn register(&self, callback: Arc<SubscriberFn>) -> SubscriberId {
        let mut state = lock(&self.inner.state);
        let id = state.next_subscriber;
        state.next_subscriber = state.next_subscriber.wrapping_add(1);
        state.subscribers.push((id, callback));
        id
    }

    /// Applies a mutation and, when it reports a change, notifies subscribers.
    fn mutate<F>(&self, apply: F)
    where
        F: FnOnce(&mut Vec<RequestRecord>) -> bool,
    {
        self.dispatch(|| {
            let mut state = lock(&self.inner.state);
            if apply(&mut state.active) {
                state.enqueue();
            }
        });
    }

    /// Runs `step` inside a dispatch round and delivers what it queued.
    ///
    /// The outermost caller on a thread owns the round: it holds the dispatch
    /// lock and drains the queue. Nested calls from subscribers only queue,
    /// and their deliveries follow the one currently running.
    fn dispatch<T>(&self, step: impl FnOnce() -> T) -> T {
        let current = thread::current().id();
        if *lock(&self.inner.owner) == Some(current) {
            return step();
        }
        let _dispatch = lock(&self.inner.dispatch);
        let _owner = RoundOwner::claim(&self.inner.owner, current);
        let value = step();
        self.drain();
        value
    }

    /// Delivers queued broadcasts in order until none remain.
    fn drain(&self) {
        loop {
            let next = lock(&self.inner.state).pending.pop_front();
            let Some(delivery) = next else {
                return;
            };
            for subscriber in delivery.subscribers {
                subscriber(delivery.snapshot.clone());
            }
        }
    }
}

/// Marks the current thread as the dispatch owner until dropped.
struct RoundOwner<'a> {
    /// Owner slot to clear on drop.
    slot: &'a Mutex<Option<ThreadId>>,
}

impl<'a> RoundOwner<'a> {
    /// Records `thread` as the owner.
    fn claim(slot: &'a Mutex<Option<ThreadId>>, thread: ThreadId) -> Self {
        *lock(slot) = Some(thread);
        Self {
            slot,
        }
    }
}

impl Drop for RoundOwner<'_> {
    fn drop(&mut self) {
        *lock(self.slot) = None;
    }
}

// ============================================================================
// SECTION: Subscription
// ============================================================================

/// Scoped subscriber registration.
///
/// # Invariants
/// - Unsubscribing is idempotent.
/// - Dropping the handle unsubscribes.
/// - The handle does not keep the tracker alive.
#[derive(Debug)]
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    /// Weak reference to the owning tracker.
    tracker: Weak<TrackerInner>,
    /// Subscriber identifier within the tracker.
    id: SubscriberId,
    /// Whether the subscriber is still registered.
    active: bool,
}

impl Subscription {
    /// Removes exactly this subscriber. Subsequent calls are no-ops.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(inner) = self.tracker.upgrade() {
            lock(&inner.state).subscribers.retain(|(id, _)| *id != self.id);
        }
    }

    /// Returns true while the subscriber is registered.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Locks a mutex, recovering the guard if a subscriber panicked while held.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests;
