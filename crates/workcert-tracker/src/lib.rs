// crates/workcert-tracker/src/lib.rs
// ============================================================================
// Module: Work Certificate Request Tracker
// Description: In-flight request registry and derived loading observers.
// Purpose: Publish coarse request progress to presentation layers.
// Dependencies: rand, serde, thiserror, time
// ============================================================================

//! ## Overview
//! This crate holds the request-tracking core of the work certificate portal
//! client. API wrappers register a [`RequestRecord`] with a
//! [`RequestTracker`] for the duration of each call and publish checkpoint
//! progress into it; observers such as [`LoadingObserver`] derive aggregate
//! state from the snapshots the tracker broadcasts.
//!
//! The tracker is constructed explicitly and injected wherever it is needed;
//! there is no process-wide singleton.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod observer;
pub mod record;
pub mod tracker;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use observer::DocumentProcessingState;
pub use observer::LoadingObserver;
pub use observer::LoadingState;
pub use observer::OperationObserver;
pub use observer::OperationState;
pub use record::MAX_PROGRESS;
pub use record::ParseRequestKindError;
pub use record::RequestId;
pub use record::RequestKind;
pub use record::RequestRecord;
pub use record::RequestUpdate;
pub use tracker::RequestTracker;
pub use tracker::Subscription;
