// crates/workcert-client/src/lib.rs
// ============================================================================
// Module: Work Certificate Portal Client
// Description: Tracked API wrappers for the student and reviewer portals.
// Purpose: Expose every portal operation with progress publication.
// Dependencies: reqwest, serde, serde_json, thiserror, time, url
// ============================================================================

//! ## Overview
//! `workcert-client` wraps the portal HTTP API. Every wrapper on
//! [`PortalClient`] registers a record with the injected
//! [`workcert_tracker::RequestTracker`] for the duration of the call, so any
//! attached observer can render coarse progress. Failures are reported as
//! [`ApiError`] values with a single [`ErrorCategory`] each.
//!
//! The crate also carries the persisted identity tokens ([`SessionStore`])
//! and the structured per-call log ([`RequestLog`]).

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod error;
mod guard;
pub mod log;
pub mod models;
pub mod session;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::PortalClient;
pub use error::ApiError;
pub use error::ErrorCategory;
pub use guard::Checkpoints;
pub use log::JsonLineRequestLog;
pub use log::NoopRequestLog;
pub use log::RequestEvent;
pub use log::RequestLog;
pub use log::RequestOutcome;
pub use models::Acknowledgement;
pub use models::Application;
pub use models::CertificateUpload;
pub use models::DocumentSubmission;
pub use models::DownloadedFile;
pub use models::FileUpload;
pub use models::HealthStatus;
pub use models::ProcessingOutcome;
pub use models::ReviewDecision;
pub use models::ReviewSubmission;
pub use models::Reviewer;
pub use models::Student;
pub use models::TrainingType;
pub use models::UploadReceipt;
pub use models::WorkType;
pub use session::Session;
pub use session::SessionError;
pub use session::SessionStore;
