// crates/workcert-tracker/src/record.rs
// ============================================================================
// Module: Request Records
// Description: In-flight request records, identifiers, and operation tags.
// Purpose: Describe one logical API operation while it is being tracked.
// Dependencies: rand, serde, thiserror, time
// ============================================================================

//! ## Overview
//! A [`RequestRecord`] represents one in-flight logical API operation. It is
//! created when a wrapper starts, mutated through [`RequestUpdate`] merges,
//! and removed when the call settles. Records carry only display metadata;
//! request and response bodies never enter the registry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rand::RngCore;
use rand::rngs::OsRng;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Upper bound for checkpoint progress values.
pub const MAX_PROGRESS: u8 = 100;

/// Digits used for base-36 identifier encoding.
const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Opaque request identifier.
///
/// # Invariants
/// - Generated values are a base-36 millisecond timestamp followed by a
///   base-36 random suffix. Uniqueness is practical, not cryptographic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Wraps an existing identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh identifier from the wall clock and a random suffix.
    #[must_use]
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        let suffix = OsRng.next_u64();
        let mut id = to_base36(millis);
        id.push_str(&to_base36(suffix));
        Self(id)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encodes a value as lowercase base-36.
fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        let index = usize::try_from(value % 36).unwrap_or(0);
        digits.push(BASE36_DIGITS[index]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

// ============================================================================
// SECTION: Request Kinds
// ============================================================================

/// Closed set of tracked backend operations.
///
/// # Invariants
/// - Wire labels are stable snake_case strings used in config keys and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// API liveness check.
    HealthCheck,
    /// Degree program listing.
    FetchDegrees,
    /// Reviewer listing.
    FetchReviewers,
    /// Student lookup by email.
    LookupStudent,
    /// Student application listing.
    FetchApplications,
    /// Certificate upload (multipart).
    UploadCertificate,
    /// Single-shot document processing (multipart).
    ProcessDocument,
    /// AI processing of an uploaded certificate.
    ProcessCertificate,
    /// Certificate detail fetch.
    FetchCertificateDetails,
    /// Certificate preview URL resolution.
    PreviewCertificate,
    /// Certificate file download.
    DownloadCertificate,
    /// Processing report download.
    DownloadReport,
    /// Send an application to a reviewer.
    SendForApproval,
    /// Student appeal submission.
    SubmitAppeal,
    /// Student feedback on a decision.
    AddFeedback,
    /// Reviewer decision submission.
    SubmitReview,
    /// Reviewer lookup by email.
    LookupReviewer,
    /// Certificates assigned to a reviewer.
    FetchReviewerCertificates,
    /// Application deletion.
    DeleteApplication,
}

impl RequestKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 19] = [
        Self::HealthCheck,
        Self::FetchDegrees,
        Self::FetchReviewers,
        Self::LookupStudent,
        Self::FetchApplications,
        Self::UploadCertificate,
        Self::ProcessDocument,
        Self::ProcessCertificate,
        Self::FetchCertificateDetails,
        Self::PreviewCertificate,
        Self::DownloadCertificate,
        Self::DownloadReport,
        Self::SendForApproval,
        Self::SubmitAppeal,
        Self::AddFeedback,
        Self::SubmitReview,
        Self::LookupReviewer,
        Self::FetchReviewerCertificates,
        Self::DeleteApplication,
    ];

    /// Returns the stable wire label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HealthCheck => "health_check",
            Self::FetchDegrees => "fetch_degrees",
            Self::FetchReviewers => "fetch_reviewers",
            Self::LookupStudent => "lookup_student",
            Self::FetchApplications => "fetch_applications",
            Self::UploadCertificate => "upload_certificate",
            Self::ProcessDocument => "process_document",
            Self::ProcessCertificate => "process_certificate",
            Self::FetchCertificateDetails => "fetch_certificate_details",
            Self::PreviewCertificate => "preview_certificate",
            Self::DownloadCertificate => "download_certificate",
            Self::DownloadReport => "download_report",
            Self::SendForApproval => "send_for_approval",
            Self::SubmitAppeal => "submit_appeal",
            Self::AddFeedback => "add_feedback",
            Self::SubmitReview => "submit_review",
            Self::LookupReviewer => "lookup_reviewer",
            Self::FetchReviewerCertificates => "fetch_reviewer_certificates",
            Self::DeleteApplication => "delete_application",
        }
    }

    /// Returns a short human-readable description for progress displays.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HealthCheck => "Checking API health...",
            Self::FetchDegrees => "Loading degree programs...",
            Self::FetchReviewers => "Loading reviewers...",
            Self::LookupStudent => "Looking up student...",
            Self::FetchApplications => "Loading applications...",
            Self::UploadCertificate => "Uploading certificate...",
            Self::ProcessDocument => "Processing document...",
            Self::ProcessCertificate => "Evaluating certificate...",
            Self::FetchCertificateDetails => "Loading certificate details...",
            Self::PreviewCertificate => "Preparing preview...",
            Self::DownloadCertificate => "Downloading certificate...",
            Self::DownloadReport => "Downloading report...",
            Self::SendForApproval => "Sending for approval...",
            Self::SubmitAppeal => "Submitting appeal...",
            Self::AddFeedback => "Sending feedback...",
            Self::SubmitReview => "Submitting review...",
            Self::LookupReviewer => "Looking up reviewer...",
            Self::FetchReviewerCertificates => "Loading assigned certificates...",
            Self::DeleteApplication => "Deleting application...",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a request kind label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown request kind: {0}")]
pub struct ParseRequestKindError(pub String);

impl FromStr for RequestKind {
    type Err = ParseRequestKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| ParseRequestKindError(value.to_string()))
    }
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// One in-flight logical API operation.
///
/// # Invariants
/// - `progress` never exceeds [`MAX_PROGRESS`] when written through the
///   constructors or [`RequestUpdate`].
/// - `file_name` and `file_size` are display-only metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Unique request identifier.
    pub id: RequestId,
    /// Operation tag.
    #[serde(rename = "type")]
    pub kind: RequestKind,
    /// Checkpoint progress, 0 to 100.
    pub progress: u8,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    /// Optional file name for upload-style operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Optional file size in bytes for upload-style operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

impl RequestRecord {
    /// Creates a record at zero progress stamped with the current time.
    #[must_use]
    pub fn new(id: RequestId, kind: RequestKind) -> Self {
        Self {
            id,
            kind,
            progress: 0,
            started_at: OffsetDateTime::now_utc(),
            file_name: None,
            file_size: None,
        }
    }

    /// Attaches file display metadata.
    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, size: u64) -> Self {
        self.file_name = Some(name.into());
        self.file_size = Some(size);
        self
    }

    /// Sets the initial progress, clamped to [`MAX_PROGRESS`].
    #[must_use]
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(MAX_PROGRESS);
        self
    }

    /// Applies a shallow merge of the provided update.
    pub fn apply(&mut self, update: &RequestUpdate) {
        if let Some(progress) = update.progress {
            self.progress = progress.min(MAX_PROGRESS);
        }
        if let Some(name) = &update.file_name {
            self.file_name = Some(name.clone());
        }
        if let Some(size) = update.file_size {
            self.file_size = Some(size);
        }
    }
}

/// Partial record fields merged by `update_request`.
///
/// # Invariants
/// - `None` fields leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestUpdate {
    /// Replacement progress value.
    pub progress: Option<u8>,
    /// Replacement file name.
    pub file_name: Option<String>,
    /// Replacement file size.
    pub file_size: Option<u64>,
}

impl RequestUpdate {
    /// Builds an update that only changes progress.
    #[must_use]
    pub const fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            file_name: None,
            file_size: None,
        }
    }
}
