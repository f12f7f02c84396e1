// crates/workcert-client/src/models.rs
// ============================================================================
// Module: Portal Domain Models
// Description: Typed request and response payloads for the portal API.
// Purpose: Decode server payloads leniently and encode request bodies exactly.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Response types tolerate missing optional fields and keep unknown fields in
//! a flattened `extra` map so that server additions are not lost. Request
//! bodies are closed types serialized with the field names the server reads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Identities
// ============================================================================

/// Student identity returned by the email lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Server-assigned student identifier.
    pub student_id: String,
    /// Institutional email.
    pub email: String,
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Degree programme name.
    #[serde(default)]
    pub degree: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Reviewer identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reviewer {
    /// Server-assigned reviewer identifier.
    pub reviewer_id: String,
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Institutional email.
    #[serde(default)]
    pub email: Option<String>,
    /// Department name.
    #[serde(default)]
    pub department: Option<String>,
    /// Job title.
    #[serde(default)]
    pub position: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Reviewer {
    /// Returns "First Last", skipping missing parts.
    #[must_use]
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() { self.reviewer_id.clone() } else { parts.join(" ") }
    }
}

// ============================================================================
// SECTION: Applications
// ============================================================================

/// One certificate application as listed for a student or reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Certificate identifier.
    #[serde(alias = "id")]
    pub certificate_id: String,
    /// Workflow status, e.g. `PENDING` or `REVIEWED`.
    #[serde(default)]
    pub status: Option<String>,
    /// Effective decision.
    #[serde(default)]
    pub decision: Option<String>,
    /// Automated decision.
    #[serde(default)]
    pub ai_decision: Option<String>,
    /// Reviewer decision.
    #[serde(default)]
    pub reviewer_decision: Option<String>,
    /// Reviewer comment.
    #[serde(default)]
    pub reviewer_comment: Option<String>,
    /// Assigned reviewer's display name.
    #[serde(default)]
    pub reviewer_name: Option<String>,
    /// Credits calculated for the application.
    #[serde(default)]
    pub credits: Option<f64>,
    /// Requested training type.
    #[serde(default)]
    pub training_type: Option<String>,
    /// Uploaded file name.
    #[serde(default)]
    pub filename: Option<String>,
    /// Submission timestamp as sent by the server.
    #[serde(default)]
    pub submitted_date: Option<String>,
    /// Appeal status, when an appeal exists.
    #[serde(default)]
    pub appeal_status: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// ============================================================================
// SECTION: Operation Results
// ============================================================================

/// Health endpoint payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Reported status string.
    #[serde(default)]
    pub status: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Result of a certificate upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Identifier of the stored certificate.
    pub certificate_id: String,
    /// Optional server message.
    #[serde(default)]
    pub message: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Result of certificate evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingOutcome {
    /// Optional server message.
    #[serde(default)]
    pub message: Option<String>,
    /// Evaluation payload as returned by the server.
    #[serde(flatten)]
    pub payload: BTreeMap<String, Value>,
}

/// Envelope-only acknowledgement of a mutating call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Optional server message.
    #[serde(default)]
    pub message: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Binary file returned by a download endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// File bytes.
    pub bytes: Vec<u8>,
    /// File name from `Content-Disposition`, if provided.
    pub file_name: Option<String>,
    /// Content type, if provided.
    pub content_type: Option<String>,
}

// ============================================================================
// SECTION: Request Inputs
// ============================================================================

/// In-memory file attached to a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// File name sent in the part header.
    pub file_name: String,
    /// File bytes.
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Creates an upload from a name and contents.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::try_from(self.bytes.len()).unwrap_or(u64::MAX)
    }
}

/// Kind of credit requested for a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingType {
    /// Training in the student's own field.
    General,
    /// Training in a related professional field.
    Professional,
}

/// Kind of work the certificate documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkType {
    /// Employment with an employer certificate.
    #[default]
    Regular,
    /// Self-directed work backed by additional documents.
    SelfPaced,
}

/// Reviewer verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewDecision {
    /// Accept.
    Pass,
    /// Reject.
    Fail,
}

/// Wire value and parse support shared by the small closed enums above.
macro_rules! wire_enum {
    ($ty:ident, $err:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $ty {
            /// Returns the wire value.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let normalized = value.trim().replace('-', "_");
                $(
                    if normalized.eq_ignore_ascii_case($wire) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!($err, value))
            }
        }
    };
}

wire_enum!(TrainingType, "unknown training type: {}", {
    General => "general",
    Professional => "professional",
});

wire_enum!(WorkType, "unknown work type: {}", {
    Regular => "REGULAR",
    SelfPaced => "SELF_PACED",
});

wire_enum!(ReviewDecision, "Reviewer decision must be either \"PASS\" or \"FAIL\", got {}", {
    Pass => "PASS",
    Fail => "FAIL",
});

/// Certificate upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateUpload {
    /// Certificate file.
    pub file: FileUpload,
    /// Requested training type.
    pub training_type: TrainingType,
    /// Kind of work documented.
    pub work_type: WorkType,
    /// Supporting files; only sent for [`WorkType::SelfPaced`].
    pub additional_documents: Vec<FileUpload>,
}

/// One-shot document evaluation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSubmission {
    /// Document file.
    pub file: FileUpload,
    /// Degree programme the document is evaluated against.
    pub student_degree: String,
    /// Submitting student's email.
    pub student_email: String,
    /// Requested training type.
    pub training_type: TrainingType,
}

/// Reviewer verdict submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSubmission {
    /// Free-text justification; must be non-empty.
    pub reviewer_comment: String,
    /// Verdict.
    pub reviewer_decision: ReviewDecision,
}

/// `send-for-approval` body.
#[derive(Debug, Serialize)]
pub(crate) struct ApprovalBody<'a> {
    /// Assigned reviewer.
    pub reviewer_id: &'a str,
}

/// `appeal` body.
#[derive(Debug, Serialize)]
pub(crate) struct AppealBody<'a> {
    /// Student's reason for the appeal.
    pub appeal_reason: &'a str,
    /// Reviewer the appeal is routed to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<&'a str>,
}

/// `feedback` body.
#[derive(Debug, Serialize)]
pub(crate) struct FeedbackBody<'a> {
    /// Feedback text.
    pub student_feedback: &'a str,
    /// Reviewer the feedback is addressed to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<&'a str>,
}

// ============================================================================
// SECTION: Tests
// ============================================================================
