// crates/workcert-client/src/error.rs
// ============================================================================
// Module: Portal API Errors
// Description: Failure taxonomy for tracked portal API calls.
// Purpose: Map transport, status, and envelope failures to stable categories.
// Dependencies: reqwest, serde, thiserror
// ============================================================================

//! ## Overview
//! Every wrapper failure is an [`ApiError`], and every [`ApiError`] belongs to
//! exactly one [`ErrorCategory`]. Display strings are the user-facing messages
//! shown by presentation layers, so they are kept stable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Messages
// ============================================================================

/// Message for transport failures.
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection.";
/// Message for deadline expiry.
pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again.";
/// Default message for HTTP 404.
pub const NOT_FOUND_MESSAGE: &str = "Resource not found.";
/// Suffix for HTTP 5xx and other unexpected statuses.
pub const SERVER_MESSAGE: &str = "Server error. Please try again later.";
/// Default message for HTTP 400 without a `detail` field.
pub const VALIDATION_MESSAGE: &str = "Invalid data provided.";

// ============================================================================
// SECTION: Categories
// ============================================================================

/// Coarse failure class of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Connection could not be established or was interrupted.
    Network,
    /// Per-call deadline expired.
    Timeout,
    /// HTTP 404.
    NotFound,
    /// HTTP 400.
    Validation,
    /// HTTP 5xx, other unexpected statuses, or an undecodable success body.
    Server,
    /// Well-formed response whose envelope reports `success: false`.
    Rejected,
    /// Client-side precondition failed before any request was issued.
    InvalidInput,
}

impl ErrorCategory {
    /// Returns the stable snake_case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Server => "server",
            Self::Rejected => "rejected",
            Self::InvalidInput => "invalid_input",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure of a portal API call.
///
/// # Invariants
/// - [`ApiError::category`] is total and never changes for a given variant.
/// - Display output is user-facing and may include untrusted server text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport failure; the payload is the transport's own description.
    #[error("Network error. Please check your connection.")]
    Network(String),
    /// Deadline expiry.
    #[error("Request timeout. Please try again.")]
    Timeout,
    /// Resource missing; the payload is operation-specific.
    #[error("{0}")]
    NotFound(String),
    /// Request rejected by server-side validation.
    #[error("{0}")]
    Validation(String),
    /// Unexpected HTTP status.
    #[error("HTTP {status}: Server error. Please try again later.")]
    Server {
        /// HTTP status code.
        status: u16,
    },
    /// Success status with a body that could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),
    /// Success status whose envelope reported a logical failure.
    #[error("{0}")]
    Rejected(String),
    /// Input rejected before any request was issued.
    #[error("{0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout => ErrorCategory::Timeout,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Server {
                ..
            }
            | Self::Decode(_) => ErrorCategory::Server,
            Self::Rejected(_) => ErrorCategory::Rejected,
            Self::InvalidInput(_) => ErrorCategory::InvalidInput,
        }
    }

    /// Returns the HTTP status that produced this error, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server {
                status,
            } => Some(*status),
            _ => None,
        }
    }

    /// Classifies a transport error from the HTTP client.
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() { Self::Timeout } else { Self::Network(err.to_string()) }
    }
}

// ============================================================================
// SECTION: Status Mapping
// ============================================================================

/// Operation-specific wording for status and envelope failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FailureText {
    /// Message for HTTP 404.
    pub not_found: &'static str,
    /// Fixed message for HTTP 400; `None` prefers the server `detail`.
    pub bad_request: Option<&'static str>,
    /// Fallback for `success: false` without a `message`.
    pub rejected: &'static str,
}

impl FailureText {
    /// Wording that uses the generic defaults.
    pub const GENERIC: Self = Self {
        not_found: NOT_FOUND_MESSAGE,
        bad_request: None,
        rejected: "Request failed",
    };

    /// Maps a non-success status and its body to an error.
    pub(crate) fn status_error(&self, status: u16, body: &[u8]) -> ApiError {
        match status {
            404 => ApiError::NotFound(self.not_found.to_string()),
            400 => match self.bad_request {
                Some(message) => ApiError::Validation(message.to_string()),
                None => ApiError::Validation(
                    error_detail(body).unwrap_or_else(|| VALIDATION_MESSAGE.to_string()),
                ),
            },
            status => ApiError::Server {
                status,
            },
        }
    }

    /// Builds the rejection error for a failed envelope.
    pub(crate) fn rejected_error(&self, message: Option<&str>) -> ApiError {
        let message = message.filter(|text| !text.is_empty()).unwrap_or(self.rejected);
        ApiError::Rejected(message.to_string())
    }
}

/// Extracts a string `detail` from an error body, if present.
pub(crate) fn error_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) if !detail.is_empty() => Some(detail.clone()),
        _ => None,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
