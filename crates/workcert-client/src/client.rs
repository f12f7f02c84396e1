// crates/workcert-client/src/client.rs
// ============================================================================
// Module: Portal Client
// Description: Tracked wrappers for every portal API operation.
// Purpose: Issue HTTP calls while publishing checkpoint progress to a tracker.
// Dependencies: reqwest, serde, serde_json, url, workcert-config, workcert-tracker
// ============================================================================

//! ## Overview
//! [`PortalClient`] owns one HTTP client and a handle to the injected
//! [`RequestTracker`]. Each wrapper validates its input, registers a
//! [`TrackedRequest`], publishes the dispatched and received checkpoints
//! around the network call, maps the outcome to an [`ApiError`], and settles
//! the guard. The record leaves the tracker on every exit path, including a
//! dropped future.
//!
//! Security posture: server responses are untrusted; bodies are read under a
//! hard size limit and redirects are not followed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;
use workcert_config::ApiConfig;
use workcert_tracker::RequestKind;
use workcert_tracker::RequestTracker;

use crate::error::ApiError;
use crate::error::FailureText;
use crate::guard::TrackedRequest;
use crate::log::NoopRequestLog;
use crate::log::RequestLog;
use crate::models::Acknowledgement;
use crate::models::AppealBody;
use crate::models::ApprovalBody;
use crate::models::Application;
use crate::models::CertificateUpload;
use crate::models::DocumentSubmission;
use crate::models::DownloadedFile;
use crate::models::FeedbackBody;
use crate::models::FileUpload;
use crate::models::HealthStatus;
use crate::models::ProcessingOutcome;
use crate::models::ReviewSubmission;
use crate::models::Reviewer;
use crate::models::Student;
use crate::models::UploadReceipt;
use crate::models::WorkType;

// ============================================================================
// SECTION: Failure Wording
// ============================================================================

/// Student lookup.
const STUDENT_LOOKUP: FailureText = FailureText {
    not_found: "Student not found",
    bad_request: Some("Invalid email format"),
    rejected: "Failed to verify student",
};

/// Student application listing.
const STUDENT_APPLICATIONS: FailureText = FailureText {
    rejected: "Failed to fetch applications",
    ..STUDENT_LOOKUP
};

/// Certificate upload.
const UPLOAD: FailureText = FailureText {
    not_found: "Student not found",
    bad_request: None,
    rejected: "Failed to upload certificate",
};

/// Reviewer lookup.
const REVIEWER_LOOKUP: FailureText = FailureText {
    not_found: "Reviewer not found",
    bad_request: Some("Invalid email format"),
    rejected: "Failed to fetch reviewer",
};

/// Reviewer certificate listing.
const REVIEWER_CERTIFICATES: FailureText = FailureText {
    not_found: "Reviewer not found",
    bad_request: Some("Invalid reviewer ID"),
    rejected: "Failed to fetch reviewer certificates",
};

/// Reviewer listing.
const REVIEWERS: FailureText = FailureText {
    rejected: "Failed to fetch reviewers",
    ..FailureText::GENERIC
};

/// Builds wording for operations addressed by certificate id.
const fn certificate(rejected: &'static str) -> FailureText {
    FailureText {
        not_found: "Certificate not found",
        bad_request: None,
        rejected,
    }
}

/// Certificate file download.
const CERTIFICATE_FILE: FailureText = FailureText {
    not_found: "Certificate file not found",
    ..FailureText::GENERIC
};

// ============================================================================
// SECTION: Client
// ============================================================================

/// Client for the work certificate portal API.
///
/// # Invariants
/// - `base_url` is an absolute http(s) URL that can carry path segments.
/// - Every network-issuing method registers exactly one record for its
///   duration.
pub struct PortalClient {
    /// Underlying HTTP client.
    http: Client,
    /// API root every path is appended to.
    base_url: Url,
    /// Injected request registry.
    tracker: RequestTracker,
    /// Settlement sink.
    log: Arc<dyn RequestLog>,
    /// Deadlines and limits.
    api: ApiConfig,
}

impl fmt::Debug for PortalClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalClient")
            .field("base_url", &self.base_url.as_str())
            .field("tracker", &self.tracker)
            .field("timeout_ms", &self.api.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl PortalClient {
    /// Builds a client for `config` publishing into `tracker`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] when the base URL is unusable or
    /// the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig, tracker: RequestTracker) -> Result<Self, ApiError> {
        let base_url =
            config.parsed_base_url().map_err(|err| ApiError::InvalidInput(err.to_string()))?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .redirect(Policy::none())
            .build()
            .map_err(|err| ApiError::InvalidInput(err.to_string()))?;
        Ok(Self {
            http,
            base_url,
            tracker,
            log: Arc::new(NoopRequestLog),
            api: config.clone(),
        })
    }

    /// Replaces the request log.
    #[must_use]
    pub fn with_request_log(mut self, log: Arc<dyn RequestLog>) -> Self {
        self.log = log;
        self
    }

    /// Returns the tracker this client publishes into.
    #[must_use]
    pub const fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    /// Returns the API root.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ------------------------------------------------------------------------
    // General
    // ------------------------------------------------------------------------

    /// Checks API availability.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn check_health(&self) -> Result<HealthStatus, ApiError> {
        let url = self.endpoint(&["api", "health"])?;
        let mut request = self.track(RequestKind::HealthCheck, None);
        let result = self.fetch_json(&mut request, self.http.get(url), &FailureText::GENERIC).await;
        request.finish(result)
    }

    /// Lists degree programme names; a missing `degrees` field is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn get_degree_programs(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint(&["api", "degrees"])?;
        let mut request = self.track(RequestKind::FetchDegrees, None);
        let result = self
            .fetch_json::<Value>(&mut request, self.http.get(url), &FailureText::GENERIC)
            .await
            .and_then(|mut value| list_field(&mut value, "degrees"));
        request.finish(result)
    }

    /// Lists reviewers available for approval requests.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure or when the envelope reports failure.
    pub async fn get_reviewers(&self) -> Result<Vec<Reviewer>, ApiError> {
        let url = self.endpoint(&["reviewers"])?;
        let mut request = self.track(RequestKind::FetchReviewers, None);
        let result = self
            .fetch_enveloped(&mut request, self.http.get(url), &REVIEWERS)
            .await
            .and_then(|mut value| list_field(&mut value, "reviewers"));
        request.finish(result)
    }

    // ------------------------------------------------------------------------
    // Student
    // ------------------------------------------------------------------------

    /// Looks up a student by email.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown students and
    /// [`ApiError::Validation`] for malformed emails.
    pub async fn verify_student(&self, email: &str) -> Result<Student, ApiError> {
        let url = self.endpoint(&["student", require("email", email)?])?;
        let mut request = self.track(RequestKind::LookupStudent, None);
        let result = self.fetch_json(&mut request, self.http.get(url), &STUDENT_LOOKUP).await;
        request.finish(result)
    }

    /// Lists a student's applications.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure or when the envelope reports failure.
    pub async fn get_student_applications(
        &self,
        email: &str,
    ) -> Result<Vec<Application>, ApiError> {
        let url = self.endpoint(&["student", require("email", email)?, "applications"])?;
        let mut request = self.track(RequestKind::FetchApplications, None);
        let result = self
            .fetch_enveloped(&mut request, self.http.get(url), &STUDENT_APPLICATIONS)
            .await
            .and_then(|mut value| list_field(&mut value, "applications"));
        request.finish(result)
    }

    /// Uploads a certificate for a student.
    ///
    /// Additional documents are only sent for [`WorkType::SelfPaced`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure or when the envelope reports failure.
    pub async fn upload_certificate(
        &self,
        student_id: &str,
        upload: CertificateUpload,
    ) -> Result<UploadReceipt, ApiError> {
        let url =
            self.endpoint(&["student", require("student id", student_id)?, "upload-certificate"])?;
        let file = (upload.file.file_name.clone(), upload.file.size());
        let mut form = Form::new()
            .part("file", file_part(upload.file))
            .text("training_type", upload.training_type.as_str())
            .text("work_type", upload.work_type.as_str());
        if upload.work_type == WorkType::SelfPaced {
            for document in upload.additional_documents {
                form = form.part("additional_documents", file_part(document));
            }
        }
        let mut request =
            self.track(RequestKind::UploadCertificate, Some((file.0.as_str(), file.1)));
        let result = self
            .fetch_enveloped(&mut request, self.http.post(url).multipart(form), &UPLOAD)
            .await
            .and_then(from_value);
        request.finish(result)
    }

    /// Evaluates a document in one request without storing a certificate.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn process_document(&self, submission: DocumentSubmission) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "process"])?;
        let file = (submission.file.file_name.clone(), submission.file.size());
        let form = Form::new()
            .part("file", file_part(submission.file))
            .text("student_degree", submission.student_degree)
            .text("student_email", submission.student_email)
            .text("training_type", submission.training_type.as_str());
        let mut request =
            self.track(RequestKind::ProcessDocument, Some((file.0.as_str(), file.1)));
        let result = self
            .fetch_json(&mut request, self.http.post(url).multipart(form), &FailureText::GENERIC)
            .await;
        request.finish(result)
    }

    // ------------------------------------------------------------------------
    // Certificates
    // ------------------------------------------------------------------------

    /// Runs evaluation of a stored certificate.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure or when the envelope reports failure.
    pub async fn process_certificate(
        &self,
        certificate_id: &str,
    ) -> Result<ProcessingOutcome, ApiError> {
        let url = self.certificate_endpoint(certificate_id, Some("process"))?;
        let mut request = self.track(RequestKind::ProcessCertificate, None);
        let text = certificate("Failed to process certificate");
        let result =
            self.fetch_enveloped(&mut request, self.http.post(url), &text).await.and_then(from_value);
        request.finish(result)
    }

    /// Fetches the full evaluation details of a certificate.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure or when the envelope reports failure.
    pub async fn get_certificate_details(&self, certificate_id: &str) -> Result<Value, ApiError> {
        let url = self.certificate_endpoint(certificate_id, Some("details"))?;
        let mut request = self.track(RequestKind::FetchCertificateDetails, None);
        let text = certificate("Failed to fetch certificate details");
        let result = self.fetch_enveloped(&mut request, self.http.get(url), &text).await;
        request.finish(result)
    }

    /// Returns the preview URL of a certificate without issuing a request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for an empty certificate id.
    pub fn preview_certificate(&self, certificate_id: &str) -> Result<Url, ApiError> {
        let url = self.certificate_endpoint(certificate_id, Some("preview"))?;
        let request = self.track(RequestKind::PreviewCertificate, None);
        request.dispatched();
        request.finish(Ok(url))
    }

    /// Downloads the original certificate file.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the file is missing.
    pub async fn download_certificate(
        &self,
        certificate_id: &str,
    ) -> Result<DownloadedFile, ApiError> {
        let url = self.certificate_endpoint(certificate_id, None)?;
        let mut request = self.track(RequestKind::DownloadCertificate, None);
        let result = self.fetch_file(&mut request, url, &CERTIFICATE_FILE).await;
        request.finish(result)
    }

    /// Downloads a generated report.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn download_report(&self, processing_id: &str) -> Result<DownloadedFile, ApiError> {
        let url = self.endpoint(&["api", "download", require("processing id", processing_id)?])?;
        let mut request = self.track(RequestKind::DownloadReport, None);
        let result = self.fetch_file(&mut request, url, &FailureText::GENERIC).await;
        request.finish(result)
    }

    /// Sends a certificate to a reviewer for approval.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure or when the envelope reports failure.
    pub async fn send_for_approval(
        &self,
        certificate_id: &str,
        reviewer_id: &str,
    ) -> Result<Acknowledgement, ApiError> {
        let url = self.certificate_endpoint(certificate_id, Some("send-for-approval"))?;
        let body = ApprovalBody {
            reviewer_id: require("reviewer id", reviewer_id)?,
        };
        let mut request = self.track(RequestKind::SendForApproval, None);
        let text = certificate("Failed to send for approval");
        let result = self
            .fetch_enveloped(&mut request, self.http.post(url).json(&body), &text)
            .await
            .and_then(from_value);
        request.finish(result)
    }

    /// Appeals a decision, optionally routing it to a reviewer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure or when the envelope reports failure.
    pub async fn submit_appeal(
        &self,
        certificate_id: &str,
        appeal_reason: &str,
        reviewer_id: Option<&str>,
    ) -> Result<Acknowledgement, ApiError> {
        let url = self.certificate_endpoint(certificate_id, Some("appeal"))?;
        let body = AppealBody {
            appeal_reason: require("appeal reason", appeal_reason)?,
            reviewer_id: reviewer_id.filter(|id| !id.trim().is_empty()),
        };
        let mut request = self.track(RequestKind::SubmitAppeal, None);
        let text = certificate("Failed to submit appeal");
        let result = self
            .fetch_enveloped(&mut request, self.http.post(url).json(&body), &text)
            .await
            .and_then(from_value);
        request.finish(result)
    }

    /// Attaches student feedback to a certificate.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure or when the envelope reports failure.
    pub async fn add_feedback(
        &self,
        certificate_id: &str,
        student_feedback: &str,
        reviewer_id: Option<&str>,
    ) -> Result<Acknowledgement, ApiError> {
        let url = self.certificate_endpoint(certificate_id, Some("feedback"))?;
        let body = FeedbackBody {
            student_feedback: require("feedback", student_feedback)?,
            reviewer_id: reviewer_id.filter(|id| !id.trim().is_empty()),
        };
        let mut request = self.track(RequestKind::AddFeedback, None);
        let text = certificate("Failed to add feedback");
        let result = self
            .fetch_enveloped(&mut request, self.http.post(url).json(&body), &text)
            .await
            .and_then(from_value);
        request.finish(result)
    }

    /// Records a reviewer verdict.
    ///
    /// Input is validated before anything is registered or sent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for an empty comment, otherwise
    /// [`ApiError`] on failure or when the envelope reports failure.
    pub async fn submit_review(
        &self,
        certificate_id: &str,
        review: &ReviewSubmission,
    ) -> Result<Acknowledgement, ApiError> {
        if review.reviewer_comment.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "Both reviewer comment and decision are required".to_string(),
            ));
        }
        let url = self.certificate_endpoint(certificate_id, Some("review"))?;
        let mut request = self.track(RequestKind::SubmitReview, None);
        let text = certificate("Failed to submit review");
        let result = self
            .fetch_enveloped(&mut request, self.http.post(url).json(review), &text)
            .await
            .and_then(from_value);
        request.finish(result)
    }

    /// Deletes an application.
    ///
    /// An empty or non-JSON success body counts as success; only an explicit
    /// `success: false` is a rejection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, a non-success status, or an
    /// explicit rejection.
    pub async fn delete_application(&self, certificate_id: &str) -> Result<(), ApiError> {
        let url = self.certificate_endpoint(certificate_id, None)?;
        let mut request = self.track(RequestKind::DeleteApplication, None);
        let text = certificate("Failed to delete application");
        let result = self.delete(&mut request, url, &text).await;
        request.finish(result)
    }

    // ------------------------------------------------------------------------
    // Reviewer
    // ------------------------------------------------------------------------

    /// Looks up a reviewer by email.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure, when the envelope reports failure, or
    /// when the `reviewer` field is missing.
    pub async fn get_reviewer_by_email(&self, email: &str) -> Result<Reviewer, ApiError> {
        let url = self.endpoint(&["reviewer", require("email", email)?])?;
        let mut request = self.track(RequestKind::LookupReviewer, None);
        let result = self
            .fetch_enveloped(&mut request, self.http.get(url), &REVIEWER_LOOKUP)
            .await
            .and_then(|mut value| required_field(&mut value, "reviewer"));
        request.finish(result)
    }

    /// Lists the certificates assigned to a reviewer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure or when the envelope reports failure.
    pub async fn get_reviewer_certificates(
        &self,
        reviewer_id: &str,
    ) -> Result<Vec<Application>, ApiError> {
        let url = self.endpoint(&["reviewer", require("reviewer id", reviewer_id)?, "certificates"])?;
        let mut request = self.track(RequestKind::FetchReviewerCertificates, None);
        let result = self
            .fetch_enveloped(&mut request, self.http.get(url), &REVIEWER_CERTIFICATES)
            .await
            .and_then(|mut value| list_field(&mut value, "applications"));
        request.finish(result)
    }

    // ------------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------------

    /// Registers a record for `kind`.
    fn track(&self, kind: RequestKind, file: Option<(&str, u64)>) -> TrackedRequest {
        TrackedRequest::start(&self.tracker, Arc::clone(&self.log), kind, file)
    }

    /// Appends percent-encoded path segments to the API root.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                ApiError::InvalidInput("api base url cannot carry a path".to_string())
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Builds `/certificate/{id}[/{action}]`.
    fn certificate_endpoint(
        &self,
        certificate_id: &str,
        action: Option<&str>,
    ) -> Result<Url, ApiError> {
        let id = require("certificate id", certificate_id)?;
        match action {
            Some(action) => self.endpoint(&["certificate", id, action]),
            None => self.endpoint(&["certificate", id]),
        }
    }

    /// Sends the request and reads the body under the configured limit.
    async fn execute(
        &self,
        request: &mut TrackedRequest,
        builder: RequestBuilder,
    ) -> Result<RawResponse, ApiError> {
        request.dispatched();
        let response = builder
            .timeout(self.api.timeout_for(request.kind()))
            .send()
            .await
            .map_err(|err| ApiError::from_transport(&err))?;
        let status = response.status().as_u16();
        request.received(status);
        let headers = response.headers().clone();
        let body = read_response_body_with_limit(response, self.api.max_response_bytes).await?;
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Sends the request and decodes a JSON success body as `T`.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: &mut TrackedRequest,
        builder: RequestBuilder,
        text: &FailureText,
    ) -> Result<T, ApiError> {
        let response = self.execute(request, builder).await?.require_success(text)?;
        decode(&response.body)
    }

    /// Sends the request and returns the JSON body once its envelope reports
    /// success.
    async fn fetch_enveloped(
        &self,
        request: &mut TrackedRequest,
        builder: RequestBuilder,
        text: &FailureText,
    ) -> Result<Value, ApiError> {
        let value: Value = self.fetch_json(request, builder, text).await?;
        request.complete();
        ensure_success(&value, text)?;
        Ok(value)
    }

    /// Downloads a binary body.
    async fn fetch_file(
        &self,
        request: &mut TrackedRequest,
        url: Url,
        text: &FailureText,
    ) -> Result<DownloadedFile, ApiError> {
        let response = self.execute(request, self.http.get(url)).await?.require_success(text)?;
        let file_name =
            header_text(&response.headers, CONTENT_DISPOSITION).and_then(disposition_file_name);
        let content_type = header_text(&response.headers, CONTENT_TYPE).map(str::to_string);
        Ok(DownloadedFile {
            bytes: response.body,
            file_name,
            content_type,
        })
    }

    /// Issues a DELETE with lenient body handling.
    async fn delete(
        &self,
        request: &mut TrackedRequest,
        url: Url,
        text: &FailureText,
    ) -> Result<(), ApiError> {
        let response = self.execute(request, self.http.delete(url)).await?.require_success(text)?;
        request.complete();
        let Ok(value) = serde_json::from_slice::<Value>(&response.body) else {
            return Ok(());
        };
        if value.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(text.rejected_error(value.get("message").and_then(Value::as_str)));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Response with its body fully read.
struct RawResponse {
    /// HTTP status code.
    status: u16,
    /// Response headers.
    headers: HeaderMap,
    /// Response body.
    body: Vec<u8>,
}

impl RawResponse {
    /// Maps a non-2xx status to its error.
    fn require_success(self, text: &FailureText) -> Result<Self, ApiError> {
        if (200 .. 300).contains(&self.status) {
            Ok(self)
        } else {
            Err(text.status_error(self.status, &self.body))
        }
    }
}

/// Reads a response body while enforcing a hard byte limit.
async fn read_response_body_with_limit(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|err| ApiError::from_transport(&err))? {
        let next_total = body.len().saturating_add(chunk.len());
        if next_total > limit {
            return Err(ApiError::Decode(format!("response exceeds {limit} bytes")));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects blank identifiers before anything is registered or sent.
fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!("{field} is required")));
    }
    Ok(value)
}

/// Builds a multipart file part.
fn file_part(file: FileUpload) -> Part {
    Part::bytes(file.bytes).file_name(file.file_name)
}

/// Decodes a JSON body.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Converts a JSON value.
fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Requires `success: true` in an envelope.
fn ensure_success(value: &Value, text: &FailureText) -> Result<(), ApiError> {
    if value.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }
    Err(text.rejected_error(value.get("message").and_then(Value::as_str)))
}

/// Takes a list field; absent or null is empty.
fn list_field<T: DeserializeOwned>(value: &mut Value, field: &str) -> Result<Vec<T>, ApiError> {
    match value.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(items) => from_value(items),
    }
}

/// Takes a required object field.
fn required_field<T: DeserializeOwned>(value: &mut Value, field: &str) -> Result<T, ApiError> {
    match value.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => Err(ApiError::Decode(format!("missing field `{field}`"))),
        Some(item) => from_value(item),
    }
}

/// Returns a header as text when present and visible ASCII.
fn header_text(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Extracts the `filename` parameter of a `Content-Disposition` value.
pub(crate) fn disposition_file_name(value: &str) -> Option<String> {
    value.split(';').find_map(|param| {
        let (key, raw) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let name = raw.trim().trim_matches('"').trim();
        (!name.is_empty()).then(|| name.to_string())
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
