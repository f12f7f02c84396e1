// crates/workcert-cli/src/main.rs
// ============================================================================
// Module: Work Certificate CLI Entry Point
// Description: Command dispatcher for the student and reviewer portal API.
// Purpose: Wire one tracker, one client, and one progress observer per run.
// Dependencies: clap, serde, serde_json, thiserror, tokio, workcert-client,
// workcert-config, workcert-tracker
// ============================================================================

//! ## Overview
//! The `workcert` binary is the composition root of the portal client. Each
//! invocation loads configuration, constructs a [`RequestTracker`], attaches
//! a [`LoadingObserver`] that renders progress to stderr, builds the
//! [`PortalClient`] with the configured request log, and runs exactly one
//! command. Results go to stdout as plain text or, with `--json`, as JSON.
//!
//! Security posture: server responses and local files are untrusted; uploads
//! are read under a hard size limit and download names are reduced to a bare
//! file name before anything is written.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod progress;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use workcert_client::Application;
use workcert_client::ApiError;
use workcert_client::CertificateUpload;
use workcert_client::DocumentSubmission;
use workcert_client::DownloadedFile;
use workcert_client::FileUpload;
use workcert_client::JsonLineRequestLog;
use workcert_client::NoopRequestLog;
use workcert_client::PortalClient;
use workcert_client::RequestLog;
use workcert_client::ReviewDecision;
use workcert_client::ReviewSubmission;
use workcert_client::Reviewer;
use workcert_client::Session;
use workcert_client::SessionError;
use workcert_client::SessionStore;
use workcert_client::TrainingType;
use workcert_client::WorkType;
use workcert_config::LoggingConfig;
use workcert_config::PortalConfig;
use workcert_config::RequestLogTarget;
use workcert_tracker::LoadingObserver;
use workcert_tracker::RequestTracker;

use crate::progress::ProgressRenderer;
use crate::progress::format_megabytes;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a file accepted for upload.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "workcert", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Optional config file path (defaults to workcert.toml or `WORKCERT_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Print results as JSON.
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    json: bool,
    /// Do not render progress on stderr.
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    quiet: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check API availability.
    Health,
    /// List degree programmes.
    Degrees,
    /// List reviewers available for approval requests.
    Reviewers,
    /// Store a verified identity in the session file.
    Login {
        /// Selected login subcommand.
        #[command(subcommand)]
        command: LoginCommand,
    },
    /// Clear the session file.
    Logout,
    /// Show the stored identities.
    Whoami,
    /// Student lookups.
    Student {
        /// Selected student subcommand.
        #[command(subcommand)]
        command: StudentCommand,
    },
    /// Upload a certificate for a student.
    Upload(UploadCommand),
    /// Evaluate a document in one request without storing it.
    Process(ProcessCommand),
    /// Operations on a stored certificate.
    Certificate {
        /// Selected certificate subcommand.
        #[command(subcommand)]
        command: CertificateCommand,
    },
    /// Download a generated report.
    Report(DownloadCommand),
    /// Reviewer lookups.
    Reviewer {
        /// Selected reviewer subcommand.
        #[command(subcommand)]
        command: ReviewerCommand,
    },
}

/// Login subcommands.
#[derive(Subcommand, Debug)]
enum LoginCommand {
    /// Verify a student email and remember it.
    Student {
        /// Student email address.
        email: String,
    },
    /// Verify a reviewer email and remember it with the reviewer id.
    Reviewer {
        /// Reviewer email address.
        email: String,
    },
}

/// Student subcommands.
#[derive(Subcommand, Debug)]
enum StudentCommand {
    /// Look up a student.
    Lookup(EmailArgs),
    /// List a student's applications.
    Applications(EmailArgs),
}

/// Optional student email, defaulting to the session.
#[derive(Args, Debug)]
struct EmailArgs {
    /// Student email (defaults to the signed-in student).
    #[arg(long, value_name = "EMAIL")]
    email: Option<String>,
}

/// Arguments for `upload`.
#[derive(Args, Debug)]
struct UploadCommand {
    /// Certificate file to upload.
    #[arg(long, value_name = "PATH")]
    file: PathBuf,
    /// Student id (resolved from the signed-in student when omitted).
    #[arg(long, value_name = "ID")]
    student_id: Option<String>,
    /// Training type: general or professional.
    #[arg(long, value_name = "TYPE")]
    training_type: TrainingType,
    /// Work type: regular or self-paced.
    #[arg(long, value_name = "TYPE", default_value = "regular")]
    work_type: WorkType,
    /// Supporting documents; only sent for self-paced work.
    #[arg(long = "additional", value_name = "PATH")]
    additional_documents: Vec<PathBuf>,
}

/// Arguments for `process`.
#[derive(Args, Debug)]
struct ProcessCommand {
    /// Document to evaluate.
    #[arg(long, value_name = "PATH")]
    file: PathBuf,
    /// Student degree programme.
    #[arg(long, value_name = "DEGREE")]
    degree: String,
    /// Student email (defaults to the signed-in student).
    #[arg(long, value_name = "EMAIL")]
    email: Option<String>,
    /// Training type: general or professional.
    #[arg(long, value_name = "TYPE")]
    training_type: TrainingType,
}

/// Certificate subcommands.
#[derive(Subcommand, Debug)]
enum CertificateCommand {
    /// Run evaluation of a stored certificate.
    Evaluate(CertificateArgs),
    /// Show full evaluation details.
    Details(CertificateArgs),
    /// Print the preview URL.
    Preview(CertificateArgs),
    /// Download the original certificate file.
    Download(DownloadCommand),
    /// Send a certificate to a reviewer.
    Approve(ApproveCommand),
    /// Appeal a decision.
    Appeal(AppealCommand),
    /// Attach student feedback.
    Feedback(FeedbackCommand),
    /// Record a reviewer verdict.
    Review(ReviewCommand),
    /// Delete an application.
    Delete(CertificateArgs),
}

/// Certificate id argument.
#[derive(Args, Debug)]
struct CertificateArgs {
    /// Certificate id.
    id: String,
}

/// Arguments for file downloads.
#[derive(Args, Debug)]
struct DownloadCommand {
    /// Certificate or processing id.
    id: String,
    /// Output path (defaults to the server-suggested file name).
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Overwrite an existing output file.
    #[arg(long, action = ArgAction::SetTrue)]
    force: bool,
}

/// Arguments for `certificate approve`.
#[derive(Args, Debug)]
struct ApproveCommand {
    /// Certificate id.
    id: String,
    /// Reviewer to send the certificate to.
    #[arg(long, value_name = "ID")]
    reviewer_id: String,
}

/// Arguments for `certificate appeal`.
#[derive(Args, Debug)]
struct AppealCommand {
    /// Certificate id.
    id: String,
    /// Reason for the appeal.
    #[arg(long, value_name = "TEXT")]
    reason: String,
    /// Reviewer to route the appeal to.
    #[arg(long, value_name = "ID")]
    reviewer_id: Option<String>,
}

/// Arguments for `certificate feedback`.
#[derive(Args, Debug)]
struct FeedbackCommand {
    /// Certificate id.
    id: String,
    /// Feedback text.
    #[arg(long, value_name = "TEXT")]
    message: String,
    /// Reviewer to notify.
    #[arg(long, value_name = "ID")]
    reviewer_id: Option<String>,
}

/// Arguments for `certificate review`.
#[derive(Args, Debug)]
struct ReviewCommand {
    /// Certificate id.
    id: String,
    /// Verdict: pass or fail.
    #[arg(long, value_name = "DECISION")]
    decision: ReviewDecision,
    /// Reviewer comment.
    #[arg(long, value_name = "TEXT")]
    comment: String,
}

/// Reviewer subcommands.
#[derive(Subcommand, Debug)]
enum ReviewerCommand {
    /// Look up a reviewer by email.
    Lookup {
        /// Reviewer email address.
        email: String,
    },
    /// List certificates assigned to a reviewer.
    Certificates {
        /// Reviewer id (defaults to the signed-in reviewer).
        #[arg(long, value_name = "ID")]
        reviewer_id: Option<String>,
    },
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        Self::new(err.to_string())
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("workcert {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config = PortalConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let portal = Portal::connect(&config, cli.json, cli.quiet)?;

    match command {
        Commands::Health => command_health(&portal).await,
        Commands::Degrees => command_degrees(&portal).await,
        Commands::Reviewers => command_reviewers(&portal).await,
        Commands::Login {
            command,
        } => command_login(&portal, command).await,
        Commands::Logout => command_logout(&portal),
        Commands::Whoami => command_whoami(&portal),
        Commands::Student {
            command,
        } => command_student(&portal, command).await,
        Commands::Upload(command) => command_upload(&portal, command).await,
        Commands::Process(command) => command_process(&portal, command).await,
        Commands::Certificate {
            command,
        } => command_certificate(&portal, command).await,
        Commands::Report(command) => command_report(&portal, &command).await,
        Commands::Reviewer {
            command,
        } => command_reviewer(&portal, command).await,
    }?;
    Ok(ExitCode::SUCCESS)
}

/// Renders the CLI help text.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Composition
// ============================================================================

/// Everything a command needs, wired once per invocation.
struct Portal {
    /// API client publishing into the run's tracker.
    client: PortalClient,
    /// Persisted identities.
    session: SessionStore,
    /// Emit JSON instead of text.
    json: bool,
    /// Progress observer kept alive for the run.
    _progress: Option<LoadingObserver>,
}

impl Portal {
    /// Builds the tracker, observer, request log, and client for `config`.
    fn connect(config: &PortalConfig, json: bool, quiet: bool) -> CliResult<Self> {
        let tracker = RequestTracker::new();
        let progress = (!quiet).then(|| {
            let renderer = ProgressRenderer::new(std::io::stderr());
            LoadingObserver::with_listener(&tracker, move |state| renderer.render(state))
        });
        let log = build_request_log(&config.logging)?;
        let client = PortalClient::new(&config.api, tracker)?.with_request_log(log);
        Ok(Self {
            client,
            session: SessionStore::new(&config.session.path),
            json,
            _progress: progress,
        })
    }

    /// Prints `value` as JSON, or `lines` as text.
    fn emit<T: Serialize>(&self, value: &T, lines: &[String]) -> CliResult<()> {
        if self.json {
            return write_json(value);
        }
        for line in lines {
            write_stdout_line(line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        Ok(())
    }

    /// Returns the explicit student email or the signed-in one.
    fn student_email(&self, explicit: Option<String>) -> CliResult<String> {
        let stored = self.session.load()?.student_email;
        resolve_identity(explicit, stored, "student email", "workcert login student <email>")
    }
}

/// Builds the request log selected by `logging`.
fn build_request_log(logging: &LoggingConfig) -> CliResult<Arc<dyn RequestLog>> {
    match logging.request_log {
        RequestLogTarget::None => Ok(Arc::new(NoopRequestLog)),
        RequestLogTarget::Stderr => Ok(Arc::new(JsonLineRequestLog::new(std::io::stderr()))),
        RequestLogTarget::File => {
            let path = logging.request_log_path.as_deref().unwrap_or_default();
            let file = OpenOptions::new().create(true).append(true).open(path).map_err(|err| {
                CliError::new(format!("failed to open request log {path}: {err}"))
            })?;
            Ok(Arc::new(JsonLineRequestLog::new(file)))
        }
    }
}

/// Picks an explicit identity over a stored one.
fn resolve_identity(
    explicit: Option<String>,
    stored: Option<String>,
    what: &str,
    hint: &str,
) -> CliResult<String> {
    explicit
        .filter(|value| !value.trim().is_empty())
        .or(stored)
        .ok_or_else(|| CliError::new(format!("no {what} given and none stored; run `{hint}`")))
}

// ============================================================================
// SECTION: General Commands
// ============================================================================

/// Executes `health`.
async fn command_health(portal: &Portal) -> CliResult<()> {
    let health = portal.client.check_health().await?;
    let status = health.status.as_deref().unwrap_or("unknown");
    portal.emit(&health, &[format!("API status: {status}")])
}

/// Executes `degrees`.
async fn command_degrees(portal: &Portal) -> CliResult<()> {
    let degrees = portal.client.get_degree_programs().await?;
    portal.emit(&degrees, &degrees)
}

/// Executes `reviewers`.
async fn command_reviewers(portal: &Portal) -> CliResult<()> {
    let reviewers = portal.client.get_reviewers().await?;
    let lines: Vec<String> = reviewers.iter().map(reviewer_line).collect();
    portal.emit(&reviewers, &lines)
}

// ============================================================================
// SECTION: Session Commands
// ============================================================================

/// Executes `login`.
async fn command_login(portal: &Portal, command: LoginCommand) -> CliResult<()> {
    match command {
        LoginCommand::Student {
            email,
        } => {
            let student = portal.client.verify_student(&email).await?;
            let session = portal.session.update(|session| {
                session.student_email = Some(student.email.clone());
            })?;
            portal.emit(&session, &[format!("Signed in as student {}", student.email)])
        }
        LoginCommand::Reviewer {
            email,
        } => {
            let reviewer = portal.client.get_reviewer_by_email(&email).await?;
            let session = portal.session.update(|session| {
                session.reviewer_email = Some(email.clone());
                session.reviewer_id = Some(reviewer.reviewer_id.clone());
            })?;
            portal.emit(
                &session,
                &[format!("Signed in as reviewer {} ({})", reviewer.display_name(), email)],
            )
        }
    }
}

/// Executes `logout`.
fn command_logout(portal: &Portal) -> CliResult<()> {
    portal.session.clear()?;
    portal.emit(&Session::default(), &["Signed out".to_string()])
}

/// Executes `whoami`.
fn command_whoami(portal: &Portal) -> CliResult<()> {
    let session = portal.session.load()?;
    portal.emit(&session, &session_lines(&session))
}

/// Text rendering of the stored identities.
fn session_lines(session: &Session) -> Vec<String> {
    if session.is_empty() {
        return vec!["Not signed in".to_string()];
    }
    let mut lines = Vec::new();
    if let Some(email) = &session.student_email {
        lines.push(format!("student: {email}"));
    }
    if let Some(email) = &session.reviewer_email {
        lines.push(format!("reviewer: {email}"));
    }
    if let Some(id) = &session.reviewer_id {
        lines.push(format!("reviewer id: {id}"));
    }
    lines
}

// ============================================================================
// SECTION: Student Commands
// ============================================================================

/// Dispatches student subcommands.
async fn command_student(portal: &Portal, command: StudentCommand) -> CliResult<()> {
    match command {
        StudentCommand::Lookup(args) => {
            let email = portal.student_email(args.email)?;
            let student = portal.client.verify_student(&email).await?;
            let name = full_name(student.first_name.as_deref(), student.last_name.as_deref());
            let mut lines = vec![format!("{} {} <{}>", student.student_id, name, student.email)];
            if let Some(degree) = &student.degree {
                lines.push(format!("degree: {degree}"));
            }
            portal.emit(&student, &lines)
        }
        StudentCommand::Applications(args) => {
            let email = portal.student_email(args.email)?;
            let applications = portal.client.get_student_applications(&email).await?;
            let lines = application_lines(&applications);
            portal.emit(&applications, &lines)
        }
    }
}

/// Executes `upload`.
async fn command_upload(portal: &Portal, command: UploadCommand) -> CliResult<()> {
    let student_id = match command.student_id {
        Some(id) => id,
        None => {
            let email = portal.student_email(None)?;
            portal.client.verify_student(&email).await?.student_id
        }
    };
    let file = read_upload(&command.file)?;
    let additional_documents = if command.work_type == WorkType::SelfPaced {
        command.additional_documents.iter().map(|path| read_upload(path)).collect::<CliResult<_>>()?
    } else {
        Vec::new()
    };
    let size = format_megabytes(file.size());
    let receipt = portal
        .client
        .upload_certificate(
            &student_id,
            CertificateUpload {
                file,
                training_type: command.training_type,
                work_type: command.work_type,
                additional_documents,
            },
        )
        .await?;
    let mut lines = vec![format!("Uploaded certificate {} ({size})", receipt.certificate_id)];
    lines.extend(receipt.message.clone());
    portal.emit(&receipt, &lines)
}

/// Executes `process`.
async fn command_process(portal: &Portal, command: ProcessCommand) -> CliResult<()> {
    let student_email = portal.student_email(command.email)?;
    let file = read_upload(&command.file)?;
    let result = portal
        .client
        .process_document(DocumentSubmission {
            file,
            student_degree: command.degree,
            student_email,
            training_type: command.training_type,
        })
        .await?;
    write_json(&result)
}

// ============================================================================
// SECTION: Certificate Commands
// ============================================================================

/// Dispatches certificate subcommands.
async fn command_certificate(portal: &Portal, command: CertificateCommand) -> CliResult<()> {
    match command {
        CertificateCommand::Evaluate(args) => {
            let outcome = portal.client.process_certificate(&args.id).await?;
            if portal.json {
                return write_json(&outcome);
            }
            if let Some(message) = &outcome.message {
                write_stdout_line(message)
                    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            }
            write_json(&outcome.payload)
        }
        CertificateCommand::Details(args) => {
            let details = portal.client.get_certificate_details(&args.id).await?;
            write_json(&details)
        }
        CertificateCommand::Preview(args) => {
            let url = portal.client.preview_certificate(&args.id)?;
            portal.emit(&json!({ "url": url.as_str() }), &[url.to_string()])
        }
        CertificateCommand::Download(command) => {
            let file = portal.client.download_certificate(&command.id).await?;
            let fallback = format!("certificate-{}", command.id);
            save_download(portal, &command, file, &fallback)
        }
        CertificateCommand::Approve(command) => {
            let ack = portal.client.send_for_approval(&command.id, &command.reviewer_id).await?;
            let fallback = format!("Sent {} to reviewer {}", command.id, command.reviewer_id);
            portal.emit(&ack, &[ack.message.clone().unwrap_or(fallback)])
        }
        CertificateCommand::Appeal(command) => {
            let ack = portal
                .client
                .submit_appeal(&command.id, &command.reason, command.reviewer_id.as_deref())
                .await?;
            let fallback = format!("Appeal submitted for {}", command.id);
            portal.emit(&ack, &[ack.message.clone().unwrap_or(fallback)])
        }
        CertificateCommand::Feedback(command) => {
            let ack = portal
                .client
                .add_feedback(&command.id, &command.message, command.reviewer_id.as_deref())
                .await?;
            let fallback = format!("Feedback added to {}", command.id);
            portal.emit(&ack, &[ack.message.clone().unwrap_or(fallback)])
        }
        CertificateCommand::Review(command) => {
            let review = ReviewSubmission {
                reviewer_comment: command.comment,
                reviewer_decision: command.decision,
            };
            let ack = portal.client.submit_review(&command.id, &review).await?;
            let fallback = format!("Recorded {} for {}", review.reviewer_decision, command.id);
            portal.emit(&ack, &[ack.message.clone().unwrap_or(fallback)])
        }
        CertificateCommand::Delete(args) => {
            portal.client.delete_application(&args.id).await?;
            portal.emit(
                &json!({ "deleted": args.id }),
                &[format!("Deleted application {}", args.id)],
            )
        }
    }
}

/// Executes `report`.
async fn command_report(portal: &Portal, command: &DownloadCommand) -> CliResult<()> {
    let file = portal.client.download_report(&command.id).await?;
    let fallback = format!("report-{}", command.id);
    save_download(portal, command, file, &fallback)
}

/// Writes a downloaded file and reports where it went.
fn save_download(
    portal: &Portal,
    command: &DownloadCommand,
    file: DownloadedFile,
    fallback: &str,
) -> CliResult<()> {
    let path = download_path(command.output.clone(), file.file_name.as_deref(), fallback);
    write_download(&path, &file.bytes, command.force)?;
    let summary = json!({
        "path": path.display().to_string(),
        "bytes": file.bytes.len(),
        "content_type": file.content_type,
    });
    portal.emit(
        &summary,
        &[format!("Saved {} bytes to {}", file.bytes.len(), path.display())],
    )
}

// ============================================================================
// SECTION: Reviewer Commands
// ============================================================================

/// Dispatches reviewer subcommands.
async fn command_reviewer(portal: &Portal, command: ReviewerCommand) -> CliResult<()> {
    match command {
        ReviewerCommand::Lookup {
            email,
        } => {
            let reviewer = portal.client.get_reviewer_by_email(&email).await?;
            portal.emit(&reviewer, &[reviewer_line(&reviewer)])
        }
        ReviewerCommand::Certificates {
            reviewer_id,
        } => {
            let stored = portal.session.load()?.reviewer_id;
            let reviewer_id = resolve_identity(
                reviewer_id,
                stored,
                "reviewer id",
                "workcert login reviewer <email>",
            )?;
            let applications = portal.client.get_reviewer_certificates(&reviewer_id).await?;
            let lines = application_lines(&applications);
            portal.emit(&applications, &lines)
        }
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Joins optional name parts.
fn full_name(first: Option<&str>, last: Option<&str>) -> String {
    [first, last].into_iter().flatten().collect::<Vec<_>>().join(" ")
}

/// One line per reviewer.
fn reviewer_line(reviewer: &Reviewer) -> String {
    match &reviewer.email {
        Some(email) => format!("{}  {}  <{email}>", reviewer.reviewer_id, reviewer.display_name()),
        None => format!("{}  {}", reviewer.reviewer_id, reviewer.display_name()),
    }
}

/// One line per application; empty lists say so.
fn application_lines(applications: &[Application]) -> Vec<String> {
    if applications.is_empty() {
        return vec!["No applications".to_string()];
    }
    applications
        .iter()
        .map(|application| {
            let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
            format!(
                "{}  {}  {}  {}",
                application.certificate_id,
                field(&application.status),
                field(&application.decision),
                field(&application.filename),
            )
        })
        .collect()
}

// ============================================================================
// SECTION: File Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug, Error)]
enum ReadLimitError {
    /// File I/O failure.
    #[error("{0}")]
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    #[error("file is {size} bytes; the limit is {limit} bytes")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Loads an upload, naming it after the file's last path component.
fn read_upload(path: &Path) -> CliResult<FileUpload> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::new(format!("{} is not a file path", path.display())))?;
    let bytes = read_bytes_with_limit(path, MAX_UPLOAD_BYTES)
        .map_err(|err| CliError::new(format!("failed to read {}: {err}", path.display())))?;
    Ok(FileUpload::new(file_name, bytes))
}

/// Chooses where a download is written.
///
/// Server-suggested names are reduced to their final component so a hostile
/// `Content-Disposition` cannot escape the working directory.
fn download_path(explicit: Option<PathBuf>, suggested: Option<&str>, fallback: &str) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    suggested
        .and_then(|name| Path::new(name).file_name())
        .map_or_else(|| PathBuf::from(fallback), PathBuf::from)
}

/// Writes download bytes, refusing to clobber unless `force` is set.
fn write_download(path: &Path, bytes: &[u8], force: bool) -> CliResult<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let mut file = options
        .open(path)
        .map_err(|err| CliError::new(format!("failed to write {}: {err}", path.display())))?;
    file.write_all(bytes)
        .map_err(|err| CliError::new(format!("failed to write {}: {err}", path.display())))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes pretty JSON to stdout.
fn write_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to render JSON: {err}")))?;
    write_stdout_line(&text).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output failure message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
