// crates/workcert-config/src/config.rs
// ============================================================================
// Module: Work Certificate Portal Configuration
// Description: Configuration loading and validation for the portal client.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml, url, workcert-tracker
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicitly requested file must exist; the default file name is optional
//! and falls back to built-in defaults. The API base URL can be overridden by
//! environment before validation runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;
use workcert_tracker::RequestKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "workcert.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "WORKCERT_CONFIG";
/// Environment variable used to override the API base URL.
pub const BASE_URL_ENV_VAR: &str = "WORKCERT_API_BASE_URL";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default API base URL.
const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Default per-request deadline in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Largest accepted per-request deadline in milliseconds.
const MAX_TIMEOUT_MS: u64 = 600_000;
/// Default response body limit in bytes.
const DEFAULT_MAX_RESPONSE_BYTES: usize = 25 * 1024 * 1024;
/// Default user agent for outbound requests.
const DEFAULT_USER_AGENT: &str = "workcert/0.1";
/// Default session file location.
const DEFAULT_SESSION_PATH: &str = ".workcert-session.json";

// ============================================================================
// SECTION: Top-Level Config
// ============================================================================

/// Portal client configuration.
///
/// # Invariants
/// - [`PortalConfig::validate`] has succeeded for values returned by
///   [`PortalConfig::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortalConfig {
    /// Remote API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Persisted identity settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Request log settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PortalConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// The path comes from `path`, then [`CONFIG_ENV_VAR`], then
    /// [`DEFAULT_CONFIG_NAME`]. Only the default file may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        let mut config = if !explicit && !resolved.exists() {
            Self::default()
        } else {
            Self::from_file(&resolved)?
        };
        config.apply_overrides(env::var(BASE_URL_ENV_VAR).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML file without applying overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies environment-style overrides.
    pub fn apply_overrides(&mut self, base_url: Option<String>) {
        if let Some(base_url) = base_url.filter(|value| !value.trim().is_empty()) {
            self.api.base_url = base_url.trim().to_string();
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        self.session.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: API Config
// ============================================================================

/// Remote API connection settings.
///
/// # Invariants
/// - `base_url` is an absolute `http` or `https` URL without query or
///   fragment.
/// - Every timeout lies in `1 ..= 600_000` milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Default per-request deadline in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Per-operation deadline overrides in milliseconds.
    #[serde(default)]
    pub operation_timeouts_ms: BTreeMap<RequestKind, u64>,
    /// User agent string for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum accepted response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            operation_timeouts_ms: BTreeMap::new(),
            user_agent: default_user_agent(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl ApiConfig {
    /// Returns the parsed base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the base URL is not a valid API root.
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|err| ConfigError::Invalid(format!("api.base_url is invalid: {err}")))?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::Invalid(format!(
                    "api.base_url scheme must be http or https, got {other}"
                )));
            }
        }
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(ConfigError::Invalid("api.base_url must include a host".to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ConfigError::Invalid(
                "api.base_url must not include a query or fragment".to_string(),
            ));
        }
        Ok(url)
    }

    /// Returns the deadline for `kind`, honoring overrides.
    #[must_use]
    pub fn timeout_for(&self, kind: RequestKind) -> Duration {
        let millis = self.operation_timeouts_ms.get(&kind).copied().unwrap_or(self.timeout_ms);
        Duration::from_millis(millis)
    }

    /// Validates the API settings.
    fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_base_url()?;
        validate_timeout("api.timeout_ms", self.timeout_ms)?;
        for (kind, millis) in &self.operation_timeouts_ms {
            validate_timeout(&format!("api.operation_timeouts_ms.{kind}"), *millis)?;
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("api.user_agent must be non-empty".to_string()));
        }
        if self.max_response_bytes == 0 {
            return Err(ConfigError::Invalid(
                "api.max_response_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Session Config
// ============================================================================

/// Persisted identity settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Session file path.
    #[serde(default = "default_session_path")]
    pub path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

impl SessionConfig {
    /// Validates the session settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("session.path", &self.path)
    }
}

// ============================================================================
// SECTION: Logging Config
// ============================================================================

/// Destination for structured request log records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestLogTarget {
    /// Discard request records.
    #[default]
    None,
    /// Write JSON lines to stderr.
    Stderr,
    /// Append JSON lines to `request_log_path`.
    File,
}

/// Request log settings.
///
/// # Invariants
/// - `request_log_path` is set when `request_log` is [`RequestLogTarget::File`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log destination.
    #[serde(default)]
    pub request_log: RequestLogTarget,
    /// Log file path for the file destination.
    #[serde(default)]
    pub request_log_path: Option<String>,
}

impl LoggingConfig {
    /// Validates the logging settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.request_log, self.request_log_path.as_deref()) {
            (RequestLogTarget::File, None) => Err(ConfigError::Invalid(
                "logging.request_log_path is required for file logging".to_string(),
            )),
            (RequestLogTarget::File, Some(path)) => {
                validate_path_string("logging.request_log_path", path)
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default base URL.
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Default timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Default user agent.
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Default response limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Default session path.
fn default_session_path() -> String {
    DEFAULT_SESSION_PATH.to_string()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path and reports whether it was explicitly requested.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a timeout value in milliseconds.
fn validate_timeout(field: &str, millis: u64) -> Result<(), ConfigError> {
    if millis == 0 || millis > MAX_TIMEOUT_MS {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between 1 and {MAX_TIMEOUT_MS} milliseconds"
        )));
    }
    Ok(())
}
