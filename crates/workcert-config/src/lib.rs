// crates/workcert-config/src/lib.rs
// ============================================================================
// Module: Work Certificate Config Library
// Description: Canonical configuration model for the portal client.
// Purpose: Load and validate API, session, and logging settings.
// Dependencies: serde, toml, url, workcert-tracker
// ============================================================================

//! ## Overview
//! `workcert-config` owns the TOML configuration consumed by the portal
//! client and its command-line front end. Loading is fail-closed: anything
//! that does not validate is rejected before a client is built.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ApiConfig;
pub use config::BASE_URL_ENV_VAR;
pub use config::CONFIG_ENV_VAR;
pub use config::ConfigError;
pub use config::DEFAULT_CONFIG_NAME;
pub use config::DEFAULT_TIMEOUT_MS;
pub use config::LoggingConfig;
pub use config::PortalConfig;
pub use config::RequestLogTarget;
pub use config::SessionConfig;
