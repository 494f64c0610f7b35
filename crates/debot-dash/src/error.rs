//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use debot_config::ConfigError;
use debot_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the gateway")]
    #[diagnostic(
        code(debot::connection_failed),
        help(
            "Check that the gateway is running and reachable.\n\
             Reason: {reason}\n\
             Try: debot-dash --gateway http://127.0.0.1:8000 status"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Gateway request timed out")]
    #[diagnostic(
        code(debot::timeout),
        help("Increase the timeout with --timeout or check gateway responsiveness.")
    )]
    Timeout,

    // ── Gateway responses ────────────────────────────────────────────
    #[error("Gateway rejected the request (HTTP {status}): {message}")]
    #[diagnostic(code(debot::rejected))]
    Rejected { status: u16, message: String },

    #[error("API error: {message}")]
    #[diagnostic(code(debot::api_error))]
    ApiError { message: String },

    // ── Config document ──────────────────────────────────────────────
    #[error("Config section '{section}' not found")]
    #[diagnostic(
        code(debot::section_not_found),
        help("Run: debot-dash config show  to see available sections")
    )]
    SectionNotFound { section: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(debot::validation))]
    Validation { field: String, reason: String },

    // ── Local configuration ──────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(debot::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Add one under [profiles.{name}] in the config file (debot-dash profiles path)."
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Failed to load configuration: {message}")]
    #[diagnostic(code(debot::config))]
    Config { message: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(debot::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(debot::json), help("Check the JSON contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(debot::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::SectionNotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },

            CoreError::Timeout => CliError::Timeout,

            CoreError::ConfigNotLoaded => CliError::ApiError {
                message: "configuration has not been loaded from the gateway".into(),
            },

            CoreError::SectionNotFound { section } => CliError::SectionNotFound { section },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Rejected { status, message } => CliError::Rejected { status, message },

            CoreError::Api { message, status: _ } => CliError::ApiError { message },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name, available } => CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
