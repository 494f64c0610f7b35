// ── Core error types ──
//
// User-facing errors from debot-core. Consumers never match on reqwest
// errors or JSON parse failures directly; the `From<debot_api::Error>` impl
// translates transport-layer errors into dashboard-level variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach gateway: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Gateway request timed out")]
    Timeout,

    // ── Config document errors ───────────────────────────────────────
    #[error("Configuration has not been loaded from the gateway")]
    ConfigNotLoaded,

    #[error("Unknown config section: {section}")]
    SectionNotFound { section: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Gateway errors ───────────────────────────────────────────────
    /// The gateway refused a request. `message` is its own error text.
    #[error("Gateway rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Text shown to the user in a toast.
    ///
    /// Gateway rejections show the gateway's body verbatim; everything else
    /// shows its display form.
    pub fn toast_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status code, if the error came from a gateway response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<debot_api::Error> for CoreError {
    fn from(err: debot_api::Error) -> Self {
        match err {
            debot_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            debot_api::Error::InvalidUrl(reason) => CoreError::ConnectionFailed {
                reason: format!("invalid URL: {reason}"),
            },
            debot_api::Error::Tls(reason) => CoreError::ConnectionFailed {
                reason: format!("TLS: {reason}"),
            },
            debot_api::Error::Api { status, message } => CoreError::Rejected { status, message },
            debot_api::Error::Deserialization { message, .. } => CoreError::Api {
                message: format!("unexpected response from gateway: {message}"),
                status: None,
            },
        }
    }
}
