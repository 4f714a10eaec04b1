// ── Core error types ──
//
// User-facing errors from moorfleet-core. Views and the CLI never see raw
// HTTP status codes or JSON decode failures; the `From<moorfleet_api::Error>`
// impl folds transport-layer errors into this taxonomy.

use thiserror::Error;

use crate::model::{AlarmAction, AlarmId, AlarmStatus, InvalidRange};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    /// Transport failure, timeout, or non-success status from the backend.
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// HTTP status code (if one was received).
        status: Option<u16>,
    },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {identifier}")]
    NotFound { identifier: String },

    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),

    // ── Alarm lifecycle errors ───────────────────────────────────────
    /// The backend declined an acknowledge or clear.
    #[error("Backend rejected the change: {message}")]
    TransitionRejected { message: String },

    /// The local lifecycle forbids the action; no request was sent.
    #[error("Cannot {action} alarm {id}: it is {status}")]
    InvalidTransition {
        id: AlarmId,
        action: AlarmAction,
        status: AlarmStatus,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the next scheduled refresh may succeed where this one failed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { status, .. } => status.is_none_or(|s| s >= 500),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<moorfleet_api::Error> for CoreError {
    fn from(err: moorfleet_api::Error) -> Self {
        match err {
            moorfleet_api::Error::NotFound { path } => CoreError::NotFound { identifier: path },
            moorfleet_api::Error::Rejected { message } => {
                CoreError::TransitionRejected { message }
            }
            moorfleet_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            moorfleet_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            moorfleet_api::Error::Transport(ref e) => {
                let status = e.status().map(|s| s.as_u16());
                if status == Some(404) {
                    CoreError::NotFound {
                        identifier: e.url().map(|u| u.path().to_string()).unwrap_or_default(),
                    }
                } else {
                    CoreError::Network {
                        message: err.to_string(),
                        status,
                    }
                }
            }
            moorfleet_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            moorfleet_api::Error::Tls(msg) => CoreError::Network {
                message: format!("TLS error: {msg}"),
                status: None,
            },
            moorfleet_api::Error::Http { status, message } => CoreError::Network {
                message,
                status: Some(status),
            },
        }
    }
}
