//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and a distinct exit code per failure class.

use miette::Diagnostic;
use thiserror::Error;

use moorfleet_config::ConfigError;
use moorfleet_core::{AlarmAction, AlarmId, AlarmStatus, CoreError};

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

    #[error("Could not reach the backend: {reason}")]
    #[diagnostic(
        code(moorfleet::connection_failed),
        help(
            "Check that the backend is running and the profile URL is right.\n\
             Self-signed certificates need --insecure (-k) or ca_cert in the profile."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(moorfleet::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(moorfleet::not_found),
        help("Run: moorfleet {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Alarm lifecycle ──────────────────────────────────────────────

    #[error("Backend rejected the change: {message}")]
    #[diagnostic(
        code(moorfleet::rejected),
        help("The alarm may have changed elsewhere. Run: moorfleet alarms list")
    )]
    Rejected { message: String },

    #[error("Cannot {action} alarm {id}: it is {status}")]
    #[diagnostic(
        code(moorfleet::invalid_transition),
        help("Alarms move created -> acknowledged -> cleared; a clear needs an acknowledge first.")
    )]
    InvalidTransition {
        id: AlarmId,
        action: AlarmAction,
        status: AlarmStatus,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(moorfleet::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(moorfleet::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: moorfleet config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(moorfleet::no_config),
        help(
            "Create a profile with: moorfleet config init\n\
             Or pass --backend / set MOORFLEET_BACKEND.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Could not load configuration: {message}")]
    #[diagnostic(code(moorfleet::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(moorfleet::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal / IO / Serialization ────────────────────────────────

    #[error("Unexpected backend response: {message}")]
    #[diagnostic(code(moorfleet::internal))]
    Internal { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } | Self::InvalidTransition { .. } => exit_code::REJECTED,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Network {
                message,
                status: Some(status),
            } => CliError::ConnectionFailed {
                reason: format!("HTTP {status}: {message}"),
            },

            CoreError::Network {
                message,
                status: None,
            } => CliError::ConnectionFailed { reason: message },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NotFound { identifier } => not_found_for_path(identifier),

            CoreError::InvalidRange(e) => CliError::Validation {
                field: "range".into(),
                reason: e.to_string(),
            },

            CoreError::TransitionRejected { message } => CliError::Rejected { message },

            CoreError::InvalidTransition { id, action, status } => {
                CliError::InvalidTransition { id, action, status }
            }

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Internal(message) => CliError::Internal { message },
        }
    }
}

/// Name the missing resource from what the core reported: either a
/// backend path (`/api/units/7`) or a local lookup (`alarm 42`).
fn not_found_for_path(identifier: String) -> CliError {
    if let Some(id) = identifier.strip_prefix("alarm ") {
        return CliError::NotFound {
            resource_type: "alarm".into(),
            identifier: id.to_owned(),
            list_command: "alarms list".into(),
        };
    }

    let segments: Vec<&str> = identifier
        .split('/')
        .filter(|s| !s.is_empty() && *s != "api")
        .collect();

    let (resource_type, list_command) = match segments.first().copied() {
        Some("alarms") => ("alarm", "alarms list"),
        Some("kpis") => ("KPI", "kpis"),
        _ => ("unit", "units list"),
    };

    let identifier = match segments.as_slice() {
        [_, id, ..] => (*id).to_owned(),
        _ => identifier,
    };

    CliError::NotFound {
        resource_type: resource_type.into(),
        identifier,
        list_command: list_command.into(),
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
