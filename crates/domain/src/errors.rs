//! Error types used throughout the client
//!
//! Every workflow call resolves to exactly one of these outcomes. Nothing is
//! swallowed or retried inside the core; callers pick the retry policy from
//! [`VocalisError::category`].

use std::time::Duration;

use thiserror::Error;

/// Coarse classification used by callers to decide on retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Credential renewal failed
    Authentication,
    /// Caller-supplied payload was rejected before any network call
    Validation,
    /// The server answered with an unexpected status
    Remote,
    /// The server could not be reached or answered garbage
    Transport,
    /// The remote job itself reported failure
    JobFailed,
    /// The convergence budget ran out
    Timeout,
    /// Local misconfiguration or misuse of the API
    Client,
}

/// Main error type for Vocalis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VocalisError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Remote error: status {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Job reported terminal status '{status}'")]
    TerminalFailure { status: String, body: serde_json::Value },

    #[error("Timed out after {elapsed:?} waiting on job (last status: '{last_status}')")]
    TimedOut { last_status: String, elapsed: Duration },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Workflow step out of order: {0}")]
    InvalidState(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl VocalisError {
    /// Build a [`VocalisError::Remote`] from a status and raw body
    pub fn remote(status: u16, body: impl Into<String>) -> Self {
        Self::Remote { status, body: body.into() }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Auth(_) => ErrorCategory::Authentication,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Remote { .. } => ErrorCategory::Remote,
            Self::Transport(_) => ErrorCategory::Transport,
            Self::TerminalFailure { .. } => ErrorCategory::JobFailed,
            Self::TimedOut { .. } => ErrorCategory::Timeout,
            Self::Config(_) | Self::InvalidState(_) | Self::Cancelled => ErrorCategory::Client,
        }
    }

    /// Hint for callers: transport failures are usually transient, and a
    /// timed-out job may still complete if polled again.
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Transport | ErrorCategory::Timeout)
    }

    /// HTTP status carried by a remote error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for Vocalis operations
pub type Result<T> = std::result::Result<T, VocalisError>;
