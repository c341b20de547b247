//! Polling budget and terminal-state sets

use std::time::Duration;

use crate::constants::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_POLL_MAX_DURATION_MS};
use crate::types::status::JobStatus;

/// Bounds on how long to wait for a remote job to converge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    /// Wall-clock ceiling, measured from the first fetch
    pub max_duration: Duration,
    /// Delay between fetches
    pub poll_interval: Duration,
}

impl PollBudget {
    /// Budget from a ceiling and an interval
    pub fn new(max_duration: Duration, poll_interval: Duration) -> Self {
        Self { max_duration, poll_interval }
    }

    /// Budget from millisecond values
    pub fn from_millis(max_duration_ms: u64, poll_interval_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(max_duration_ms),
            Duration::from_millis(poll_interval_ms),
        )
    }
}

impl Default for PollBudget {
    fn default() -> Self {
        Self::from_millis(DEFAULT_POLL_MAX_DURATION_MS, DEFAULT_POLL_INTERVAL_MS)
    }
}

/// Statuses that end a poll, split by outcome
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalStates<S> {
    pub success: Vec<S>,
    pub failure: Vec<S>,
}

impl<S: PartialEq> TerminalStates<S> {
    /// Explicit success and failure sets
    pub fn new(success: Vec<S>, failure: Vec<S>) -> Self {
        Self { success, failure }
    }

    /// Whether `status` ends the poll successfully
    pub fn is_success(&self, status: &S) -> bool {
        self.success.contains(status)
    }

    /// Whether `status` ends the poll as a failure
    pub fn is_failure(&self, status: &S) -> bool {
        self.failure.contains(status)
    }
}

impl<S: JobStatus> TerminalStates<S> {
    /// The default terminal sets declared by the status type
    pub fn for_status() -> Self {
        Self::new(S::success_states(), S::failure_states())
    }
}
