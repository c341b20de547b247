//! Lifecycle of a single enrollment or verification

use std::fmt;

/// Where a workflow stands.
///
/// `Completed`, `Failed` and `TimedOut` are final; a workflow in one of
/// them accepts no further steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Uninitialized,
    Created,
    InstructionsFetched,
    Submitted,
    Completed,
    Failed,
    TimedOut,
}

impl WorkflowState {
    /// Whether no further step can run
    pub fn is_final(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::TimedOut)
    }

    /// Whether a step may move the workflow from `self` to `next`.
    ///
    /// Any non-final state may fall to `Failed`, and instructions may be
    /// fetched more than once.
    pub fn can_transition_to(self, next: Self) -> bool {
        use WorkflowState::*;

        if self.is_final() {
            return false;
        }
        matches!(
            (self, next),
            (Uninitialized, Created)
                | (Created, InstructionsFetched)
                | (InstructionsFetched, InstructionsFetched)
                | (InstructionsFetched, Submitted)
                | (Submitted, Completed)
                | (Submitted, TimedOut)
                | (_, Failed)
        )
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Created => "created",
            Self::InstructionsFetched => "instructions-fetched",
            Self::Submitted => "submitted",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed-out",
        };
        f.write_str(name)
    }
}
