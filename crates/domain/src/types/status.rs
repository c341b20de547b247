//! Status vocabularies of the three remote job kinds

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::impl_job_status_conversions;

/// A status reported by a remote long-running job.
///
/// Implementors name their default terminal states; the poller treats every
/// other value as still in progress.
pub trait JobStatus:
    Clone + fmt::Debug + fmt::Display + PartialEq + Send + Sync + 'static
{
    /// States that end polling with success
    fn success_states() -> Vec<Self>;

    /// States that end polling with a terminal failure
    fn failure_states() -> Vec<Self>;
}

/// Enrollment job status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EnrollmentStatus {
    Created,
    InstructionsIssued,
    Completed,
    Failed,
    Other(String),
}

impl_job_status_conversions!(EnrollmentStatus {
    Created => "created" | "initialized",
    InstructionsIssued => "instructions-issued" | "instructions_issued",
    Completed => "completed",
    Failed => "failed",
});

impl JobStatus for EnrollmentStatus {
    fn success_states() -> Vec<Self> {
        vec![Self::Completed]
    }

    fn failure_states() -> Vec<Self> {
        vec![Self::Failed]
    }
}

/// Verification job status
///
/// `failed` is treated as terminal here as well, even though the service was
/// never observed to report it for verifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VerificationStatus {
    Created,
    InstructionsIssued,
    Completed,
    Failed,
    Other(String),
}

impl_job_status_conversions!(VerificationStatus {
    Created => "created" | "initialized",
    InstructionsIssued => "instructions-issued" | "instructions_issued",
    Completed => "completed",
    Failed => "failed",
});

impl JobStatus for VerificationStatus {
    fn success_states() -> Vec<Self> {
        vec![Self::Completed]
    }

    fn failure_states() -> Vec<Self> {
        vec![Self::Failed]
    }
}

/// Endpoint analysis task status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnalysisStatus {
    Started,
    Running,
    Completed,
    Failed,
    Other(String),
}

impl_job_status_conversions!(AnalysisStatus {
    Started => "started",
    Running => "running",
    Completed => "completed",
    Failed => "failed",
});

impl JobStatus for AnalysisStatus {
    fn success_states() -> Vec<Self> {
        vec![Self::Completed]
    }

    fn failure_states() -> Vec<Self> {
        vec![Self::Failed]
    }
}
