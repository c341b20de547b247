//! Multi-step remote workflows
//!
//! Enrollment and verification share one protocol (create, fetch
//! instructions, submit, converge) implemented once in [`session`]. Endpoint
//! analysis starts a task and converges on it.

pub mod analysis;
pub mod orchestrator;
pub mod session;

pub use analysis::AnalysisWorkflow;
pub use orchestrator::WorkflowOrchestrator;
pub use session::{EnrollmentWorkflow, VerificationWorkflow, Workflow, WorkflowResource};
