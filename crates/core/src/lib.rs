//! # Vocalis Core
//!
//! Business logic of the Vocalis client. No HTTP, no files.
//!
//! This crate contains:
//! - The [`RemoteOperations`] port the infrastructure layer implements
//! - [`TokenCache`]: per-scope bearer token with single-flight renewal
//! - [`JobPoller`]: bounded-timeout convergence on remote job status
//! - Enrollment, verification and analysis workflows
//! - CRUD services for the remote collections
//!
//! ## Architecture Principles
//! - Depends only on `vocalis-domain` and `vocalis-common`
//! - All I/O behind traits
//! - No retries: every failure reaches the caller as a typed error

pub mod auth;
pub mod labeling;
pub mod polling;
pub mod ports;
pub mod resources;
pub mod workflow;

pub use auth::{CredentialScope, TokenCache};
pub use labeling::{label_intervals, phrase_sequence};
pub use polling::{JobPoller, PollOutcome, StatusReport};
pub use ports::{RemoteOperations, RemoteResponse, RequestAuth, TokenRequest};
pub use resources::{Collection, ResourceService};
pub use workflow::analysis::intervals_with_phrases;
pub use workflow::{
    AnalysisWorkflow, EnrollmentWorkflow, VerificationWorkflow, Workflow, WorkflowOrchestrator,
    WorkflowResource,
};
