//! Core domain types

pub mod interval;
pub mod polling;
pub mod resources;
pub mod status;
pub mod token;
pub mod workflow;

pub use interval::{Interval, TimeSpan};
pub use polling::{PollBudget, TerminalStates};
pub use resources::{
    resource_id_from_href, AnalysisRequest, AnalysisTask, AppModel, AppModelUpdate, Consumer,
    ConsumerCredentials, ConsumerUpdate, Enrollment, Gender, NewAppModel, NewConsumer, Page,
    PageRequest, ResourceKind, ResourceLocator, Submission, Verification, WorkflowSubject,
};
pub use status::{AnalysisStatus, EnrollmentStatus, JobStatus, VerificationStatus};
pub use token::Token;
pub use workflow::WorkflowState;
