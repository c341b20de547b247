//! Enrollment and verification lifecycle
//!
//! A [`Workflow`] drives one remote resource through
//! `Uninitialized -> Created -> InstructionsFetched -> Submitted` and then to
//! one of `Completed`, `Failed` or `TimedOut`. Steps called out of order are
//! rejected with `InvalidState` before any network call. A step that fails
//! remotely moves the workflow to `Failed`, so nothing after it can run.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use vocalis_domain::constants::{ENROLLMENT_AUDIO_FIELD, VERIFICATION_AUDIO_FIELD};
use vocalis_domain::{
    Enrollment, PollBudget, ResourceKind, Result, Submission, TerminalStates, Validate,
    Verification, VocalisError, WorkflowState, WorkflowSubject,
};

use crate::auth::TokenCache;
use crate::polling::{JobPoller, PollOutcome, StatusReport};
use crate::ports::RemoteOperations;
use crate::resources::{locator_id, to_payload, STATUS_ACCEPTED, STATUS_CREATED, STATUS_OK};

/// A resource kind driven by the create/instructions/submit/converge protocol
pub trait WorkflowResource:
    StatusReport + DeserializeOwned + Serialize + Send + Sync + 'static
{
    const KIND: ResourceKind;
    /// Key holding the audio reference in the submission body
    const AUDIO_FIELD: &'static str;

    fn instructions(&self) -> Option<&Value>;
}

impl WorkflowResource for Enrollment {
    const KIND: ResourceKind = ResourceKind::Enrollment;
    const AUDIO_FIELD: &'static str = ENROLLMENT_AUDIO_FIELD;

    fn instructions(&self) -> Option<&Value> {
        self.instructions.as_ref()
    }
}

impl WorkflowResource for Verification {
    const KIND: ResourceKind = ResourceKind::Verification;
    const AUDIO_FIELD: &'static str = VERIFICATION_AUDIO_FIELD;

    fn instructions(&self) -> Option<&Value> {
        self.instructions.as_ref()
    }
}

/// Enrollment of one consumer against one app model
pub type EnrollmentWorkflow = Workflow<Enrollment>;
/// Verification of one consumer against one app model
pub type VerificationWorkflow = Workflow<Verification>;

/// One enrollment or verification instance
pub struct Workflow<R: WorkflowResource> {
    remote: Arc<dyn RemoteOperations>,
    tokens: Arc<TokenCache>,
    poller: JobPoller,
    terminal: TerminalStates<R::Status>,
    state: WorkflowState,
    resource_id: Option<String>,
}

impl<R: WorkflowResource> Workflow<R> {
    /// Fresh workflow in `Uninitialized`
    pub fn new(remote: Arc<dyn RemoteOperations>, tokens: Arc<TokenCache>, budget: PollBudget) -> Self {
        Self {
            remote,
            tokens,
            poller: JobPoller::new(budget),
            terminal: TerminalStates::for_status(),
            state: WorkflowState::Uninitialized,
            resource_id: None,
        }
    }

    /// Pick up an already submitted resource, e.g. to poll again after a
    /// timeout.
    pub fn resume(
        remote: Arc<dyn RemoteOperations>,
        tokens: Arc<TokenCache>,
        budget: PollBudget,
        resource_id: impl Into<String>,
    ) -> Self {
        let mut workflow = Self::new(remote, tokens, budget);
        workflow.state = WorkflowState::Submitted;
        workflow.resource_id = Some(resource_id.into());
        workflow
    }

    /// Override the statuses that end convergence
    #[must_use]
    pub fn with_terminal_states(mut self, terminal: TerminalStates<R::Status>) -> Self {
        self.terminal = terminal;
        self
    }

    /// Current workflow state
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Remote resource id, once created
    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    /// Step 1: create the resource for `subject` and capture its id
    #[instrument(skip_all, fields(kind = %R::KIND))]
    pub async fn create(&mut self, subject: &WorkflowSubject) -> Result<String> {
        self.ensure_can_enter(WorkflowState::Created)?;
        let payload = to_payload(subject)?;

        let result: Result<String> = async {
            let auth = self.tokens.request_auth().await?;
            let response = self.remote.create(R::KIND, &payload, &auth).await?;
            locator_id(response, STATUS_CREATED)
        }
        .await;

        let id = self.settle(result, WorkflowState::Created)?;
        info!(%id, "workflow resource created");
        self.resource_id = Some(id.clone());
        Ok(id)
    }

    /// Step 2: read the instructions the submission must follow
    #[instrument(skip_all, fields(kind = %R::KIND, id = ?self.resource_id))]
    pub async fn fetch_instructions(&mut self) -> Result<R> {
        self.ensure_can_enter(WorkflowState::InstructionsFetched)?;
        let id = self.require_id()?;

        let result = self.fetch_body(&id).await;
        let body = self.settle(result, WorkflowState::InstructionsFetched)?;
        if body.instructions().is_none() {
            warn!("resource carries no instructions");
        }
        Ok(body)
    }

    /// Step 3: upload the recorded audio reference and labeled intervals
    #[instrument(skip_all, fields(kind = %R::KIND, id = ?self.resource_id))]
    pub async fn submit(&mut self, submission: &Submission) -> Result<()> {
        self.ensure_can_enter(WorkflowState::Submitted)?;
        submission.validate()?;
        let id = self.require_id()?;
        let payload = submission.to_payload(R::AUDIO_FIELD);

        let result: Result<()> = async {
            let auth = self.tokens.request_auth().await?;
            let response = self.remote.update(R::KIND, &id, &payload, &auth).await?;
            response.expect_status(STATUS_ACCEPTED)?;
            Ok(())
        }
        .await;

        self.settle(result, WorkflowState::Submitted)?;
        debug!(intervals = submission.intervals.len(), "submission accepted");
        Ok(())
    }

    /// Step 4: poll until the resource completes, fails or the budget ends.
    ///
    /// Cancelling leaves the workflow in `Submitted`; the remote job keeps
    /// running and [`Workflow::converge`] may be called again.
    #[instrument(skip_all, fields(kind = %R::KIND, id = ?self.resource_id))]
    pub async fn converge(&mut self, cancel: &CancellationToken) -> Result<R> {
        if self.state != WorkflowState::Submitted {
            return Err(self.out_of_order(WorkflowState::Completed));
        }
        let id = self.require_id()?;

        let this = &*self;
        let id = id.as_str();
        let outcome = this.poller.poll(move || this.fetch_body(id), &this.terminal, cancel).await;

        match outcome {
            Ok(outcome) => {
                let next = match &outcome {
                    PollOutcome::Success { attempts, elapsed, .. } => {
                        info!(attempts, elapsed_ms = elapsed.as_millis() as u64, "workflow completed");
                        WorkflowState::Completed
                    }
                    PollOutcome::TerminalFailure { .. } => WorkflowState::Failed,
                    PollOutcome::TimedOut { .. } => WorkflowState::TimedOut,
                };
                self.state = next;
                outcome.into_result()
            }
            Err(VocalisError::Cancelled) => Err(VocalisError::Cancelled),
            Err(err) => {
                self.state = WorkflowState::Failed;
                Err(err)
            }
        }
    }

    /// All four steps in order. Both payloads are validated before the
    /// first network call.
    pub async fn run(
        &mut self,
        subject: &WorkflowSubject,
        submission: &Submission,
        cancel: &CancellationToken,
    ) -> Result<R> {
        subject.validate()?;
        submission.validate()?;

        self.create(subject).await?;
        self.fetch_instructions().await?;
        self.submit(submission).await?;
        self.converge(cancel).await
    }

    async fn fetch_body(&self, id: &str) -> Result<R> {
        let auth = self.tokens.request_auth().await?;
        let response = self.remote.fetch(R::KIND, id, &auth).await?;
        response.expect_status(STATUS_OK)?.decode()
    }

    fn require_id(&self) -> Result<String> {
        self.resource_id.clone().ok_or_else(|| {
            VocalisError::InvalidState(format!("{} has no resource id", R::KIND))
        })
    }

    fn ensure_can_enter(&self, next: WorkflowState) -> Result<()> {
        if self.state.can_transition_to(next) {
            Ok(())
        } else {
            Err(self.out_of_order(next))
        }
    }

    fn out_of_order(&self, next: WorkflowState) -> VocalisError {
        VocalisError::InvalidState(format!(
            "{} workflow cannot move from '{}' to '{}'",
            R::KIND,
            self.state,
            next
        ))
    }

    // Validation and cancellation leave the state alone; every other
    // failure ends the workflow.
    fn settle<T>(&mut self, result: Result<T>, next: WorkflowState) -> Result<T> {
        match result {
            Ok(value) => {
                self.state = next;
                Ok(value)
            }
            Err(err @ (VocalisError::Validation(_) | VocalisError::Cancelled)) => Err(err),
            Err(err) => {
                warn!(error = %err, state = %self.state, "workflow step failed");
                self.state = WorkflowState::Failed;
                Err(err)
            }
        }
    }
}
