//! Endpoint analysis: locate spoken words inside a recording
//!
//! Starting the task submits the audio, so an analysis goes straight from
//! `Uninitialized` to `Submitted` and then converges on the task status.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};
use vocalis_domain::{
    AnalysisRequest, AnalysisStatus, AnalysisTask, AppModel, Interval, PollBudget, ResourceKind,
    Result, TerminalStates, VocalisError, WorkflowState,
};

use crate::auth::TokenCache;
use crate::labeling::label_intervals;
use crate::polling::poller::encode_job_body;
use crate::polling::{JobPoller, PollOutcome};
use crate::ports::RemoteOperations;
use crate::resources::{to_payload, STATUS_OK};

/// One endpoint-analysis task
pub struct AnalysisWorkflow {
    remote: Arc<dyn RemoteOperations>,
    tokens: Arc<TokenCache>,
    poller: JobPoller,
    terminal: TerminalStates<AnalysisStatus>,
    state: WorkflowState,
    task_name: Option<String>,
}

impl AnalysisWorkflow {
    /// Fresh workflow in `Uninitialized`
    pub fn new(remote: Arc<dyn RemoteOperations>, tokens: Arc<TokenCache>, budget: PollBudget) -> Self {
        Self {
            remote,
            tokens,
            poller: JobPoller::new(budget),
            terminal: TerminalStates::for_status(),
            state: WorkflowState::Uninitialized,
            task_name: None,
        }
    }

    /// Current workflow state
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Remote task name, once started
    pub fn task_name(&self) -> Option<&str> {
        self.task_name.as_deref()
    }

    /// Start the task (expects 200 with `taskName` and `taskStatus`)
    #[instrument(skip_all)]
    pub async fn start(&mut self, request: &AnalysisRequest) -> Result<AnalysisTask> {
        if self.state != WorkflowState::Uninitialized {
            return Err(VocalisError::InvalidState(format!(
                "analysis already started (state '{}')",
                self.state
            )));
        }
        let payload = to_payload(request)?;

        let result: Result<AnalysisTask> = async {
            let auth = self.tokens.request_auth().await?;
            let response = self.remote.create(ResourceKind::Analysis, &payload, &auth).await?;
            response.expect_status(STATUS_OK)?.decode()
        }
        .await;

        match result {
            Ok(task) => {
                info!(task = %task.task_name, status = %task.task_status, "analysis started");
                self.task_name = Some(task.task_name.clone());
                self.state = WorkflowState::Submitted;
                Ok(task)
            }
            Err(err) => {
                self.state = WorkflowState::Failed;
                Err(err)
            }
        }
    }

    /// Poll `GET /analysis/{taskName}` until the task converges
    #[instrument(skip_all, fields(task = ?self.task_name))]
    pub async fn converge(&mut self, cancel: &CancellationToken) -> Result<AnalysisTask> {
        if self.state != WorkflowState::Submitted {
            return Err(VocalisError::InvalidState(format!(
                "analysis cannot converge from state '{}'",
                self.state
            )));
        }
        let task_name = self.task_name.clone().ok_or_else(|| {
            VocalisError::InvalidState("analysis has no task name".into())
        })?;

        let this = &*self;
        let task_name = task_name.as_str();
        let outcome = this.poller.poll(move || this.fetch_task(task_name), &this.terminal, cancel).await;

        match outcome {
            Ok(outcome) => {
                self.state = match &outcome {
                    PollOutcome::Success { .. } => WorkflowState::Completed,
                    PollOutcome::TerminalFailure { .. } => WorkflowState::Failed,
                    PollOutcome::TimedOut { .. } => WorkflowState::TimedOut,
                };
                outcome.into_result()
            }
            Err(VocalisError::Cancelled) => Err(VocalisError::Cancelled),
            Err(err) => {
                self.state = WorkflowState::Failed;
                Err(err)
            }
        }
    }

    /// Start and converge
    pub async fn run(&mut self, request: &AnalysisRequest, cancel: &CancellationToken) -> Result<AnalysisTask> {
        self.start(request).await?;
        self.converge(cancel).await
    }

    async fn fetch_task(&self, task_name: &str) -> Result<AnalysisTask> {
        let auth = self.tokens.request_auth().await?;
        let response = self.remote.fetch(ResourceKind::Analysis, task_name, &auth).await?;
        response.expect_status(STATUS_OK)?.decode()
    }
}

/// Label a completed task's intervals with the app model's vocabulary.
///
/// # Errors
/// - `Remote` when the task carries no intervals.
/// - `Validation` when the app model has an empty vocabulary.
pub fn intervals_with_phrases(task: &AnalysisTask, app_model: &AppModel) -> Result<Vec<Interval>> {
    let Some(spans) = task.intervals.as_deref() else {
        return Err(VocalisError::remote(STATUS_OK, encode_job_body(task)?.to_string()));
    };
    label_intervals(&app_model.vocabulary, app_model.enrollment_repeats, spans)
}
