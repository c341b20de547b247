//! Entry point tying the workflows to one remote and credential scope

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::instrument;
use vocalis_domain::{
    AnalysisRequest, AnalysisTask, Enrollment, Interval, PollBudget, Result, Submission,
    Verification, WorkflowSubject,
};

use super::analysis::{intervals_with_phrases, AnalysisWorkflow};
use super::session::{EnrollmentWorkflow, VerificationWorkflow};
use crate::auth::TokenCache;
use crate::ports::RemoteOperations;
use crate::resources::ResourceService;

/// Builds workflows that share one remote, one token cache and one budget.
///
/// Workflow calls authenticate with `tokens`. App model lookups for
/// interval labeling use `admin_tokens`, which defaults to the same cache.
#[derive(Clone)]
pub struct WorkflowOrchestrator {
    remote: Arc<dyn RemoteOperations>,
    tokens: Arc<TokenCache>,
    admin_tokens: Arc<TokenCache>,
    budget: PollBudget,
}

impl WorkflowOrchestrator {
    /// Orchestrator whose workflows authenticate through `tokens`
    pub fn new(remote: Arc<dyn RemoteOperations>, tokens: Arc<TokenCache>, budget: PollBudget) -> Self {
        Self { remote, admin_tokens: Arc::clone(&tokens), tokens, budget }
    }

    /// Use `admin_tokens` for app-model lookups instead of `tokens`
    #[must_use]
    pub fn with_admin_tokens(mut self, admin_tokens: Arc<TokenCache>) -> Self {
        self.admin_tokens = admin_tokens;
        self
    }

    /// Poll budget handed to every workflow
    pub fn budget(&self) -> PollBudget {
        self.budget
    }

    /// New enrollment workflow
    pub fn enrollment(&self) -> EnrollmentWorkflow {
        EnrollmentWorkflow::new(Arc::clone(&self.remote), Arc::clone(&self.tokens), self.budget)
    }

    /// New verification workflow
    pub fn verification(&self) -> VerificationWorkflow {
        VerificationWorkflow::new(Arc::clone(&self.remote), Arc::clone(&self.tokens), self.budget)
    }

    /// New analysis workflow
    pub fn analysis(&self) -> AnalysisWorkflow {
        AnalysisWorkflow::new(Arc::clone(&self.remote), Arc::clone(&self.tokens), self.budget)
    }

    /// Collections, with admin credentials
    pub fn resources(&self) -> ResourceService {
        ResourceService::new(Arc::clone(&self.remote), Arc::clone(&self.admin_tokens))
    }

    /// Enroll `subject` with one recording and return the completed enrollment
    #[instrument(skip_all, fields(app_model = %subject.application, consumer = %subject.consumer))]
    pub async fn run_enrollment(
        &self,
        subject: &WorkflowSubject,
        submission: &Submission,
        cancel: &CancellationToken,
    ) -> Result<Enrollment> {
        self.enrollment().run(subject, submission, cancel).await
    }

    /// Verify `subject` against one recording and return the verdict body
    #[instrument(skip_all, fields(app_model = %subject.application, consumer = %subject.consumer))]
    pub async fn run_verification(
        &self,
        subject: &WorkflowSubject,
        submission: &Submission,
        cancel: &CancellationToken,
    ) -> Result<Verification> {
        self.verification().run(subject, submission, cancel).await
    }

    /// Start an analysis and wait for it to converge
    pub async fn run_analysis(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisTask> {
        self.analysis().run(request, cancel).await
    }

    /// Analyse a recording and label the detected intervals with the
    /// vocabulary of `app_model_id`
    #[instrument(skip(self, request, cancel))]
    pub async fn run_analysis_with_phrases(
        &self,
        request: &AnalysisRequest,
        app_model_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Interval>> {
        let task = self.run_analysis(request, cancel).await?;
        let app_model = self.resources().app_models().get(app_model_id).await?;
        intervals_with_phrases(&task, &app_model)
    }
}
