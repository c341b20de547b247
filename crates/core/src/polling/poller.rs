//! Generic wait-for-state loop shared by every workflow
//!
//! The loop fetches immediately, then every `poll_interval`, until the job
//! reports a terminal status or `max_duration` has elapsed since the first
//! fetch. It is not a retry mechanism: a failed fetch ends the wait at once.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use vocalis_domain::{
    AnalysisStatus, AnalysisTask, Enrollment, EnrollmentStatus, JobStatus, PollBudget, Result,
    TerminalStates, Verification, VerificationStatus, VocalisError,
};

/// A fetched job body that reports its status
pub trait StatusReport {
    type Status: JobStatus;

    fn status(&self) -> &Self::Status;
}

impl StatusReport for Enrollment {
    type Status = EnrollmentStatus;

    fn status(&self) -> &EnrollmentStatus {
        &self.status
    }
}

impl StatusReport for Verification {
    type Status = VerificationStatus;

    fn status(&self) -> &VerificationStatus {
        &self.status
    }
}

impl StatusReport for AnalysisTask {
    type Status = AnalysisStatus;

    fn status(&self) -> &AnalysisStatus {
        &self.task_status
    }
}

/// How a poll ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    /// The job reached a success status
    Success { body: T, attempts: u32, elapsed: Duration },
    /// The job reached a failure status; `body` is the last fetch
    TerminalFailure { status: String, body: T, attempts: u32 },
    /// The budget ran out before any terminal status
    TimedOut { last_status: String, elapsed: Duration, attempts: u32 },
}

impl<T> PollOutcome<T> {
    /// Number of fetches made
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. }
            | Self::TerminalFailure { attempts, .. }
            | Self::TimedOut { attempts, .. } => *attempts,
        }
    }

    /// Whether the job converged on a success status
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl<T: Serialize> PollOutcome<T> {
    /// Collapse into the error taxonomy: only `Success` is `Ok`
    ///
    /// # Errors
    /// `TerminalFailure` or `TimedOut` for the matching outcome, or
    /// `Transport` if a failed job's body cannot be re-encoded.
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Success { body, .. } => Ok(body),
            Self::TerminalFailure { status, body, .. } => {
                Err(VocalisError::TerminalFailure { status, body: encode_job_body(&body)? })
            }
            Self::TimedOut { last_status, elapsed, .. } => {
                Err(VocalisError::TimedOut { last_status, elapsed })
            }
        }
    }
}

/// JSON form of a fetched job body, for error payloads
pub(crate) fn encode_job_body<T: Serialize>(body: &T) -> Result<serde_json::Value> {
    serde_json::to_value(body)
        .map_err(|e| VocalisError::Transport(format!("job body cannot be encoded: {e}")))
}

/// Polls a job until it converges or the budget runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobPoller {
    budget: PollBudget,
}

impl JobPoller {
    /// Poller bounded by `budget`
    pub fn new(budget: PollBudget) -> Self {
        Self { budget }
    }

    /// Deadline and interval of each wait
    pub fn budget(&self) -> PollBudget {
        self.budget
    }

    /// Drive `fetch` until a terminal status or the deadline.
    ///
    /// Exit order per fetch: failure status, success status, deadline,
    /// otherwise sleep one interval. Elapsed time is checked only between
    /// fetches, so the wait may overrun `max_duration` by one interval.
    ///
    /// # Errors
    /// - Any error returned by `fetch`, unchanged and without further calls.
    /// - `VocalisError::Cancelled` if `cancel` fires while fetching or
    ///   sleeping. The remote job is left alone.
    #[instrument(skip_all, fields(
        max_ms = self.budget.max_duration.as_millis() as u64,
        interval_ms = self.budget.poll_interval.as_millis() as u64,
    ))]
    pub async fn poll<T, F, Fut>(
        &self,
        mut fetch: F,
        terminal: &TerminalStates<T::Status>,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome<T>>
    where
        T: StatusReport,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            let body = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(VocalisError::Cancelled),
                fetched = fetch() => fetched?,
            };
            attempts += 1;

            let status = body.status().clone();
            let elapsed = started.elapsed();
            debug!(attempt = attempts, %status, elapsed_ms = elapsed.as_millis() as u64, "polled job");

            if terminal.is_failure(&status) {
                warn!(%status, attempts, "job reported terminal failure");
                return Ok(PollOutcome::TerminalFailure {
                    status: status.to_string(),
                    body,
                    attempts,
                });
            }
            if terminal.is_success(&status) {
                return Ok(PollOutcome::Success { body, attempts, elapsed });
            }
            if elapsed >= self.budget.max_duration {
                warn!(%status, attempts, elapsed_ms = elapsed.as_millis() as u64, "poll budget exhausted");
                return Ok(PollOutcome::TimedOut {
                    last_status: status.to_string(),
                    elapsed,
                    attempts,
                });
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(attempts, "poll cancelled");
                    return Err(VocalisError::Cancelled);
                }
                _ = tokio::time::sleep(self.budget.poll_interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[derive(Debug, Clone, Serialize)]
    struct Job {
        status: AnalysisStatus,
    }

    impl StatusReport for Job {
        type Status = AnalysisStatus;

        fn status(&self) -> &AnalysisStatus {
            &self.status
        }
    }

    fn poller(max_ms: u64, interval_ms: u64) -> JobPoller {
        JobPoller::new(PollBudget::from_millis(max_ms, interval_ms))
    }

    /// Reports `running` for the first `running_for` calls, then `last`
    fn scripted(
        calls: Arc<AtomicU32>,
        running_for: u32,
        last: AnalysisStatus,
    ) -> impl FnMut() -> std::future::Ready<Result<Job>> {
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            let status = if n < running_for { AnalysisStatus::Running } else { last.clone() };
            std::future::ready(Ok(Job { status }))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_n_running() {
        let calls = Arc::new(AtomicU32::new(0));
        let terminal = TerminalStates::for_status();
        let start = Instant::now();

        let outcome = poller(1_000, 10)
            .poll(scripted(calls.clone(), 4, AnalysisStatus::Completed), &terminal, &CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_within_one_interval_of_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let terminal = TerminalStates::for_status();
        let start = Instant::now();

        let outcome = poller(50, 10)
            .poll(scripted(calls, u32::MAX, AnalysisStatus::Completed), &terminal, &CancellationToken::new())
            .await
            .unwrap();

        let waited = start.elapsed();
        match outcome {
            PollOutcome::TimedOut { last_status, elapsed, .. } => {
                assert_eq!(last_status, "running");
                assert!(elapsed >= Duration::from_millis(50));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(waited >= Duration::from_millis(50) && waited <= Duration::from_millis(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_on_first_fetch_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let terminal = TerminalStates::for_status();

        let outcome = poller(1_000, 10)
            .poll(scripted(calls.clone(), 0, AnalysisStatus::Failed), &terminal, &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(outcome, PollOutcome::TerminalFailure { ref status, .. } if status == "failed"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_checked_before_success() {
        let terminal = TerminalStates::new(
            vec![AnalysisStatus::Failed],
            vec![AnalysisStatus::Failed],
        );
        let calls = Arc::new(AtomicU32::new(0));

        let outcome = poller(1_000, 10)
            .poll(scripted(calls, 0, AnalysisStatus::Failed), &terminal, &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(outcome, PollOutcome::TerminalFailure { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_surfaces_without_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let terminal = TerminalStates::<AnalysisStatus>::for_status();

        let result = poller(1_000, 10)
            .poll(
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    std::future::ready(Err::<Job, _>(VocalisError::Transport("reset".into())))
                },
                &terminal,
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(VocalisError::Transport(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_within_one_interval() {
        let calls = Arc::new(AtomicU32::new(0));
        let terminal = TerminalStates::for_status();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(25)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let result = poller(10_000, 10)
            .poll(scripted(calls.clone(), u32::MAX, AnalysisStatus::Completed), &terminal, &cancel)
            .await;

        assert!(matches!(result, Err(VocalisError::Cancelled)));
        assert!(start.elapsed() < Duration::from_millis(40));
        assert!(calls.load(Ordering::SeqCst) <= 4);
    }

    #[test]
    fn test_into_result_maps_outcomes() {
        let timed_out: PollOutcome<Job> = PollOutcome::TimedOut {
            last_status: "running".into(),
            elapsed: Duration::from_millis(50),
            attempts: 6,
        };
        assert!(matches!(timed_out.into_result(), Err(VocalisError::TimedOut { .. })));

        let failed = PollOutcome::TerminalFailure {
            status: "failed".into(),
            body: Job { status: AnalysisStatus::Failed },
            attempts: 1,
        };
        match failed.into_result() {
            Err(VocalisError::TerminalFailure { status, body }) => {
                assert_eq!(status, "failed");
                assert_eq!(body["status"], "failed");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    /// Serializes as an error, like a body holding a non-string map key
    #[derive(Debug)]
    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("map key must be a string"))
        }
    }

    #[test]
    fn test_unencodable_failure_body_is_transport_error() {
        let failed = PollOutcome::TerminalFailure {
            status: "failed".into(),
            body: Unencodable,
            attempts: 2,
        };
        match failed.into_result() {
            Err(VocalisError::Transport(reason)) => assert!(reason.contains("map key")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
