//! Completion polling
//!
//! Waits for a task to reach a terminal status by fetching its snapshot at a
//! fixed interval until it completes, fails, or the deadline passes. The
//! deadline is only checked between polls; an in-flight fetch is never
//! aborted by it.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::errors::ApiError;
use crate::models::{Task, TaskStatus};
use crate::tasks::observer::TaskObserver;
use crate::utils::format_secs;

/// Source of task snapshots
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn fetch_task(&self, task_id: i64) -> Result<Task, ApiError>;
}

/// Wait options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Maximum time to keep polling
    pub timeout: Duration,

    /// Delay between two status checks
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            poll_interval: Duration::from_secs(10),
        }
    }
}

/// State of a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Waiting,
    Completed,
    Failed,
    TimedOut,
}

impl WaitState {
    pub fn is_terminal(self) -> bool {
        self != WaitState::Waiting
    }
}

/// Wait state machine, fed with one event per poll
#[derive(Debug, Clone)]
pub struct CompletionFsm {
    state: WaitState,
    last_status: Option<TaskStatus>,
    polls: u32,
    failed_polls: u32,
}

impl CompletionFsm {
    pub fn new() -> Self {
        Self {
            state: WaitState::Waiting,
            last_status: None,
            polls: 0,
            failed_polls: 0,
        }
    }

    pub fn state(&self) -> WaitState {
        self.state
    }

    pub fn last_status(&self) -> Option<TaskStatus> {
        self.last_status
    }

    /// Status checks performed, failed ones included
    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn failed_polls(&self) -> u32 {
        self.failed_polls
    }

    /// Record a fetched status. Returns true when it differs from the last
    /// observed one.
    ///
    /// Events after a terminal state are ignored.
    pub fn observe(&mut self, status: TaskStatus) -> bool {
        if self.state.is_terminal() {
            warn!("Ignoring status {} observed after wait ended ({:?})", status, self.state);
            return false;
        }
        self.polls += 1;

        let changed = self.last_status != Some(status);
        if let Some(previous) = self.last_status {
            if status.code() < previous.code() {
                warn!("Task status went backwards: {} -> {}", previous, status);
            }
        }
        self.last_status = Some(status);

        self.state = match status {
            TaskStatus::Completed => WaitState::Completed,
            TaskStatus::Failed => WaitState::Failed,
            TaskStatus::Pending | TaskStatus::Processing => WaitState::Waiting,
        };
        changed
    }

    /// Record a status check that did not return a snapshot
    pub fn check_failed(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.polls += 1;
        self.failed_polls += 1;
    }

    /// The deadline passed
    pub fn expire(&mut self) {
        if self.state == WaitState::Waiting {
            self.state = WaitState::TimedOut;
        }
    }
}

impl Default for CompletionFsm {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of waiting on a task
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    Completed { task: Task },
    Failed { error: String, task: Task },
    TimedOut { timeout: Duration },
}

impl WaitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WaitOutcome::Completed { .. })
    }

    pub fn state(&self) -> WaitState {
        match self {
            WaitOutcome::Completed { .. } => WaitState::Completed,
            WaitOutcome::Failed { .. } => WaitState::Failed,
            WaitOutcome::TimedOut { .. } => WaitState::TimedOut,
        }
    }

    pub fn error(&self) -> Option<String> {
        match self {
            WaitOutcome::Completed { .. } => None,
            WaitOutcome::Failed { error, .. } => Some(error.clone()),
            WaitOutcome::TimedOut { timeout } => Some(format!(
                "Task did not complete within {} seconds",
                format_secs(*timeout)
            )),
        }
    }

    /// Final snapshot; absent on timeout
    pub fn task(&self) -> Option<&Task> {
        match self {
            WaitOutcome::Completed { task } | WaitOutcome::Failed { task, .. } => Some(task),
            WaitOutcome::TimedOut { .. } => None,
        }
    }

    /// JSON summary: `success`, `status`, and `error` / `task` when present
    pub fn summary(&self) -> serde_json::Value {
        let status = match self.state() {
            WaitState::Completed => "completed",
            WaitState::Failed => "failed",
            WaitState::TimedOut => "timeout",
            WaitState::Waiting => "waiting",
        };
        let mut summary = json!({ "success": self.is_success(), "status": status });
        if let Some(error) = self.error() {
            summary["error"] = json!(error);
        }
        if let Some(task) = self.task() {
            summary["task"] = serde_json::to_value(task).unwrap_or_default();
        }
        summary
    }
}

/// Poll `task_id` until it completes, fails, or `options.timeout` elapses.
///
/// A failed status check is reported to the observer and retried after the
/// poll interval; it never ends the wait. `sleep_fn` performs the delay
/// between polls.
pub async fn wait_for_completion<A, S, F>(
    source: &A,
    task_id: i64,
    options: &WaitOptions,
    observer: &dyn TaskObserver,
    sleep_fn: S,
) -> WaitOutcome
where
    A: TaskSource + ?Sized,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    let started = Instant::now();
    let mut fsm = CompletionFsm::new();
    debug!(
        "Waiting for task #{} (timeout {}s, interval {}s)",
        task_id,
        format_secs(options.timeout),
        format_secs(options.poll_interval)
    );

    while started.elapsed() < options.timeout {
        match source.fetch_task(task_id).await {
            Ok(task) => {
                if fsm.observe(task.status()) {
                    observer.on_status_change(&task);
                }

                match fsm.state() {
                    WaitState::Completed => {
                        debug!("Task #{} completed after {} polls", task_id, fsm.polls());
                        observer.on_complete(&task);
                        return WaitOutcome::Completed { task };
                    }
                    WaitState::Failed => {
                        debug!("Task #{} failed after {} polls", task_id, fsm.polls());
                        observer.on_fail(&task);
                        let error = task.error_message().unwrap_or("Unknown error").to_string();
                        return WaitOutcome::Failed { error, task };
                    }
                    WaitState::Waiting | WaitState::TimedOut => {}
                }
            }
            Err(e) => {
                fsm.check_failed();
                observer.on_poll_error(task_id, &e);
            }
        }

        sleep_fn(options.poll_interval).await;
    }

    fsm.expire();
    debug!(
        "Task #{} still {:?} after {} polls ({} failed)",
        task_id,
        fsm.last_status(),
        fsm.polls(),
        fsm.failed_polls()
    );
    observer.on_timeout(task_id, options.timeout);
    WaitOutcome::TimedOut {
        timeout: options.timeout,
    }
}
