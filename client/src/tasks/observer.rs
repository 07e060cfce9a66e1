//! Progress notifications emitted while waiting on a task

use std::time::Duration;

use tracing::{info, warn};

use crate::errors::ApiError;
use crate::models::Task;
use crate::utils::format_secs;

/// Receives progress events from `wait_for_completion`.
///
/// All methods default to doing nothing.
pub trait TaskObserver: Send + Sync {
    /// The observed status differs from the previous poll (or is the first one)
    fn on_status_change(&self, _task: &Task) {}

    /// The task reached COMPLETED
    fn on_complete(&self, _task: &Task) {}

    /// The task reached FAILED
    fn on_fail(&self, _task: &Task) {}

    /// A status check failed; the wait continues
    fn on_poll_error(&self, _task_id: i64, _error: &ApiError) {}

    /// The deadline passed without a terminal status
    fn on_timeout(&self, _task_id: i64, _timeout: Duration) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TaskObserver for NoopObserver {}

/// Observer that reports progress through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TaskObserver for TracingObserver {
    fn on_status_change(&self, task: &Task) {
        match task.queue_position() {
            Some(position) => info!(
                task_id = task.id,
                status = %task.status(),
                queue_position = position,
                "Task status changed"
            ),
            None => info!(task_id = task.id, status = %task.status(), "Task status changed"),
        }
    }

    fn on_complete(&self, task: &Task) {
        let device = task.device_info().and_then(|d| d.name.as_deref());
        info!(task_id = task.id, device = device.unwrap_or("unknown"), "Task completed");
    }

    fn on_fail(&self, task: &Task) {
        warn!(
            task_id = task.id,
            error = task.error_message().unwrap_or("Unknown error"),
            "Task failed"
        );
    }

    fn on_poll_error(&self, task_id: i64, error: &ApiError) {
        warn!(task_id, kind = %error.kind, "Error checking status: {}", error);
    }

    fn on_timeout(&self, task_id: i64, timeout: Duration) {
        warn!(task_id, "Timeout reached after {}s", format_secs(timeout));
    }
}
