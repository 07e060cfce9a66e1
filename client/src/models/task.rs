//! Task models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use openapi_client::{DeviceInfo, Pagination, TaskListRecord, TaskRecord};

use crate::errors::{ApiError, ErrorKind};

/// Task lifecycle status.
///
/// Transitions only move forward: Pending -> Processing -> Completed | Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Numeric code used by the server
    pub fn code(self) -> i64 {
        match self {
            TaskStatus::Pending => 0,
            TaskStatus::Processing => 1,
            TaskStatus::Completed => 2,
            TaskStatus::Failed => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// Completed or failed; no further transitions happen
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl TryFrom<i64> for TaskStatus {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TaskStatus::Pending),
            1 => Ok(TaskStatus::Processing),
            2 => Ok(TaskStatus::Completed),
            3 => Ok(TaskStatus::Failed),
            _ => Err(format!("Invalid status code: {}", code)),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "processing" => Ok(TaskStatus::Processing),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority, fixed at creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    #[default]
    Normal,
    High,
    Urgent,
}

impl TaskPriority {
    /// Numeric value used by the server
    pub fn value(self) -> u8 {
        match self {
            TaskPriority::Normal => 1,
            TaskPriority::High => 2,
            TaskPriority::Urgent => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskPriority::Normal => "normal",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

impl TryFrom<i64> for TaskPriority {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TaskPriority::Normal),
            2 => Ok(TaskPriority::High),
            3 => Ok(TaskPriority::Urgent),
            _ => Err(format!("Invalid priority value: {}", value)),
        }
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" | "1" => Ok(TaskPriority::Normal),
            "high" | "2" => Ok(TaskPriority::High),
            "urgent" | "3" => Ok(TaskPriority::Urgent),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority as accepted by task creation: the enum, a raw value, or a JSON
/// value that is either a number or an object exposing a `value` field.
#[derive(Debug, Clone, PartialEq)]
pub enum PriorityInput {
    Level(TaskPriority),
    Raw(i64),
    Json(Value),
}

impl PriorityInput {
    /// Resolve into a priority level before anything is sent
    pub fn normalize(self) -> Result<TaskPriority, ApiError> {
        match self {
            PriorityInput::Level(level) => Ok(level),
            PriorityInput::Raw(value) => {
                TaskPriority::try_from(value).map_err(|e| ApiError::new(ErrorKind::RequestError, e))
            }
            PriorityInput::Json(value) => normalize_json(&value),
        }
    }
}

fn normalize_json(value: &Value) -> Result<TaskPriority, ApiError> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(raw) => PriorityInput::Raw(raw).normalize(),
            None => Err(invalid_priority(value)),
        },
        Value::Object(map) => match map.get("value") {
            Some(inner @ Value::Number(_)) => normalize_json(inner),
            _ => Err(invalid_priority(value)),
        },
        _ => Err(invalid_priority(value)),
    }
}

fn invalid_priority(value: &Value) -> ApiError {
    ApiError::new(
        ErrorKind::RequestError,
        format!("Invalid priority value: {}", value),
    )
}

impl From<TaskPriority> for PriorityInput {
    fn from(level: TaskPriority) -> Self {
        PriorityInput::Level(level)
    }
}

impl From<i32> for PriorityInput {
    fn from(value: i32) -> Self {
        PriorityInput::Raw(value.into())
    }
}

impl From<i64> for PriorityInput {
    fn from(value: i64) -> Self {
        PriorityInput::Raw(value)
    }
}

impl From<Value> for PriorityInput {
    fn from(value: Value) -> Self {
        PriorityInput::Json(value)
    }
}

/// Status-specific part of a task snapshot.
///
/// Fields that only mean something in one lifecycle stage live in that
/// stage's variant, so a completed task has no queue position and a pending
/// task has no error message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskStage {
    Pending {
        queue_position: Option<u32>,
        can_cancel: bool,
    },
    Processing {
        server_id: Option<String>,
        processing_time: Option<String>,
    },
    Completed {
        completed_at: Option<String>,
        processing_time: Option<String>,
        device_info: Option<DeviceInfo>,
    },
    Failed {
        completed_at: Option<String>,
        error_message: Option<String>,
        retry_count: u32,
        can_retry: bool,
    },
}

/// Snapshot of a server-side task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    /// Task ID
    pub id: i64,

    /// Account the task runs for
    pub account_email: Option<String>,

    /// Priority, if the server reported a known one
    pub priority: Option<TaskPriority>,

    /// Created timestamp
    pub created_at: Option<String>,

    /// Updated timestamp
    pub updated_at: Option<String>,

    /// Processing start timestamp
    pub started_at: Option<String>,

    /// Stage-specific fields
    #[serde(flatten)]
    pub stage: TaskStage,
}

impl Task {
    pub fn status(&self) -> TaskStatus {
        match self.stage {
            TaskStage::Pending { .. } => TaskStatus::Pending,
            TaskStage::Processing { .. } => TaskStatus::Processing,
            TaskStage::Completed { .. } => TaskStatus::Completed,
            TaskStage::Failed { .. } => TaskStatus::Failed,
        }
    }

    pub fn queue_position(&self) -> Option<u32> {
        match self.stage {
            TaskStage::Pending { queue_position, .. } => queue_position,
            _ => None,
        }
    }

    pub fn can_cancel(&self) -> bool {
        matches!(self.stage, TaskStage::Pending { can_cancel: true, .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.stage {
            TaskStage::Failed { error_message, .. } => error_message.as_deref(),
            _ => None,
        }
    }

    pub fn can_retry(&self) -> bool {
        matches!(self.stage, TaskStage::Failed { can_retry: true, .. })
    }

    pub fn retry_count(&self) -> Option<u32> {
        match self.stage {
            TaskStage::Failed { retry_count, .. } => Some(retry_count),
            _ => None,
        }
    }

    pub fn device_info(&self) -> Option<&DeviceInfo> {
        match &self.stage {
            TaskStage::Completed { device_info, .. } => device_info.as_ref(),
            _ => None,
        }
    }

    pub fn completed_at(&self) -> Option<&str> {
        match &self.stage {
            TaskStage::Completed { completed_at, .. } | TaskStage::Failed { completed_at, .. } => {
                completed_at.as_deref()
            }
            _ => None,
        }
    }

    pub fn processing_time(&self) -> Option<&str> {
        match &self.stage {
            TaskStage::Processing { processing_time, .. }
            | TaskStage::Completed { processing_time, .. } => processing_time.as_deref(),
            _ => None,
        }
    }

    pub fn server_id(&self) -> Option<&str> {
        match &self.stage {
            TaskStage::Processing { server_id, .. } => server_id.as_deref(),
            _ => None,
        }
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = ApiError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let status = match (record.status_code, record.status.as_deref()) {
            (Some(code), _) => TaskStatus::try_from(code),
            (None, Some(name)) => name.parse(),
            (None, None) => Err("missing status".to_string()),
        }
        .map_err(|e| ApiError::invalid_response(format!("task #{}: {}", record.id, e)))?;

        let stage = match status {
            TaskStatus::Pending => TaskStage::Pending {
                queue_position: record.queue_position,
                can_cancel: record.can_cancel.unwrap_or(false),
            },
            TaskStatus::Processing => TaskStage::Processing {
                server_id: record.server_id,
                processing_time: record.processing_time,
            },
            TaskStatus::Completed => TaskStage::Completed {
                completed_at: record.completed_at,
                processing_time: record.processing_time,
                device_info: record.device_info,
            },
            TaskStatus::Failed => TaskStage::Failed {
                completed_at: record.completed_at,
                error_message: record.error_message,
                retry_count: record.retry_count.unwrap_or(0),
                can_retry: record.can_retry.unwrap_or(false),
            },
        };

        Ok(Task {
            id: record.id,
            account_email: record.account_email,
            priority: record.priority.and_then(|p| TaskPriority::try_from(p).ok()),
            created_at: record.created_at,
            updated_at: record.updated_at,
            started_at: record.started_at,
            stage,
        })
    }
}

/// One page of the task list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub pagination: Pagination,
    /// Summary counters as reported by the server
    pub stats: Value,
}

impl TryFrom<TaskListRecord> for TaskPage {
    type Error = ApiError;

    fn try_from(record: TaskListRecord) -> Result<Self, Self::Error> {
        let tasks = record
            .tasks
            .into_iter()
            .map(Task::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TaskPage {
            tasks,
            pagination: record.pagination,
            stats: record.stats,
        })
    }
}

/// Server acknowledgement of a cancel or retry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub details: serde_json::Map<String, Value>,
}
