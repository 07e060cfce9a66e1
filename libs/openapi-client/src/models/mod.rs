//! API models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response envelope shared by every endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub error_code: Option<String>,
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    /// Read the envelope field by field, so one mistyped field does not
    /// discard the others. A numeric `error_code` is kept as its text.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let text = |key: &str| match value.get(key) {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        Self {
            success: value
                .get("success")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false),
            message: text("message"),
            error_code: text("error_code"),
            data: value.get("data").filter(|d| !d.is_null()).cloned(),
        }
    }
}

/// Task creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    /// Account credentials in the form `email|password`
    pub account_info: String,
    pub priority: u8,
}

/// Body for cancel and retry calls
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaskIdRequest {
    pub task_id: i64,
}

/// Task creation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskResponse {
    pub task_id: i64,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// Device produced by a completed task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: Option<String>,
    pub country: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Task snapshot as serialized by the server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    #[serde(default)]
    pub account_email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub priority_text: Option<String>,
    #[serde(default)]
    pub device_info: Option<DeviceInfo>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub server_id: Option<String>,
    #[serde(default)]
    pub retry_count: Option<u32>,
    #[serde(default)]
    pub processing_time: Option<String>,
    #[serde(default)]
    pub queue_position: Option<u32>,
    #[serde(default)]
    pub can_cancel: Option<bool>,
    #[serde(default)]
    pub can_retry: Option<bool>,
}

/// Pagination block of the list endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub has_more: bool,
}

/// List endpoint payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskListRecord {
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub stats: serde_json::Value,
}

/// Per-user task limits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default)]
    pub max_pending_tasks: u32,
    #[serde(default)]
    pub max_processing_tasks: u32,
    #[serde(default)]
    pub pending_slots_available: u32,
    #[serde(default)]
    pub can_create_new_task: bool,
}

/// All-time counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    #[serde(default)]
    pub total_tasks: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub processing: u64,
    #[serde(default)]
    pub avg_processing_time: Option<String>,
    #[serde(default)]
    pub limits: Option<Limits>,
}

/// Counters over a time window (today, week)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub success_rate: f64,
}

/// Counters for one priority level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorityStats {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub success_rate: f64,
}

/// Statistics endpoint payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    #[serde(default)]
    pub overall: OverallStats,
    #[serde(default)]
    pub today: PeriodStats,
    #[serde(default)]
    pub week: Option<PeriodStats>,
    /// Keyed by priority value ("1", "2", "3")
    #[serde(default)]
    pub priority_breakdown: BTreeMap<String, PriorityStats>,
}
