//! Data models

pub mod task;

pub use openapi_client::{
    CreateTaskResponse as CreatedTask, DeviceInfo, Limits, OverallStats, Pagination, PeriodStats,
    PriorityStats, StatisticsRecord as Statistics,
};
pub use task::{Confirmation, PriorityInput, Task, TaskPage, TaskPriority, TaskStage, TaskStatus};
