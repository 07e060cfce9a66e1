//! Device API task operations

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use openapi_client::{CreateTaskRequest, StatisticsRecord, TaskIdRequest, TaskListRecord, TaskRecord};

use crate::errors::{ApiError, ClientError};
use crate::http::client::{ClientOptions, HttpClient, Transport};
use crate::http::request::ApiRequest;
use crate::models::{Confirmation, CreatedTask, PriorityInput, Statistics, Task, TaskPage, TaskPriority, TaskStatus};
use crate::tasks::observer::TaskObserver;
use crate::tasks::poller::{wait_for_completion, TaskSource, WaitOptions, WaitOutcome};
use crate::utils::account_label;

/// Endpoint paths relative to the base URL
pub mod endpoints {
    pub const CREATE: &str = "create.php";
    pub const LIST: &str = "list.php";
    pub const GET: &str = "get.php";
    pub const CANCEL: &str = "cancel.php";
    pub const RETRY: &str = "retry.php";
    pub const STATS: &str = "stats.php";
}

/// Largest page the list endpoint accepts
pub const MAX_LIST_LIMIT: i64 = 100;

/// Status filter of the list endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn as_param(&self) -> String {
        match self {
            StatusFilter::All => "all".to_string(),
            StatusFilter::Only(status) => status.as_str().to_string(),
        }
    }
}

/// Priority filter of the list endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(TaskPriority),
}

impl PriorityFilter {
    pub fn as_param(&self) -> String {
        match self {
            PriorityFilter::All => "all".to_string(),
            PriorityFilter::Only(priority) => priority.value().to_string(),
        }
    }
}

/// List parameters; limit and offset are clamped before sending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: i64,
    pub offset: i64,
    pub status: StatusFilter,
    pub priority: PriorityFilter,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            status: StatusFilter::All,
            priority: PriorityFilter::All,
        }
    }
}

impl ListQuery {
    pub fn with_status(status: TaskStatus, limit: i64) -> Self {
        Self {
            limit,
            status: StatusFilter::Only(status),
            ..Self::default()
        }
    }

    pub fn clamped_limit(&self) -> i64 {
        self.limit.clamp(0, MAX_LIST_LIMIT)
    }

    pub fn clamped_offset(&self) -> i64 {
        self.offset.max(0)
    }
}

/// Result of one item of a bulk cancel or retry
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOutcome {
    pub task_id: i64,
    pub result: Result<Confirmation, ApiError>,
}

/// Typed client for the Device API
#[derive(Debug, Clone)]
pub struct DeviceApiClient<T: Transport = HttpClient> {
    transport: T,
}

impl DeviceApiClient<HttpClient> {
    /// Create a client talking HTTP to `options.base_url`
    pub fn connect(options: &ClientOptions) -> Result<Self, ClientError> {
        Ok(Self::with_transport(HttpClient::new(options)?))
    }
}

impl<T: Transport> DeviceApiClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<R: DeserializeOwned>(&self, request: &ApiRequest) -> Result<R, ApiError> {
        let data = self.transport.request(request).await?;
        decode(data)
    }

    /// Create a new device task.
    ///
    /// `priority` may be a `TaskPriority`, a raw value, or a JSON value
    /// (`3` or `{"value": 3}`); it is normalized before sending.
    pub async fn create_task(
        &self,
        account_info: &str,
        priority: impl Into<PriorityInput>,
    ) -> Result<CreatedTask, ApiError> {
        let priority = priority.into().normalize()?;
        let body = CreateTaskRequest {
            account_info: account_info.to_string(),
            priority: priority.value(),
        };
        debug!(
            "Creating task for {} with priority {}",
            account_label(account_info),
            priority
        );
        let request = ApiRequest::post(endpoints::CREATE, &body)?;
        self.call(&request).await
    }

    /// Fetch the current snapshot of a task
    pub async fn get_task(&self, task_id: i64) -> Result<Task, ApiError> {
        let request = ApiRequest::get(endpoints::GET).with_query("task_id", task_id);
        let record: TaskRecord = self.call(&request).await?;
        Task::try_from(record)
    }

    /// List tasks with filtering and pagination
    pub async fn list_tasks(&self, query: &ListQuery) -> Result<TaskPage, ApiError> {
        let request = ApiRequest::get(endpoints::LIST)
            .with_query("limit", query.clamped_limit())
            .with_query("offset", query.clamped_offset())
            .with_query("status", query.status.as_param())
            .with_query("priority", query.priority.as_param());
        let record: TaskListRecord = self.call(&request).await?;
        TaskPage::try_from(record)
    }

    /// Cancel a pending task
    pub async fn cancel_task(&self, task_id: i64) -> Result<Confirmation, ApiError> {
        let request = ApiRequest::post(endpoints::CANCEL, &TaskIdRequest { task_id })?;
        self.call(&request).await
    }

    /// Retry a failed task
    pub async fn retry_task(&self, task_id: i64) -> Result<Confirmation, ApiError> {
        let request = ApiRequest::post(endpoints::RETRY, &TaskIdRequest { task_id })?;
        self.call(&request).await
    }

    /// Aggregate statistics of the account
    pub async fn get_statistics(&self) -> Result<Statistics, ApiError> {
        let record: StatisticsRecord = self.call(&ApiRequest::get(endpoints::STATS)).await?;
        Ok(record)
    }

    /// Poll a task until it completes, fails, or `options.timeout` elapses
    pub async fn await_completion(
        &self,
        task_id: i64,
        options: &WaitOptions,
        observer: &dyn TaskObserver,
    ) -> WaitOutcome {
        wait_for_completion(self, task_id, options, observer, tokio::time::sleep).await
    }

    /// Create a task and wait for it. Creation errors are returned unchanged
    /// and no polling happens.
    pub async fn create_and_wait(
        &self,
        account_info: &str,
        priority: impl Into<PriorityInput>,
        options: &WaitOptions,
        observer: &dyn TaskObserver,
    ) -> Result<WaitOutcome, ApiError> {
        let created = self.create_task(account_info, priority).await?;
        info!("Task created: #{}", created.task_id);
        Ok(self.await_completion(created.task_id, options, observer).await)
    }

    pub async fn pending_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.tasks_with_status(TaskStatus::Pending, MAX_LIST_LIMIT).await
    }

    pub async fn processing_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.tasks_with_status(TaskStatus::Processing, MAX_LIST_LIMIT).await
    }

    pub async fn completed_tasks(&self, limit: i64) -> Result<Vec<Task>, ApiError> {
        self.tasks_with_status(TaskStatus::Completed, limit).await
    }

    pub async fn failed_tasks(&self, limit: i64) -> Result<Vec<Task>, ApiError> {
        self.tasks_with_status(TaskStatus::Failed, limit).await
    }

    async fn tasks_with_status(&self, status: TaskStatus, limit: i64) -> Result<Vec<Task>, ApiError> {
        let page = self.list_tasks(&ListQuery::with_status(status, limit)).await?;
        Ok(page.tasks)
    }

    /// Cancel every pending task; individual failures are collected
    pub async fn cancel_all_pending(&self) -> Result<Vec<BulkOutcome>, ApiError> {
        let mut outcomes = Vec::new();
        for task in self.pending_tasks().await? {
            let result = self.cancel_task(task.id).await;
            match &result {
                Ok(_) => info!("Cancelled task #{}", task.id),
                Err(e) => warn!("Failed to cancel task #{}: {}", task.id, e),
            }
            outcomes.push(BulkOutcome {
                task_id: task.id,
                result,
            });
        }
        Ok(outcomes)
    }

    /// Retry every failed task that the server marks as retryable
    pub async fn retry_all_failed(&self) -> Result<Vec<BulkOutcome>, ApiError> {
        let mut outcomes = Vec::new();
        for task in self.failed_tasks(MAX_LIST_LIMIT).await? {
            if !task.can_retry() {
                continue;
            }
            let result = self.retry_task(task.id).await;
            match &result {
                Ok(_) => info!("Retried task #{}", task.id),
                Err(e) => warn!("Failed to retry task #{}: {}", task.id, e),
            }
            outcomes.push(BulkOutcome {
                task_id: task.id,
                result,
            });
        }
        Ok(outcomes)
    }
}

#[async_trait]
impl<T: Transport> TaskSource for DeviceApiClient<T> {
    async fn fetch_task(&self, task_id: i64) -> Result<Task, ApiError> {
        self.get_task(task_id).await
    }
}

fn decode<R: DeserializeOwned>(data: Value) -> Result<R, ApiError> {
    serde_json::from_value(data).map_err(ApiError::invalid_response)
}
