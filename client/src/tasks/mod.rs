//! Task lifecycle: typed operations and completion polling

pub mod controller;
pub mod observer;
pub mod poller;

pub use controller::{
    endpoints, BulkOutcome, DeviceApiClient, ListQuery, PriorityFilter, StatusFilter, MAX_LIST_LIMIT,
};
pub use observer::{NoopObserver, TaskObserver, TracingObserver};
pub use poller::{wait_for_completion, CompletionFsm, TaskSource, WaitOptions, WaitOutcome, WaitState};
