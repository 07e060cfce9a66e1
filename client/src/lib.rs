//! Device API task client
//!
//! Submits device tasks to the remote task API, polls them until they reach
//! a terminal status, and reads account statistics.

pub mod display;
pub mod errors;
pub mod http;
pub mod logs;
pub mod models;
pub mod settings;
pub mod tasks;
pub mod utils;

pub use errors::{ApiError, ClientError, ErrorKind};
pub use http::{ClientOptions, HttpClient, Transport};
pub use models::{Task, TaskPriority, TaskStatus};
pub use tasks::{DeviceApiClient, ListQuery, TaskObserver, WaitOptions, WaitOutcome};
