//! CLI settings file

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ClientError;
use crate::logs::LogLevel;
use crate::tasks::WaitOptions;

/// CLI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    /// API connection
    #[serde(default)]
    pub api: ApiSettings,

    /// Completion polling
    #[serde(default)]
    pub wait: WaitSettings,
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api: ApiSettings::default(),
            wait: WaitSettings::default(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let contents = tokio::fs::read_to_string(path).await?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }
}

/// API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL for the Device API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Access token; usually supplied on the command line or environment
    #[serde(default)]
    pub access_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/device".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            timeout_secs: default_request_timeout(),
        }
    }
}

/// Completion polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitSettings {
    /// Maximum wait in seconds
    #[serde(default = "default_wait_timeout")]
    pub timeout_secs: u64,

    /// Seconds between status checks
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_wait_timeout() -> u64 {
    600
}

fn default_poll_interval() -> u64 {
    10
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_wait_timeout(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl From<&WaitSettings> for WaitOptions {
    fn from(settings: &WaitSettings) -> Self {
        WaitOptions {
            timeout: Duration::from_secs(settings.timeout_secs),
            poll_interval: Duration::from_secs(settings.poll_interval_secs),
        }
    }
}
