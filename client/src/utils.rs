//! Utility functions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Version information for the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Render a duration as seconds, without a fraction when it is whole
pub fn format_secs(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{:.3}", duration.as_secs_f64())
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// Email part of `email|password` account credentials
pub fn account_label(account_info: &str) -> &str {
    account_info.split('|').next().unwrap_or_default()
}
