//! Error types for the Device API client

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::utils::format_secs;

/// Classification of a failed API call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No response within the configured timeout
    Timeout,

    /// Server unreachable (refused, DNS failure, ...)
    ConnectionError,

    /// Response body was not JSON
    InvalidJson,

    /// Success envelope whose data does not match the expected model
    InvalidResponse,

    /// Any other failure, including error envelopes without a code
    RequestError,

    /// Error code declared by the server, passed through verbatim
    Server(String),
}

impl ErrorKind {
    /// Wire identifier of the kind
    pub fn code(&self) -> &str {
        match self {
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::ConnectionError => "CONNECTION_ERROR",
            ErrorKind::InvalidJson => "INVALID_JSON",
            ErrorKind::InvalidResponse => "INVALID_RESPONSE",
            ErrorKind::RequestError => "REQUEST_ERROR",
            ErrorKind::Server(code) => code,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Structured error returned by every API operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub status_code: Option<u16>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
        }
    }

    /// Attach the HTTP status the error was received with
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("Request timeout after {} seconds", format_secs(after)),
        )
    }

    pub fn connection() -> Self {
        Self::new(
            ErrorKind::ConnectionError,
            "Connection error - unable to reach API server",
        )
    }

    pub fn request(cause: impl fmt::Display) -> Self {
        Self::new(ErrorKind::RequestError, format!("Request error: {}", cause))
    }

    pub fn invalid_response(cause: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::InvalidResponse,
            format!("Unexpected response data: {}", cause),
        )
    }

    /// Wire identifier of the error kind
    pub fn code(&self) -> &str {
        self.kind.code()
    }

    /// Whether the failure happened before any server verdict was received
    pub fn is_transient(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout | ErrorKind::ConnectionError)
    }
}

/// Process-level error type (construction, settings, logging, CLI)
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error [{kind}]: {0}", kind = .0.kind)]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Logging error: {0}")]
    LoggingError(String),
}
