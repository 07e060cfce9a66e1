//! Request envelope and response classification

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use openapi_client::Envelope;

use crate::errors::{ApiError, ErrorKind};

/// Maximum number of characters of a non-JSON body kept for diagnostics
pub const BODY_SNIPPET_LEN: usize = 200;

/// One API call: method, endpoint, optional JSON body and query parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST request carrying `body` serialized as JSON
    pub fn post<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        let body = serde_json::to_value(body).map_err(ApiError::request)?;
        Ok(Self {
            body: Some(body),
            ..Self::new(Method::POST, path)
        })
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Value of a query parameter, if set
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Turn a received status and body into the envelope's data or an error.
///
/// The envelope's `success` flag decides the outcome regardless of the HTTP
/// status. A missing `data` field yields an empty object.
pub fn classify_response(status: u16, body: &str) -> Result<Value, ApiError> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            return Err(ApiError::new(
                ErrorKind::InvalidJson,
                format!("Invalid JSON response: {}", snippet(body)),
            )
            .with_status(status));
        }
    };

    let envelope = Envelope::from_value(&value);
    if envelope.success {
        return Ok(envelope
            .data
            .unwrap_or_else(|| Value::Object(serde_json::Map::new())));
    }

    let kind = match envelope.error_code {
        Some(code) if !code.is_empty() => ErrorKind::Server(code),
        _ => ErrorKind::RequestError,
    };
    let message = envelope
        .message
        .unwrap_or_else(|| format!("HTTP Error {}", status));
    Err(ApiError::new(kind, message).with_status(status))
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_LEN).collect()
}
