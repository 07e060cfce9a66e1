//! HTTP transport implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{ApiError, ClientError};
use crate::http::request::{classify_response, ApiRequest};
use crate::utils::version_info;

/// Header carrying the access token unless configured otherwise
pub const DEFAULT_TOKEN_HEADER: &str = "X-API-Token";

/// Connection settings of one client instance
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base API URL (e.g. `https://example.com/api/device`)
    pub base_url: String,

    /// Access token sent with every request
    pub access_token: SecretString,

    /// Per-request timeout
    pub timeout: Duration,

    /// Name of the header carrying the access token
    pub token_header: String,

    /// User-Agent sent with every request
    pub user_agent: String,
}

impl ClientOptions {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: SecretString::from(access_token.into()),
            timeout: Duration::from_secs(30),
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            user_agent: format!("devtask/{}", version_info().version),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Performs one HTTP exchange per call and classifies its outcome
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: &ApiRequest) -> Result<Value, ApiError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(options: &ClientOptions) -> Result<Self, ClientError> {
        let base_url = options.base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url)
            .map_err(|e| ClientError::ConfigError(format!("invalid base URL {base_url:?}: {e}")))?;

        let mut token = header::HeaderValue::from_str(options.access_token.expose_secret())
            .map_err(|_| ClientError::ConfigError("access token is not a valid header value".to_string()))?;
        token.set_sensitive(true);
        let token_header = header::HeaderName::from_bytes(options.token_header.as_bytes())
            .map_err(|e| ClientError::ConfigError(format!("invalid token header: {e}")))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(token_header, token);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            timeout: options.timeout,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn classify_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::timeout(self.timeout)
        } else if err.is_connect() {
            ApiError::connection()
        } else {
            ApiError::request(err)
        }
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn request(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let url = self.url_for(&request.path);
        debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let result = match builder.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text().await {
                    Ok(body) => classify_response(status, &body),
                    Err(e) => Err(self.classify_error(e).with_status(status)),
                }
            }
            Err(e) => Err(self.classify_error(e)),
        };

        if let Err(e) = &result {
            warn!(
                "{} {} failed [{}]: {}",
                request.method,
                request.path,
                e.kind,
                e.message
            );
        }
        result
    }
}
