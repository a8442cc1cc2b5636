//! KMB open data HTTP client.
//!
//! Performs a single GET per call; retrying is layered on top by
//! [`RetryingFetcher`](super::RetryingFetcher).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use tokio::sync::Semaphore;

use super::error::FetchError;

/// Default base URL for the KMB open data API.
const DEFAULT_BASE_URL: &str = "https://data.etabus.gov.hk/v1/transport/kmb";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// How much of an unparseable body to keep for diagnostics.
const BODY_SNIPPET_CHARS: usize = 500;

/// A source of JSON documents addressed by API path (e.g. `/route`).
///
/// One call is one attempt: implementations must not retry internally.
pub trait JsonSource: Send + Sync {
    fn get_json(&self, path: &str) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Set a custom base URL (for testing or a proxy).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP-backed [`JsonSource`].
///
/// Uses a semaphore to bound in-flight requests, so a burst of stop-name
/// lookups does not flood the API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl HttpSource {
    /// Create a new client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl JsonSource for HttpSource {
    async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FetchError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}{}", self.base_url, path);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: snippet(&body),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| FetchError::Json {
            message: e.to_string(),
            body: Some(snippet(&body)),
        })
    }
}

/// Leading part of a response body, short enough to log.
fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}
