//! Scripted in-memory [`JsonSource`] for development and tests.
//!
//! Responses are registered per path. Queued responses are served first, in
//! order; once a path's queue is empty its fixed response (if any) is served
//! on every call. Unknown paths answer 404.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;

use super::client::JsonSource;
use super::error::FetchError;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 200 with this JSON body.
    Json(Value),
    /// Non-success status with a text body.
    Status { status: u16, body: String },
    /// 200 whose body is not JSON.
    Malformed(String),
}

impl MockResponse {
    pub fn json(value: Value) -> Self {
        MockResponse::Json(value)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        MockResponse::Status {
            status,
            body: body.into(),
        }
    }

    pub fn malformed(body: impl Into<String>) -> Self {
        MockResponse::Malformed(body.into())
    }

    fn into_result(self) -> Result<Value, FetchError> {
        match self {
            MockResponse::Json(value) => Ok(value),
            MockResponse::Status { status, body } => Err(FetchError::Api {
                status,
                message: body,
            }),
            MockResponse::Malformed(body) => Err(FetchError::Json {
                message: "expected value at line 1 column 1".to_string(),
                body: Some(body),
            }),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    queued: HashMap<String, VecDeque<MockResponse>>,
    fixed: HashMap<String, MockResponse>,
    latency: HashMap<String, Duration>,
    calls: HashMap<String, u32>,
}

/// Mock source that serves scripted responses.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    state: Arc<Mutex<MockState>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serve `value` on every call to `path` (after any queued responses).
    pub fn respond(&self, path: &str, value: Value) {
        self.lock()
            .fixed
            .insert(path.to_string(), MockResponse::Json(value));
    }

    /// Fail every call to `path` with `status` (after any queued responses).
    pub fn respond_status(&self, path: &str, status: u16, body: &str) {
        self.lock()
            .fixed
            .insert(path.to_string(), MockResponse::status(status, body));
    }

    /// Queue a one-shot response for `path`.
    pub fn push(&self, path: &str, response: MockResponse) {
        self.lock()
            .queued
            .entry(path.to_string())
            .or_default()
            .push_back(response);
    }

    /// Delay every response for `path` by `latency`.
    pub fn set_latency(&self, path: &str, latency: Duration) {
        self.lock().latency.insert(path.to_string(), latency);
    }

    /// Number of calls made for `path`.
    pub fn calls(&self, path: &str) -> u32 {
        self.lock().calls.get(path).copied().unwrap_or(0)
    }

    /// Number of calls made across all paths.
    pub fn total_calls(&self) -> u32 {
        self.lock().calls.values().sum()
    }
}

impl JsonSource for MockSource {
    async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        let (response, latency) = {
            let mut state = self.lock();
            *state.calls.entry(path.to_string()).or_default() += 1;

            let response = match state.queued.get_mut(path).and_then(VecDeque::pop_front) {
                Some(response) => Some(response),
                None => state.fixed.get(path).cloned(),
            };
            (response, state.latency.get(path).copied())
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        response
            .ok_or_else(|| FetchError::Api {
                status: 404,
                message: format!("no mock response for {path}"),
            })?
            .into_result()
    }
}
