//! Fixed-delay retry for API reads.
//!
//! The API sits behind an edge proxy that drops requests intermittently, so
//! every read goes through a bounded number of attempts separated by a fixed
//! pause. There is no exponential growth: each endpoint class has one delay.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, warn};

use super::client::JsonSource;
use super::error::FetchError;

/// How many times to try a request and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,

    /// Pause after each failed attempt except the last.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Route catalog and stop sequence lookups: 3 attempts, 2s apart.
    pub const CATALOG: Self = Self {
        max_attempts: 3,
        delay: Duration::from_secs(2),
    };

    /// Stop names and arrival estimates: 5 attempts, 3s apart. These
    /// endpoints fail transiently more often.
    pub const REALTIME: Self = Self {
        max_attempts: 5,
        delay: Duration::from_secs(3),
    };

    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

/// Wraps a [`JsonSource`] with bounded retries.
#[derive(Debug, Clone)]
pub struct RetryingFetcher<S> {
    source: S,
}

impl<S: JsonSource> RetryingFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch `path`, retrying failed attempts according to `policy`.
    ///
    /// Each attempt completes before the next begins. After the final
    /// failure returns [`FetchError::Exhausted`] wrapping the last error.
    pub async fn fetch(&self, path: &str, policy: RetryPolicy) -> Result<Value, FetchError> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.source.get_json(path).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(path, attempt, "fetch succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    if attempt >= max_attempts {
                        error!(path, attempts = attempt, error = %e, "giving up");
                        return Err(FetchError::Exhausted {
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }

                    warn!(
                        path,
                        attempt,
                        max_attempts,
                        status = e.status(),
                        error = %e,
                        "fetch attempt failed, retrying"
                    );
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmb::mock::{MockResponse, MockSource};
    use serde_json::json;
    use tokio::time::Instant;

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_secs(2))
    }

    #[test]
    fn policy_constants() {
        assert_eq!(RetryPolicy::CATALOG.max_attempts, 3);
        assert_eq!(RetryPolicy::CATALOG.delay, Duration::from_secs(2));
        assert_eq!(RetryPolicy::REALTIME.max_attempts, 5);
        assert_eq!(RetryPolicy::REALTIME.delay, Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_returns_immediately() {
        let source = MockSource::new();
        source.respond("/route", json!({"data": []}));
        let fetcher = RetryingFetcher::new(source.clone());

        let start = Instant::now();
        let value = fetcher.fetch("/route", fast(3)).await.unwrap();

        assert_eq!(value, json!({"data": []}));
        assert_eq!(source.calls("/route"), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failures() {
        let source = MockSource::new();
        source.push("/route", MockResponse::status(503, "busy"));
        source.push("/route", MockResponse::status(522, ""));
        source.respond("/route", json!({"data": []}));
        let fetcher = RetryingFetcher::new(source.clone());

        let start = Instant::now();
        assert!(fetcher.fetch("/route", fast(3)).await.is_ok());

        assert_eq!(source.calls("/route"), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_keeps_last_status() {
        let source = MockSource::new();
        source.push("/route", MockResponse::status(500, "first"));
        source.push("/route", MockResponse::status(502, "second"));
        source.push("/route", MockResponse::status(503, "third"));
        let fetcher = RetryingFetcher::new(source.clone());

        let err = fetcher.fetch("/route", fast(3)).await.unwrap_err();

        match &err {
            FetchError::Exhausted { attempts, last } => {
                assert_eq!(*attempts, 3);
                assert!(matches!(**last, FetchError::Api { status: 503, .. }));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_tries_once() {
        let source = MockSource::new();
        source.respond_status("/stop/X", 500, "");
        let fetcher = RetryingFetcher::new(source.clone());

        let start = Instant::now();
        assert!(fetcher.fetch("/stop/X", fast(0)).await.is_err());
        assert_eq!(source.calls("/stop/X"), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_json_is_retried() {
        let source = MockSource::new();
        source.push("/route", MockResponse::malformed("<html>"));
        source.respond("/route", json!({"data": []}));
        let fetcher = RetryingFetcher::new(source.clone());

        assert!(fetcher.fetch("/route", fast(2)).await.is_ok());
        assert_eq!(source.calls("/route"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn independent_retries_do_not_block_each_other() {
        let source = MockSource::new();
        source.push("/stop/A", MockResponse::status(503, ""));
        source.respond("/stop/A", json!({"data": {}}));
        source.respond("/stop/B", json!({"data": {}}));
        let fetcher = RetryingFetcher::new(source.clone());
        let policy = RetryPolicy::new(2, Duration::from_secs(3));

        let start = Instant::now();
        let b_done = async {
            fetcher.fetch("/stop/B", policy).await.unwrap();
            start.elapsed()
        };
        let (a, b_elapsed) = tokio::join!(fetcher.fetch("/stop/A", policy), b_done);

        assert!(a.is_ok());
        assert_eq!(b_elapsed, Duration::ZERO);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }
}
