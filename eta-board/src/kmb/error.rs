//! Transport error types.

/// Errors from fetching a JSON document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Body was not valid JSON, or not the expected shape
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Every attempt failed; carries the last failure
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// HTTP status of the (last) failed attempt, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http(e) => e.status().map(|s| s.as_u16()),
            FetchError::Api { status, .. } => Some(*status),
            FetchError::Json { .. } => None,
            FetchError::Exhausted { last, .. } => last.status(),
        }
    }
}
