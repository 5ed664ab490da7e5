//! Client error types and transient/permanent classification

use thiserror::Error;

/// Editing-tools client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success response decoded from the engine's error envelope
    #[error("API error {status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ClientError {
    /// Whether a retry can plausibly succeed.
    ///
    /// Timeouts, connection failures, and server-side/rate-limit statuses are
    /// transient; validation and structural errors (other 4xx) are permanent
    /// and surface immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(err) => err.is_timeout() || err.is_connect(),
            ClientError::Api { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            ClientError::UnexpectedResponse(_) => false,
        }
    }
}
