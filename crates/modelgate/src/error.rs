//! Error types for modelgate.
//!
//! One enum covers the whole surface so callers can match on kind:
//! transient remote failures (retried), protocol contract violations
//! (fatal, never retried), and payload decode failures (logged, surfaced).

use std::time::Duration;
use thiserror::Error;

/// Main error type for modelgate operations.
#[derive(Debug, Error)]
pub enum GateError {
    // Transient remote failures — candidates for retry.
    #[error("Rate limited by endpoint, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },

    // Non-retryable remote failures.
    #[error("Endpoint returned {status}: {body}")]
    Http { status: u16, body: String },

    /// All retry attempts over a transient failure were used up.
    #[error("Retry exhausted after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<GateError>,
    },

    /// The response broke the call contract: a required tool invocation was
    /// missing, or the invoked tool was not the one requested. A programming
    /// or integration defect, never a transient condition.
    #[error("Protocol violation: {message}")]
    ProtocolViolation { message: String },

    /// Tool-call arguments were not valid JSON. The raw payload is carried
    /// for diagnosis.
    #[error("Malformed tool arguments: {message}")]
    MalformedArguments { message: String, payload: String },

    /// The response envelope failed to deserialize.
    #[error("Response decode error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

/// Result type alias for modelgate operations.
pub type Result<T> = std::result::Result<T, GateError>;

impl From<reqwest::Error> for GateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GateError::Timeout(Duration::from_secs(0))
        } else {
            GateError::Connection {
                message: err.to_string(),
            }
        }
    }
}

impl GateError {
    /// Check if this error belongs to the transient whitelist: rate
    /// limiting, connection failure, request timeout, or a server-side
    /// internal error. Only these are safe to retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GateError::RateLimited { .. }
                | GateError::Connection { .. }
                | GateError::Timeout(_)
                | GateError::Server { .. }
        )
    }
}
