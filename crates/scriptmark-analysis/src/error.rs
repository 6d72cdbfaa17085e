//! Analysis provider error types.
//!
//! These represent failures when talking to the external generative-text
//! service. They never escape the augmenter boundary as errors; the
//! augmenter flattens them into the `error` field of its outcome.

use thiserror::Error;

/// Errors that can occur when interacting with an analysis provider.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid or missing API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The provider returned no usable text.
    #[error("provider returned an empty response")]
    EmptyResponse,
}
