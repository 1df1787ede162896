//! Error types for model invocation.

use thiserror::Error;

/// Errors returned by model providers.
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("model provider not configured: {reason}")]
    NotConfigured { reason: String },

    #[error("model request failed: {reason}")]
    Request { reason: String },

    #[error("model API error ({status}): {message}")]
    Api { status: String, message: String },

    #[error("model returned no usable content")]
    EmptyResponse,
}

/// Result type alias for model operations.
pub type LlmResult<T> = Result<T, LlmError>;
