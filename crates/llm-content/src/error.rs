//! Error types for the LLM content pipeline.

use crate::LlmProvider;
use thiserror::Error;

/// Errors that can occur while calling a provider or parsing its output.
#[derive(Error, Debug)]
pub enum LlmError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("{provider} API error: {status} - {message}")]
    ApiError {
        provider: LlmProvider,
        status: u16,
        message: String,
    },

    /// Missing API key
    #[error("Missing API key for {0}")]
    MissingApiKey(LlmProvider),

    /// Invalid response from API (missing expected fields)
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Provider name not recognized
    #[error("Unsupported LLM provider: {0}")]
    UnsupportedProvider(String),
}

/// Result type alias using LlmError.
pub type LlmResult<T> = Result<T, LlmError>;
