//! Model endpoint errors
//!
//! The runner treats every variant the same way: fatal on the first turn,
//! a halt afterwards. The variants exist so the CI log says what went wrong.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API key is required for {provider}")]
    MissingApiKey { provider: String },

    /// Non-2xx answer other than 429
    #[error("{provider} API error ({status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Body was not JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised by the HTTP client or by the runner's own deadline
    #[error("{provider} did not respond within {seconds}s")]
    Timeout { provider: String, seconds: u64 },

    /// JSON, but not a chat completion (no `choices`, no `message`)
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("{provider} rate limited: {message}")]
    RateLimited { provider: String, message: String },

    /// Scripted failures from `MockProvider`
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn rate_limited(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn timeout(provider: impl Into<String>, seconds: u64) -> Self {
        Self::Timeout {
            provider: provider.into(),
            seconds,
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
