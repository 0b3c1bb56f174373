//! Skald error types

use std::time::Duration;

/// Skald error types
#[derive(Debug, thiserror::Error)]
pub enum SkaldError {
    // Pipeline errors
    #[error("unknown content type: {0}")]
    UnknownTemplate(String),

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("generation failed: {0}")]
    GenerationFailed(String),

    #[error("no input provided")]
    EmptyInput,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("empty response from model")]
    EmptyResponse,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("history storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no provider configured")]
    NoProvider,
}

impl SkaldError {
    /// Whether the caller should wait and try the same request again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SkaldError::RateLimited { .. })
    }
}

impl From<reqwest::Error> for SkaldError {
    fn from(err: reqwest::Error) -> Self {
        SkaldError::Http(err.to_string())
    }
}

/// Result type alias for Skald operations
pub type Result<T> = std::result::Result<T, SkaldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rate_limit_is_retryable() {
        assert!(SkaldError::RateLimited { retry_after: None }.is_retryable());
        assert!(!SkaldError::GenerationFailed("boom".into()).is_retryable());
        assert!(!SkaldError::EmptyInput.is_retryable());
    }

    #[test]
    fn display_carries_message() {
        let err = SkaldError::Api {
            status: 503,
            message: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "API error (503): overloaded");
        assert_eq!(
            SkaldError::UnknownTemplate("poem".into()).to_string(),
            "unknown content type: poem"
        );
    }
}
