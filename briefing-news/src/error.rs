//! Error types for the news module

use briefing_core::BriefingError;
use thiserror::Error;

/// Errors that can occur while fetching or parsing feeds
#[derive(Debug, Error)]
pub enum NewsError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Feed host returned a non-success status
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Body was neither RSS nor Atom
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<NewsError> for BriefingError {
    fn from(err: NewsError) -> Self {
        match err {
            NewsError::InvalidConfig(msg) => BriefingError::config(msg),
            other => BriefingError::fetch(other.to_string()),
        }
    }
}
