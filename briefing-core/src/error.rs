//! Error types for a briefing run

use thiserror::Error;

/// Run-level error; every variant is fatal to the run
#[derive(Error, Debug)]
pub enum BriefingError {
    #[error("Feed error: {0}")]
    Fetch(String),

    #[error("Categorization failed: {0}")]
    Categorization(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Prompt template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BriefingError {
    pub fn fetch(msg: impl Into<String>) -> Self {
        BriefingError::Fetch(msg.into())
    }

    pub fn categorization(msg: impl Into<String>) -> Self {
        BriefingError::Categorization(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        BriefingError::Persistence(msg.into())
    }

    pub fn template(msg: impl Into<String>) -> Self {
        BriefingError::Template(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        BriefingError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        BriefingError::Internal(msg.into())
    }
}

/// Result type alias for briefing operations
pub type BriefingResult<T> = Result<T, BriefingError>;
