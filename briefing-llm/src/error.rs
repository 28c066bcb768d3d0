//! Error types for model calls

use briefing_core::BriefingError;
use thiserror::Error;

/// Closed set of failure categories for a single model attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    /// The model answered with no text
    #[error("Response text is empty")]
    EmptyResponse,

    /// The text could not be parsed as a categorization
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    /// Credentials were rejected; retrying cannot help
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Transport or API failure
    #[error("Request failed: {0}")]
    Request(String),
}

impl LlmError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        LlmError::MalformedJson(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        LlmError::Authentication(msg.into())
    }

    pub fn request(msg: impl Into<String>) -> Self {
        LlmError::Request(msg.into())
    }

    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, LlmError::Authentication(_))
    }
}

/// Terminal outcome of the categorization gateway
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Model rejected credentials on attempt {attempt}: {message}")]
    Authentication { attempt: u32, message: String },

    #[error("Giving up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: LlmError },
}

impl GatewayError {
    /// Number of attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            GatewayError::Authentication { attempt, .. } => *attempt,
            GatewayError::Exhausted { attempts, .. } => *attempts,
        }
    }
}

impl From<GatewayError> for BriefingError {
    fn from(err: GatewayError) -> Self {
        BriefingError::categorization(err.to_string())
    }
}
