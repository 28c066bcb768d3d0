//! Model-facing half of the daily briefing
//!
//! This crate provides:
//! - Prompt assembly from the editorial template and normalized articles
//! - A Gemini REST client
//! - The categorization gateway with bounded retry

pub mod error;
pub mod gateway;
pub mod gemini;
pub mod prompt;

pub use error::{GatewayError, LlmError};
pub use gateway::{
    parse_categorization, strip_code_fence, CategorizationGateway, LlmClient, RetryPolicy,
};
pub use gemini::{classify_error, GeminiClient, DEFAULT_MODEL};
pub use prompt::{article_block, PromptBuilder, ARTICLE_SEPARATOR};
