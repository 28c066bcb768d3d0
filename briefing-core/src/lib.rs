//! Core types for the daily news briefing
//!
//! This crate defines the shared data structures that flow through a briefing
//! run: raw and normalized feed articles, the model's categorization output,
//! and the published briefing document.

pub mod article;
pub mod briefing;
pub mod error;

pub use article::{NormalizedArticle, RawFeedItem};
pub use briefing::{
    Article, CategorizationResult, Category, DailyBriefing, LlmArticle, LlmCategory, Source,
};
pub use error::{BriefingError, BriefingResult};
