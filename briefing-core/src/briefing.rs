//! Categorization and briefing document structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A category as returned by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmCategory {
    pub category_name: String,
    #[serde(default)]
    pub articles: Vec<LlmArticle>,
}

/// A generated headline with the article ids it was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmArticle {
    pub headline: String,
    /// May reference ids the run never produced
    #[serde(default)]
    pub source_ids: Vec<String>,
}

/// Model output: ordered categories, trusted only by shape
pub type CategorizationResult = Vec<LlmCategory>;

/// A resolved source article backing a headline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Feed label
    pub name: String,
    pub title: String,
    pub url: String,
    /// Local, human-readable publication time
    pub published_at: String,
}

/// A headline and its resolved sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub headline: String,
    pub sources: Vec<Source>,
}

/// A named group of articles, in model order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_name: String,
    pub articles: Vec<Article>,
}

/// The document written at the end of each run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBriefing {
    pub last_updated_at: DateTime<Utc>,
    pub news_categories: Vec<Category>,
}

impl DailyBriefing {
    pub fn new(last_updated_at: DateTime<Utc>, news_categories: Vec<Category>) -> Self {
        Self {
            last_updated_at,
            news_categories,
        }
    }

    /// Total number of resolved sources across all categories
    pub fn source_count(&self) -> usize {
        self.news_categories
            .iter()
            .flat_map(|c| c.articles.iter())
            .map(|a| a.sources.len())
            .sum()
    }
}
