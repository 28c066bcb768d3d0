//! Feed article data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An entry as read from an RSS/Atom feed, before validation
///
/// Every field is optional because feeds routinely omit them; incomplete
/// entries are dropped during normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeedItem {
    pub title: Option<String>,
    /// Item body (RSS description / Atom content)
    pub content: Option<String>,
    pub link: Option<String>,
    /// Publication time, already converted to UTC
    pub published_at: Option<DateTime<Utc>>,
}

impl RawFeedItem {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        link: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            link: Some(link.into()),
            published_at: Some(published_at),
        }
    }
}

/// A validated, content-addressed article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedArticle {
    /// First 10 hex characters of SHA-256 over `title-content-link`
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    /// Label of the feed this article came from (e.g. "LSM")
    pub source: String,
}
