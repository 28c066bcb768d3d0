//! Article normalization and the per-run lookup table
//!
//! Raw feed items become [`NormalizedArticle`]s with a content-derived id:
//! the same title, content and link always yield the same id, and any edit
//! upstream yields a new one.

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use tracing::debug;

use briefing_core::{NormalizedArticle, RawFeedItem};

use crate::rss_client::FeedBatch;

/// Number of hex characters kept from the SHA-256 digest
pub const ARTICLE_ID_LEN: usize = 10;

/// Compute the content-addressed article id
pub fn article_id(title: &str, content: &str, link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}-{}-{}", title, content, link).as_bytes());
    let mut id = hex::encode(hasher.finalize());
    id.truncate(ARTICLE_ID_LEN);
    id
}

/// Replace double quotes with apostrophes and trim
pub fn clean_string(text: &str) -> String {
    text.replace('"', "'").trim().to_string()
}

/// Validate and normalize the items of one feed
///
/// Items missing any of title, content, link or publication date are dropped.
pub fn normalize(items: &[RawFeedItem], source: &str) -> Vec<NormalizedArticle> {
    let articles: Vec<NormalizedArticle> = items
        .iter()
        .filter_map(|item| {
            let title = non_empty(item.title.as_deref())?;
            let content = non_empty(item.content.as_deref())?;
            let link = non_empty(item.link.as_deref())?;
            let published_at = item.published_at?;

            Some(NormalizedArticle {
                id: article_id(title, content, link),
                title: clean_string(title),
                description: clean_string(content),
                url: link.to_string(),
                published_at,
                source: source.to_string(),
            })
        })
        .collect();

    debug!(
        "Normalized {} of {} items from {}",
        articles.len(),
        items.len(),
        source
    );
    articles
}

/// Normalize every batch into one flat list, preserving feed order
pub fn normalize_batches(batches: &[FeedBatch]) -> Vec<NormalizedArticle> {
    batches
        .iter()
        .flat_map(|batch| normalize(&batch.items, &batch.source))
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Run-scoped id → article table
///
/// Keys are unique; inserting an existing id replaces the earlier article.
#[derive(Debug, Clone, Default)]
pub struct ArticleLookup {
    articles: IndexMap<String, NormalizedArticle>,
}

impl ArticleLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, article: NormalizedArticle) {
        self.articles.insert(article.id.clone(), article);
    }

    pub fn get(&self, id: &str) -> Option<&NormalizedArticle> {
        self.articles.get(id)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Articles in first-insertion order
    pub fn articles(&self) -> impl Iterator<Item = &NormalizedArticle> {
        self.articles.values()
    }
}

impl<'a> FromIterator<&'a NormalizedArticle> for ArticleLookup {
    fn from_iter<I: IntoIterator<Item = &'a NormalizedArticle>>(iter: I) -> Self {
        let mut lookup = ArticleLookup::new();
        for article in iter {
            lookup.insert(article.clone());
        }
        lookup
    }
}

impl FromIterator<NormalizedArticle> for ArticleLookup {
    fn from_iter<I: IntoIterator<Item = NormalizedArticle>>(iter: I) -> Self {
        let mut lookup = ArticleLookup::new();
        for article in iter {
            lookup.insert(article);
        }
        lookup
    }
}
