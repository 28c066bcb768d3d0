//! Expands model output back into displayable source records
//!
//! The model only ever sees article ids; everything shown to readers comes
//! from the run's [`ArticleLookup`]. Ids the lookup does not know are dropped
//! with a warning, never an error.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use chrono_tz::Tz;
use itertools::Itertools;
use tracing::{debug, warn};

use briefing_core::{
    Article, CategorizationResult, Category, LlmArticle, NormalizedArticle, Source,
};
use briefing_news::ArticleLookup;

/// Lowercase Latvian short month names, January first
const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "mai", "jūn", "jūl", "aug", "sep", "okt", "nov", "dec",
];

/// Per-source clock corrections, in minutes added before formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockCorrections {
    offsets: HashMap<String, i64>,
}

impl ClockCorrections {
    /// No corrections at all
    pub fn none() -> Self {
        Self {
            offsets: HashMap::new(),
        }
    }

    pub fn with(mut self, source: &str, minutes: i64) -> Self {
        self.offsets.insert(source.to_string(), minutes);
        self
    }

    pub fn offset_minutes(&self, source: &str) -> i64 {
        self.offsets.get(source).copied().unwrap_or(0)
    }
}

impl Default for ClockCorrections {
    /// LSM publishes timestamps one hour early
    fn default() -> Self {
        Self::none().with("LSM", 60)
    }
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    corrections: ClockCorrections,
    timezone: Tz,
}

impl Reconciler {
    pub fn new(corrections: ClockCorrections, timezone: Tz) -> Self {
        Self {
            corrections,
            timezone,
        }
    }

    pub fn with_timezone(timezone: Tz) -> Self {
        Self::new(ClockCorrections::default(), timezone)
    }

    /// Resolve every category, keeping the model's ordering
    pub fn reconcile(
        &self,
        result: &CategorizationResult,
        lookup: &ArticleLookup,
    ) -> Vec<Category> {
        let categories: Vec<Category> = result
            .iter()
            .map(|category| Category {
                category_name: category.category_name.clone(),
                articles: category
                    .articles
                    .iter()
                    .map(|article| self.resolve_article(article, lookup))
                    .collect(),
            })
            .collect();

        debug!(
            "Reconciled {} categories with {} articles",
            categories.len(),
            categories.iter().map(|c| c.articles.len()).sum::<usize>()
        );
        categories
    }

    fn resolve_article(&self, article: &LlmArticle, lookup: &ArticleLookup) -> Article {
        let sources = article
            .source_ids
            .iter()
            .unique()
            .filter_map(|id| match lookup.get(id) {
                Some(found) => Some(self.source(found)),
                None => {
                    warn!("Source id {} for \"{}\" not found, skipping", id, article.headline);
                    None
                }
            })
            .collect();

        Article {
            headline: article.headline.clone(),
            sources,
        }
    }

    fn source(&self, article: &NormalizedArticle) -> Source {
        Source {
            name: article.source.clone(),
            title: article.title.clone(),
            url: article.url.clone(),
            published_at: self.format_published_at(article.published_at, &article.source),
        }
    }

    /// Format as `HH:MM, D. mon. YYYY` in the configured zone
    pub fn format_published_at(&self, published_at: DateTime<Utc>, source: &str) -> String {
        let corrected = published_at + Duration::minutes(self.corrections.offset_minutes(source));
        let local = corrected.with_timezone(&self.timezone);

        format!(
            "{:02}:{:02}, {}. {}. {}",
            local.hour(),
            local.minute(),
            local.day(),
            MONTHS[local.month0() as usize],
            local.year()
        )
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::with_timezone(chrono_tz::Europe::Riga)
    }
}
