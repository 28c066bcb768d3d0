//! Prompt assembly
//!
//! The editorial template is an external asset; it is concatenated as-is
//! in front of the article listing.

use std::path::Path;

use briefing_core::{BriefingError, NormalizedArticle};
use tracing::debug;

/// Separator placed between article blocks
pub const ARTICLE_SEPARATOR: &str = "---";

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
}

impl PromptBuilder {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Load the editorial template from disk
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, BriefingError> {
        let path = path.as_ref();
        let template = tokio::fs::read_to_string(path).await.map_err(|e| {
            BriefingError::template(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!("Loaded prompt template ({} bytes) from {}", template.len(), path.display());
        Ok(Self::new(template))
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Build the full payload: template followed by the article blocks
    pub fn build(&self, articles: &[NormalizedArticle]) -> String {
        let listing = articles
            .iter()
            .map(article_block)
            .collect::<Vec<_>>()
            .join(ARTICLE_SEPARATOR);

        format!("{}{}", self.template, listing)
    }
}

/// Render one article as labeled lines
pub fn article_block(article: &NormalizedArticle) -> String {
    format!(
        "\nID: {}\nSource: {}\nTitle: {}\nDescription: {}\n",
        article.id, article.source, article.title, article.description
    )
}
