//! One-shot briefing run
//!
//! fetch → normalize → prompt → categorize → reconcile → write → revalidate.
//! Every step before the write is fatal on failure, so a failed run never
//! touches the previous output file. Revalidation is best-effort.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use briefing_core::{BriefingError, DailyBriefing};
use briefing_llm::{CategorizationGateway, GeminiClient, LlmClient, PromptBuilder};
use briefing_news::{normalize_batches, ArticleLookup, FeedSource, RssClient};

use crate::config::PipelineConfig;
use crate::publisher::{write_briefing, RevalidationClient, RevalidationOutcome};
use crate::reconciler::Reconciler;

pub struct BriefingPipeline<F, C> {
    feeds: F,
    gateway: CategorizationGateway<C>,
    reconciler: Reconciler,
    prompt_path: PathBuf,
    output_path: PathBuf,
    revalidation: Option<RevalidationClient>,
}

impl BriefingPipeline<RssClient, GeminiClient> {
    /// Wire the production clients from configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        let feeds = RssClient::with_timeout(config.feeds.clone(), config.feed_timeout);
        let client =
            GeminiClient::new(config.gemini_api_key.clone()).with_model(&config.gemini_model);

        let mut pipeline = Self::new(
            feeds,
            CategorizationGateway::with_policy(client, config.retry),
            config.prompt_path.clone(),
            config.output_path.clone(),
        )
        .with_reconciler(Reconciler::with_timezone(config.timezone));

        if let Some(revalidation) = &config.revalidation {
            pipeline = pipeline.with_revalidation(RevalidationClient::new(revalidation.clone()));
        }
        pipeline
    }
}

impl<F: FeedSource, C: LlmClient> BriefingPipeline<F, C> {
    pub fn new(
        feeds: F,
        gateway: CategorizationGateway<C>,
        prompt_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            feeds,
            gateway,
            reconciler: Reconciler::default(),
            prompt_path: prompt_path.into(),
            output_path: output_path.into(),
            revalidation: None,
        }
    }

    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    pub fn with_revalidation(mut self, client: RevalidationClient) -> Self {
        self.revalidation = Some(client);
        self
    }

    /// Run the whole pipeline once and return the published briefing
    #[instrument(skip(self), fields(output = %self.output_path.display()))]
    pub async fn run(&self) -> Result<DailyBriefing, BriefingError> {
        let batches = self.feeds.fetch_all().await?;
        for batch in &batches {
            info!("{}: {} items", batch.source, batch.items.len());
        }

        let articles = normalize_batches(&batches);
        let lookup: ArticleLookup = articles.iter().collect();
        info!(
            "Normalized {} articles ({} unique ids)",
            articles.len(),
            lookup.len()
        );

        let prompt = PromptBuilder::from_file(&self.prompt_path)
            .await?
            .build(&articles);
        debug!("Prompt is {} characters", prompt.len());

        let categorization = self.gateway.categorize(&prompt).await?;
        let last_updated_at = Utc::now();

        let categories = self.reconciler.reconcile(&categorization, &lookup);
        let briefing = DailyBriefing::new(last_updated_at, categories);

        write_briefing(&self.output_path, &briefing).await?;
        info!(
            "Published {} categories ({} sources) to {}",
            briefing.news_categories.len(),
            briefing.source_count(),
            self.output_path.display()
        );

        match self.revalidate().await {
            RevalidationOutcome::Skipped => debug!("Revalidation not configured"),
            RevalidationOutcome::Revalidated => info!("Revalidation succeeded"),
            RevalidationOutcome::Failed(reason) => warn!("Revalidation failed: {}", reason),
        }

        Ok(briefing)
    }

    async fn revalidate(&self) -> RevalidationOutcome {
        match &self.revalidation {
            Some(client) => client.revalidate().await,
            None => RevalidationOutcome::Skipped,
        }
    }
}
