//! Daily briefing runner
//!
//! Fetches the configured feeds, has the model group them, and publishes the
//! result. Meant to be invoked by a scheduler; exits non-zero on any fatal
//! failure.

use briefing_core::DailyBriefing;
use briefing_services::{BriefingPipeline, PipelineConfig};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,briefing_cli=debug")),
        )
        .init();

    let config = PipelineConfig::from_env()?;
    info!(
        "Starting briefing run: {} feeds, model {}, max {} attempts",
        config.feeds.len(),
        config.gemini_model,
        config.retry.max_attempts
    );

    let pipeline = BriefingPipeline::from_config(&config);
    match pipeline.run().await {
        Ok(briefing) => {
            report(&briefing);
            Ok(())
        }
        Err(e) => {
            error!("Briefing run failed: {}", e);
            Err(e.into())
        }
    }
}

fn report(briefing: &DailyBriefing) {
    info!(
        "Briefing updated at {}: {} categories, {} sources",
        briefing.last_updated_at.to_rfc3339(),
        briefing.news_categories.len(),
        briefing.source_count()
    );
}
