//! Output persistence and downstream cache revalidation

use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::Client;
use tracing::{debug, instrument};

use briefing_core::{BriefingError, DailyBriefing};

use crate::config::RevalidationConfig;

/// Write the briefing as pretty JSON, replacing any previous file
///
/// The JSON goes to a sibling temp file first and is renamed over the
/// target, so a failed write leaves the previous briefing in place.
pub async fn write_briefing(path: &Path, briefing: &DailyBriefing) -> Result<(), BriefingError> {
    let json = serde_json::to_string_pretty(briefing)
        .map_err(|e| BriefingError::internal(format!("Failed to serialize briefing: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            BriefingError::persistence(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    let staging = staging_path(path)?;
    let written = match tokio::fs::write(&staging, json).await {
        Ok(()) => tokio::fs::rename(&staging, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        // Best effort; the staging file may not exist
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(BriefingError::persistence(format!(
            "Failed to write {}: {}",
            path.display(),
            e
        )));
    }

    debug!("Wrote {} categories to {}", briefing.news_categories.len(), path.display());
    Ok(())
}

/// Hidden sibling of the target, e.g. `public/.article-data.json.tmp`
fn staging_path(path: &Path) -> Result<PathBuf, BriefingError> {
    let name = path.file_name().ok_or_else(|| {
        BriefingError::persistence(format!("{} has no file name", path.display()))
    })?;
    Ok(path.with_file_name(format!(".{}.tmp", name.to_string_lossy())))
}

/// Result of the best-effort revalidation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevalidationOutcome {
    /// Not configured
    Skipped,
    Revalidated,
    Failed(String),
}

pub struct RevalidationClient {
    client: Client,
    config: RevalidationConfig,
}

impl RevalidationClient {
    pub fn new(config: RevalidationConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// URL without the secret, for logging
    pub fn endpoint(&self) -> String {
        format!("{}/api/revalidate", self.config.host)
    }

    /// Ask the site to drop its cached page; never fails the run
    #[instrument(skip(self), fields(endpoint = %self.endpoint()))]
    pub async fn revalidate(&self) -> RevalidationOutcome {
        let response = self
            .client
            .get(self.endpoint())
            .query(&[("secret", self.config.secret.as_str())])
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => RevalidationOutcome::Revalidated,
            Ok(response) => {
                RevalidationOutcome::Failed(format!("HTTP {}", response.status().as_u16()))
            }
            Err(e) => RevalidationOutcome::Failed(e.without_url().to_string()),
        }
    }
}

impl fmt::Debug for RevalidationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevalidationClient")
            .field("config", &self.config)
            .finish()
    }
}
