//! RSS Feed Client for the briefing
//!
//! Fetches and parses RSS/Atom feeds from the configured news portals.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use briefing_core::RawFeedItem;

use crate::error::NewsError;

/// RSS feed definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RssFeed {
    /// Source label attached to every article from this feed
    pub name: String,
    /// RSS feed URL
    pub url: String,
}

impl RssFeed {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Built-in list of Latvian news portals, in processing order
pub fn get_curated_feeds() -> Vec<RssFeed> {
    vec![
        RssFeed::new("LSM", "https://www.lsm.lv/rss/"),
        RssFeed::new("TVNET", "https://www.tvnet.lv/rss"),
        RssFeed::new("DELFI", "https://www.delfi.lv/rss/index.xml"),
        RssFeed::new("APOLLO", "https://www.apollo.lv/rss"),
        RssFeed::new("JAUNS", "https://jauns.lv/rss"),
    ]
}

/// Raw items fetched from one feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedBatch {
    /// Label of the feed the items came from
    pub source: String,
    pub items: Vec<RawFeedItem>,
}

/// Anything that can produce one batch per configured feed
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch every feed; batches are returned in configured order.
    /// A single failing feed fails the whole call.
    async fn fetch_all(&self) -> Result<Vec<FeedBatch>, NewsError>;
}

/// RSS feed client
pub struct RssClient {
    client: Client,
    feeds: Vec<RssFeed>,
}

impl RssClient {
    /// Create a new RSS client with curated feeds
    pub fn new() -> Self {
        Self::with_feeds(get_curated_feeds())
    }

    /// Create with custom feeds
    pub fn with_feeds(feeds: Vec<RssFeed>) -> Self {
        Self::with_timeout(feeds, Duration::from_secs(30))
    }

    /// Create with custom feeds and HTTP timeout
    pub fn with_timeout(feeds: Vec<RssFeed>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent("DailyBriefing/1.0")
                .build()
                .unwrap_or_else(|_| Client::new()),
            feeds,
        }
    }

    /// Fetch a single RSS feed
    #[instrument(skip(self), fields(source = %feed.name))]
    async fn fetch_feed(&self, feed: &RssFeed) -> Result<FeedBatch, NewsError> {
        let response = self
            .client
            .get(&feed.url)
            .send()
            .await
            .map_err(|e| NewsError::RequestFailed(format!("{}: {}", feed.url, e)))?;

        if !response.status().is_success() {
            return Err(NewsError::ApiError {
                status: response.status().as_u16(),
                message: format!("Failed to fetch {}", feed.url),
            });
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| NewsError::RequestFailed(format!("{}: {}", feed.url, e)))?;

        let items = parse_feed(&content, &feed.url)?;
        debug!("Fetched {} items from {}", items.len(), feed.name);

        Ok(FeedBatch {
            source: feed.name.clone(),
            items,
        })
    }
}

impl Default for RssClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSource for RssClient {
    async fn fetch_all(&self) -> Result<Vec<FeedBatch>, NewsError> {
        let batches = try_join_all(self.feeds.iter().map(|feed| self.fetch_feed(feed))).await?;

        let total: usize = batches.iter().map(|b| b.items.len()).sum();
        info!("Fetched {} raw items from {} feeds", total, batches.len());
        Ok(batches)
    }
}

/// Parse a feed body, trying RSS first and then Atom
pub fn parse_feed(content: &[u8], url: &str) -> Result<Vec<RawFeedItem>, NewsError> {
    if let Ok(channel) = rss::Channel::read_from(content) {
        return Ok(parse_rss_channel(&channel));
    }

    if let Ok(atom_feed) = atom_syndication::Feed::read_from(content) {
        return Ok(parse_atom_feed(&atom_feed));
    }

    Err(NewsError::ParseError(format!("Failed to parse feed: {}", url)))
}

/// Parse RSS channel into raw items
fn parse_rss_channel(channel: &rss::Channel) -> Vec<RawFeedItem> {
    channel
        .items()
        .iter()
        .map(|item| RawFeedItem {
            title: item.title().map(str::to_string),
            content: item
                .description()
                .or_else(|| item.content())
                .map(str::to_string),
            link: item.link().map(str::to_string),
            published_at: item.pub_date().and_then(parse_feed_date),
        })
        .collect()
}

/// Parse Atom feed into raw items
fn parse_atom_feed(atom_feed: &atom_syndication::Feed) -> Vec<RawFeedItem> {
    atom_feed
        .entries()
        .iter()
        .map(|entry| {
            let content = entry
                .content()
                .and_then(|c| c.value())
                .or_else(|| entry.summary().map(|s| s.as_str()))
                .map(str::to_string);

            let published_at = entry
                .published()
                .unwrap_or_else(|| entry.updated())
                .with_timezone(&Utc);

            RawFeedItem {
                title: Some(entry.title().as_str().to_string()),
                content,
                link: entry.links().first().map(|l| l.href().to_string()),
                published_at: Some(published_at),
            }
        })
        .collect()
}

/// Parse an RSS date (RFC 2822, with RFC 3339 as a fallback)
fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}
