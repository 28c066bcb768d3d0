//! News ingestion for the daily briefing
//!
//! This crate provides:
//! - RSS/Atom fetching from the configured portals
//! - Normalization of feed items into content-addressed articles
//! - The run-scoped article lookup table

pub mod error;
pub mod normalizer;
pub mod rss_client;

pub use error::NewsError;
pub use normalizer::{article_id, clean_string, normalize, normalize_batches, ArticleLookup};
pub use rss_client::{get_curated_feeds, parse_feed, FeedBatch, FeedSource, RssClient, RssFeed};
