//! Pipeline configuration loaded from the environment

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;

use briefing_core::BriefingError;
use briefing_llm::{RetryPolicy, DEFAULT_MODEL};
use briefing_news::{get_curated_feeds, RssFeed};

const DEFAULT_PROMPT_PATH: &str = "./public/prompt.txt";
const DEFAULT_OUTPUT_PATH: &str = "./public/article-data.json";
const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Riga;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_SECS: u64 = 5;
const DEFAULT_FEED_TIMEOUT_SECS: u64 = 30;

/// Downstream cache invalidation target
#[derive(Clone, PartialEq, Eq)]
pub struct RevalidationConfig {
    pub host: String,
    pub secret: String,
}

impl fmt::Debug for RevalidationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevalidationConfig")
            .field("host", &self.host)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Everything a briefing run needs to know
#[derive(Clone)]
pub struct PipelineConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub prompt_path: PathBuf,
    pub output_path: PathBuf,
    pub retry: RetryPolicy,
    pub timezone: Tz,
    pub feeds: Vec<RssFeed>,
    pub feed_timeout: Duration,
    /// `None` disables the revalidation call
    pub revalidation: Option<RevalidationConfig>,
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("gemini_api_key", &"<redacted>")
            .field("gemini_model", &self.gemini_model)
            .field("prompt_path", &self.prompt_path)
            .field("output_path", &self.output_path)
            .field("retry", &self.retry)
            .field("timezone", &self.timezone)
            .field("feeds", &self.feeds)
            .field("feed_timeout", &self.feed_timeout)
            .field("revalidation", &self.revalidation)
            .finish()
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    ///
    /// Expects:
    /// - GEMINI_API_KEY: model API key (required)
    /// - GEMINI_MODEL, BRIEFING_PROMPT_PATH, BRIEFING_OUTPUT_PATH,
    ///   LLM_MAX_RETRIES, LLM_RETRY_DELAY_SECS, BRIEFING_TIMEZONE,
    ///   BRIEFING_FEEDS, FEED_TIMEOUT_SECS: optional overrides
    /// - REVALIDATE_HOST + MY_REVALIDATE_SECRET: both set enables revalidation
    pub fn from_env() -> Result<Self, BriefingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BriefingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key =
            get("GEMINI_API_KEY").ok_or_else(|| BriefingError::config("GEMINI_API_KEY not set"))?;

        let max_attempts: u32 =
            parse_or(get("LLM_MAX_RETRIES"), "LLM_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;
        if max_attempts == 0 {
            return Err(BriefingError::config("LLM_MAX_RETRIES must be at least 1"));
        }
        let delay_secs: u64 = parse_or(
            get("LLM_RETRY_DELAY_SECS"),
            "LLM_RETRY_DELAY_SECS",
            DEFAULT_RETRY_DELAY_SECS,
        )?;
        let timeout_secs: u64 = parse_or(
            get("FEED_TIMEOUT_SECS"),
            "FEED_TIMEOUT_SECS",
            DEFAULT_FEED_TIMEOUT_SECS,
        )?;

        let timezone = match get("BRIEFING_TIMEZONE") {
            Some(name) => name.trim().parse::<Tz>().map_err(|e| {
                BriefingError::config(format!("Invalid BRIEFING_TIMEZONE '{}': {}", name, e))
            })?,
            None => DEFAULT_TIMEZONE,
        };

        let feeds = match get("BRIEFING_FEEDS") {
            Some(json) => serde_json::from_str::<Vec<RssFeed>>(&json).map_err(|e| {
                BriefingError::config(format!("Invalid JSON in BRIEFING_FEEDS: {}", e))
            })?,
            None => get_curated_feeds(),
        };
        if feeds.is_empty() {
            return Err(BriefingError::config("BRIEFING_FEEDS cannot be empty"));
        }

        let revalidation = match (get("REVALIDATE_HOST"), get("MY_REVALIDATE_SECRET")) {
            (Some(host), Some(secret)) => Some(RevalidationConfig {
                host: host.trim_end_matches('/').to_string(),
                secret,
            }),
            _ => None,
        };

        Ok(Self {
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            prompt_path: get("BRIEFING_PROMPT_PATH")
                .unwrap_or_else(|| DEFAULT_PROMPT_PATH.to_string())
                .into(),
            output_path: get("BRIEFING_OUTPUT_PATH")
                .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string())
                .into(),
            retry: RetryPolicy::new(max_attempts, Duration::from_secs(delay_secs)),
            timezone,
            feeds,
            feed_timeout: Duration::from_secs(timeout_secs),
            revalidation,
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T, BriefingError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| BriefingError::config(format!("Invalid {} '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<PipelineConfig, BriefingError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PipelineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("GEMINI_API_KEY", "secret-key")]).unwrap();

        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert_eq!(config.prompt_path, PathBuf::from("./public/prompt.txt"));
        assert_eq!(config.output_path, PathBuf::from("./public/article-data.json"));
        assert_eq!(config.retry, RetryPolicy::new(3, Duration::from_secs(5)));
        assert_eq!(config.timezone, chrono_tz::Europe::Riga);
        assert_eq!(config.feeds.len(), 5);
        assert_eq!(config.feed_timeout, Duration::from_secs(30));
        assert!(config.revalidation.is_none());
        assert!(!format!("{:?}", config).contains("secret-key"));
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, BriefingError::Config(_)));

        let err = load(&[("GEMINI_API_KEY", "  ")]).unwrap_err();
        assert!(matches!(err, BriefingError::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("LLM_MAX_RETRIES", "5"),
            ("LLM_RETRY_DELAY_SECS", "0"),
            ("BRIEFING_TIMEZONE", "UTC"),
            ("BRIEFING_FEEDS", r#"[{"name": "LSM", "url": "https://www.lsm.lv/rss/"}]"#),
            ("REVALIDATE_HOST", "https://example.lv/"),
            ("MY_REVALIDATE_SECRET", "s3cret"),
        ])
        .unwrap();

        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.delay, Duration::ZERO);
        assert_eq!(config.timezone, chrono_tz::UTC);
        assert_eq!(config.feeds, vec![RssFeed::new("LSM", "https://www.lsm.lv/rss/")]);

        let revalidation = config.revalidation.unwrap();
        assert_eq!(revalidation.host, "https://example.lv");
        assert_eq!(revalidation.secret, "s3cret");
    }

    #[test]
    fn test_revalidation_needs_both_values() {
        let config = load(&[
            ("GEMINI_API_KEY", "k"),
            ("REVALIDATE_HOST", "https://example.lv"),
        ])
        .unwrap();
        assert!(config.revalidation.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases: &[(&str, &str)] = &[
            ("LLM_MAX_RETRIES", "0"),
            ("LLM_MAX_RETRIES", "three"),
            ("LLM_RETRY_DELAY_SECS", "-1"),
            ("FEED_TIMEOUT_SECS", "soon"),
            ("BRIEFING_TIMEZONE", "Mars/Olympus"),
            ("BRIEFING_FEEDS", "[]"),
            ("BRIEFING_FEEDS", "not json"),
        ];

        for &(key, value) in cases {
            let err = load(&[("GEMINI_API_KEY", "k"), (key, value)]).unwrap_err();
            assert!(
                matches!(err, BriefingError::Config(_)),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }
}
