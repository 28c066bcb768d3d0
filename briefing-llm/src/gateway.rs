//! Categorization gateway with bounded retry
//!
//! Every attempt ends in one of three ways:
//! - text that parses as a categorization: done
//! - an authentication failure: give up immediately
//! - anything else (empty text, bad JSON, request error): wait, resend the
//!   same prompt, and give up once the attempt budget is spent

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use briefing_core::CategorizationResult;

use crate::error::{GatewayError, LlmError};

/// A text-in, text-out model endpoint
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Model identifier, for logging
    fn model(&self) -> &str;

    /// Send one prompt and return the raw response text
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Attempt budget and fixed inter-attempt delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5))
    }
}

pub struct CategorizationGateway<C> {
    client: C,
    policy: RetryPolicy,
}

impl<C: LlmClient> CategorizationGateway<C> {
    pub fn new(client: C) -> Self {
        Self::with_policy(client, RetryPolicy::default())
    }

    pub fn with_policy(client: C, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Categorize the prompt, retrying transient failures
    #[instrument(skip(self, prompt), fields(model = %self.client.model()))]
    pub async fn categorize(&self, prompt: &str) -> Result<CategorizationResult, GatewayError> {
        let mut attempt = 1;
        loop {
            info!("Sending prompt to model (attempt {}/{})", attempt, self.policy.max_attempts);

            let error = match self.attempt(prompt).await {
                Ok(result) => {
                    info!("Parsed {} categories from model response", result.len());
                    return Ok(result);
                }
                Err(error) => error,
            };

            if !error.is_retryable() {
                warn!("Attempt {} failed with a credential error, not retrying", attempt);
                return Err(GatewayError::Authentication {
                    attempt,
                    message: error.to_string(),
                });
            }

            if attempt >= self.policy.max_attempts {
                warn!("Attempt {} failed: {}. No attempts left", attempt, error);
                return Err(GatewayError::Exhausted {
                    attempts: attempt,
                    last: error,
                });
            }

            warn!(
                "Attempt {} failed: {}. Retrying in {:?}",
                attempt, error, self.policy.delay
            );
            tokio::time::sleep(self.policy.delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<CategorizationResult, LlmError> {
        let text = self.client.generate(prompt).await?;
        parse_categorization(&text)
    }
}

/// Parse model text into a categorization
pub fn parse_categorization(text: &str) -> Result<CategorizationResult, LlmError> {
    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    serde_json::from_str(strip_code_fence(text)).map_err(|e| LlmError::malformed(e.to_string()))
}

/// Remove a surrounding markdown code fence, if any
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") up to the end of the opening fence line
    let body = rest.strip_prefix("json").unwrap_or(rest);
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    const VALID: &str =
        r#"[{"category_name": "Test", "articles": [{"headline": "H", "source_ids": ["a"]}]}]"#;

    /// Replays a fixed script of responses, repeating the last one
    struct ScriptedClient {
        responses: Mutex<VecDeque<Result<String, LlmError>>>,
        calls: AtomicU32,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<String, LlmError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                responses.pop_front().unwrap()
            } else {
                responses.front().cloned().unwrap()
            }
        }
    }

    fn gateway(responses: Vec<Result<String, LlmError>>) -> CategorizationGateway<ScriptedClient> {
        CategorizationGateway::with_policy(
            ScriptedClient::new(responses),
            RetryPolicy::new(3, Duration::ZERO),
        )
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("  ```json [1]```  "), "[1]");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("[1]"), "[1]");
        assert_eq!(strip_code_fence("```json\n[1]"), "[1]");
    }

    #[test]
    fn test_parse_categorization_classifies_failures() {
        assert_eq!(parse_categorization("   "), Err(LlmError::EmptyResponse));
        assert!(matches!(
            parse_categorization("Sorry, I cannot help with that."),
            Err(LlmError::MalformedJson(_))
        ));
        assert!(matches!(
            parse_categorization(r#"[{"articles": []}]"#),
            Err(LlmError::MalformedJson(_))
        ));

        let parsed = parse_categorization(&format!("```json\n{}\n```", VALID)).unwrap();
        assert_eq!(parsed[0].category_name, "Test");
        assert_eq!(parsed[0].articles[0].source_ids, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_succeeds_first_try() {
        let gateway = gateway(vec![Ok(VALID.to_string())]);
        let result = gateway.categorize("prompt").await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(gateway.client().calls(), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let gateway = gateway(vec![
            Ok(String::new()),
            Err(LlmError::request("503 overloaded")),
            Ok(VALID.to_string()),
        ]);
        let result = gateway.categorize("prompt").await.unwrap();
        assert_eq!(result[0].articles[0].headline, "H");
        assert_eq!(gateway.client().calls(), 3);
    }

    #[tokio::test]
    async fn test_exhausts_after_max_attempts() {
        let gateway = gateway(vec![Ok("not json at all".to_string())]);
        let err = gateway.categorize("prompt").await.unwrap_err();

        assert_eq!(gateway.client().calls(), 3);
        assert_eq!(err.attempts(), 3);
        assert!(matches!(
            err,
            GatewayError::Exhausted {
                last: LlmError::MalformedJson(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_authentication_fails_fast() {
        let gateway = gateway(vec![
            Err(LlmError::authentication("API key not valid")),
            Ok(VALID.to_string()),
        ]);
        let err = gateway.categorize("prompt").await.unwrap_err();

        assert_eq!(gateway.client().calls(), 1);
        assert!(matches!(err, GatewayError::Authentication { attempt: 1, .. }));
    }

    #[tokio::test]
    async fn test_authentication_after_transient_failure() {
        let gateway = gateway(vec![
            Err(LlmError::request("timeout")),
            Err(LlmError::authentication("key revoked")),
        ]);
        let err = gateway.categorize("prompt").await.unwrap_err();

        assert_eq!(gateway.client().calls(), 2);
        assert_eq!(err.attempts(), 2);
    }

    #[test]
    fn test_policy_never_allows_zero_attempts() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
        assert_eq!(RetryPolicy::default().delay, Duration::from_secs(5));
    }
}
