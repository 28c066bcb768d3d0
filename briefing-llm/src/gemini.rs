//! Google Gemini REST client

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::LlmError;
use crate::gateway::LlmClient;

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::request(format!("Undecodable response envelope: {}", e)))?;

        let text = response_text(body);
        debug!("Gemini returned {} characters", text.len());
        Ok(text)
    }
}

/// Concatenate the text parts of the first candidate
fn response_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Map a non-success response onto a failure category
pub fn classify_error(status: StatusCode, body: &str) -> LlmError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return LlmError::authentication(format!("HTTP {}", status.as_u16()));
    }

    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return LlmError::request(format!("HTTP {}: {}", status.as_u16(), body));
    };
    let error = envelope.error;

    let bad_status = matches!(
        error.status.as_deref(),
        Some("UNAUTHENTICATED") | Some("PERMISSION_DENIED")
    );
    let bad_key = error
        .details
        .iter()
        .any(|d| d.reason.as_deref() == Some("API_KEY_INVALID"));

    if bad_status || bad_key {
        LlmError::authentication(error.message)
    } else {
        LlmError::request(format!("HTTP {}: {}", status.as_u16(), error.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_body_is_authentication() {
        let body = r#"{
          "error": {
            "code": 400,
            "message": "API key not valid. Please pass a valid API key.",
            "status": "INVALID_ARGUMENT",
            "details": [
              {
                "@type": "type.googleapis.com/google.rpc.ErrorInfo",
                "reason": "API_KEY_INVALID",
                "domain": "googleapis.com"
              }
            ]
          }
        }"#;
        let err = classify_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, LlmError::Authentication(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_unauthorized_status_is_authentication() {
        let err = classify_error(StatusCode::FORBIDDEN, "");
        assert!(matches!(err, LlmError::Authentication(_)));
    }

    #[test]
    fn test_other_errors_are_retryable_requests() {
        let overloaded = r#"{
          "error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}
        }"#;
        let err = classify_error(StatusCode::SERVICE_UNAVAILABLE, overloaded);
        assert!(matches!(err, LlmError::Request(_)));
        assert!(err.is_retryable());

        let err = classify_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, LlmError::Request(_)));
    }

    #[test]
    fn test_response_text_joins_first_candidate_parts() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [
                {"content": {
                    "parts": [{"text": "```json\n[]"}, {"text": "\n```"}],
                    "role": "model"
                }},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(response_text(body), "```json\n[]\n```");

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(response_text(empty), "");
    }

    #[test]
    fn test_endpoint_uses_model() {
        let client = GeminiClient::new("key")
            .with_model("gemini-test")
            .with_base_url("http://localhost:9999/v1beta/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-test:generateContent"
        );
        assert!(format!("{:?}", client).contains("<redacted>"));
    }
}
