//! # Gemini Backend Module
//!
//! Request types for the `generateContent` endpoint, the [`GenerativeBackend`]
//! seam the extractor and generator talk to, and [`GeminiClient`], the HTTP
//! implementation of that seam.
//!
//! Failures are classified here, where the HTTP status and the structured
//! Google error body are still available: HTTP 503 or an `UNAVAILABLE` error
//! status is a transient overload, matching "overloaded" in the message is
//! only a fallback. Everything else is a plain service error.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::config::AppConfig;
use crate::errors::{RecipeError, Result};
use crate::image_payload::ImagePayload;

/// MIME type requested for every structured response
pub const JSON_MIME_TYPE: &str = "application/json";

/// One `generateContent` call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Model identifier; part of the URL, not the body
    #[serde(skip)]
    pub model: String,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    /// Single-turn request made of `parts`, answered as JSON matching `schema`
    pub fn json(model: impl Into<String>, parts: Vec<Part>, schema: Value) -> Self {
        Self {
            model: model.into(),
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE.to_string(),
                response_schema: schema,
                thinking_config: None,
            },
        }
    }

    /// Attach a reasoning budget hint; a budget of 0 leaves the hint out
    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.generation_config.thinking_config = (budget > 0).then_some(ThinkingConfig {
            thinking_budget: budget,
        });
        self
    }

    /// Every text part of the request, in order
    pub fn text_parts(&self) -> Vec<&str> {
        self.contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect()
    }

    /// Number of inline image parts
    pub fn image_count(&self) -> usize {
        self.contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter(|p| matches!(p, Part::InlineData { .. }))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

/// A request part: either text or an inline image
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn image(payload: &ImagePayload) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: payload.mime_type.clone(),
                data: payload.data.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub thinking_budget: u32,
}

/// The capability the extractor and generator depend on: given a request,
/// return the model's raw text.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Issue exactly one request. Implementations must report overload as
    /// [`RecipeError::TransientServiceUnavailable`].
    async fn generate(&self, api_key: &str, request: &GenerateRequest) -> Result<String>;
}

/// HTTP client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
}

impl GeminiClient {
    /// Create a client from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RecipeError::ServiceError {
                status: 0,
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, api_key: &str, request: &GenerateRequest) -> Result<String> {
        let endpoint = self.endpoint_for_model(&request.model);
        debug!(model = %request.model, images = request.image_count(), "Calling generateContent");

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "generateContent request failed");
                RecipeError::ServiceError {
                    status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                    message: e.to_string(),
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| RecipeError::ServiceError {
            status,
            message: format!("failed to read response body: {e}"),
        })?;

        if !(200..300).contains(&status) {
            return Err(classify_failure(status, &body));
        }

        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| RecipeError::MalformedResponse(format!("response is not JSON: {e}")))?;
        response_text(&payload)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Turn a non-success HTTP answer into a [`RecipeError`]
pub fn classify_failure(status: u16, body: &str) -> RecipeError {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let message = if envelope.error.message.is_empty() {
        body.trim().to_string()
    } else {
        envelope.error.message
    };

    let transient = status == 503
        || envelope.error.status == "UNAVAILABLE"
        || message.to_lowercase().contains("overloaded");

    if transient {
        RecipeError::TransientServiceUnavailable { status, message }
    } else {
        RecipeError::ServiceError { status, message }
    }
}

/// Concatenate the text parts of the first candidate
pub fn response_text(payload: &Value) -> Result<String> {
    let candidate = payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first());

    let text = candidate
        .and_then(|c| c.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter(|part| !part.get("thought").and_then(Value::as_bool).unwrap_or(false))
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate
            .and_then(|c| c.get("finishReason"))
            .and_then(Value::as_str)
            .or_else(|| {
                payload
                    .get("promptFeedback")
                    .and_then(|f| f.get("blockReason"))
                    .and_then(Value::as_str)
            })
            .unwrap_or("unknown");
        return Err(RecipeError::MalformedResponse(format!(
            "response contained no text (reason: {reason})"
        )));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_to_wire_shape() {
        let image = ImagePayload::new("image/png", "AAAA");
        let request = GenerateRequest::json(
            "gemini-test",
            vec![Part::image(&image), Part::text("list the food")],
            json!({"type": "OBJECT"}),
        )
        .with_thinking_budget(4000);

        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("model").is_none());
        assert_eq!(
            body["contents"][0]["parts"][0],
            json!({"inlineData": {"mimeType": "image/png", "data": "AAAA"}})
        );
        assert_eq!(body["contents"][0]["parts"][1], json!({"text": "list the food"}));
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["thinkingConfig"]["thinkingBudget"], 4000);
    }

    #[test]
    fn test_zero_thinking_budget_is_omitted() {
        let request =
            GenerateRequest::json("m", vec![Part::text("hi")], json!({})).with_thinking_budget(0);
        let body = serde_json::to_value(&request).unwrap();
        assert!(body["generationConfig"].get("thinkingConfig").is_none());
    }

    #[test]
    fn test_classify_503_as_transient() {
        let body = r#"{"error":{"code":503,"message":"The model is overloaded. Please try again later.","status":"UNAVAILABLE"}}"#;
        assert!(classify_failure(503, body).is_transient());
    }

    #[test]
    fn test_classify_unavailable_status_without_503() {
        let body = r#"{"error":{"code":500,"message":"backend busy","status":"UNAVAILABLE"}}"#;
        assert!(classify_failure(500, body).is_transient());
    }

    #[test]
    fn test_classify_overloaded_message_fallback() {
        assert!(classify_failure(500, "upstream overloaded").is_transient());
    }

    #[test]
    fn test_classify_invalid_key_as_service_error() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(
            classify_failure(400, body),
            RecipeError::ServiceError {
                status: 400,
                message: "API key not valid. Please pass a valid API key.".to_string()
            }
        );
    }

    #[test]
    fn test_classify_quota_as_service_error() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert!(!classify_failure(429, body).is_transient());
    }

    #[test]
    fn test_response_text_skips_thoughts() {
        let payload = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "{\"ingredients\":"},
                    {"text": "[]}"}
                ]},
                "finishReason": "STOP"
            }]
        });
        assert_eq!(response_text(&payload).unwrap(), "{\"ingredients\":[]}");
    }

    #[test]
    fn test_response_text_empty_is_malformed() {
        let payload = json!({"candidates": [{"finishReason": "SAFETY"}]});
        match response_text(&payload) {
            Err(RecipeError::MalformedResponse(msg)) => assert!(msg.contains("SAFETY")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
