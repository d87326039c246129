//! HTTP client for the generative-language completion endpoint.

use super::error::{AiError, AiResult};
use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_MODEL};
use crate::settings::AppSettings;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Anything that turns a prompt into model text
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> AiResult<String>;
}

/// Sampling parameters sent with every request
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 2048,
            top_p: 0.95,
            top_k: 40,
        }
    }
}

/// Connection settings for [`GeminiClient`]
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub generation: GenerationConfig,
    /// No timeout when `None`
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            generation: GenerationConfig::default(),
            timeout: None,
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            api_key: settings.api_key.clone().unwrap_or_default(),
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
            generation: GenerationConfig {
                temperature: settings.temperature,
                max_output_tokens: settings.max_output_tokens,
                top_p: settings.top_p,
                top_k: settings.top_k,
            },
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Client for `{base_url}/models/{model}:generateContent`
#[derive(Clone)]
pub struct GeminiClient {
    config: ClientConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: ClientConfig) -> AiResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| AiError::Validation {
            message: format!("Failed to create HTTP client: {}", e),
        })?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Map a non-success response to an [`AiError`].
    async fn error_for(response: reqwest::Response) -> AiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        match status {
            401 | 403 => AiError::InvalidApiKey,
            400 if body.contains("API_KEY_INVALID") || body.contains("API key not valid") => {
                AiError::InvalidApiKey
            }
            429 => AiError::QuotaExceeded,
            400 => AiError::Validation { message: body },
            status if status >= 500 => AiError::Overloaded {
                status,
                message: body,
            },
            status => AiError::Unknown {
                message: format!("HTTP {}: {}", status, body),
            },
        }
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn complete(&self, prompt: &str) -> AiResult<String> {
        if self.config.api_key.trim().is_empty() {
            return Err(AiError::Validation {
                message: "API key is not configured".to_string(),
            });
        }

        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: self.config.generation,
        };

        tracing::debug!(model = %self.config.model, prompt_len = prompt.len(), "Sending completion request");

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Network {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let err = Self::error_for(response).await;
            tracing::error!(error = %err, "Completion request failed");
            return Err(err);
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| AiError::Unknown {
            message: format!("Malformed response: {}", e),
        })?;

        match parsed.into_text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(AiError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: "hi" }],
            }],
            generation_config: GenerationConfig::default(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(value["generationConfig"]["topK"], 40);
    }

    #[test]
    fn test_response_text_extraction() {
        let parsed: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "answer"}, {"text": "ignored"}]}}]
        }))
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("answer"));

        let parsed: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(parsed.into_text(), None);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GeminiClient::new(
            ClientConfig::new("k").with_base_url("http://host/v1/").with_model("m"),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "http://host/v1/models/m:generateContent");
    }

    #[tokio::test]
    async fn test_missing_key_is_validation_error() {
        let client = GeminiClient::new(ClientConfig::new("  ")).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, AiError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let client = GeminiClient::new(ClientConfig::new("k").with_base_url("http://localhost:1")).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
