// src/llm/client.rs
use crate::llm::models::{ChatRequest, ChatResponse, CompletionRequest};
use crate::llm::CompletionService;
use crate::utils::error::LlmError;
use async_trait::async_trait;
use reqwest::header;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Chat-completions client for OpenAI and compatible endpoints.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_options(api_key, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Builds a client against `base_url` (Azure, proxies, local servers).
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("API key is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Reads `OPENAI_API_KEY` and, if set, `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmError::Config("OPENAI_API_KEY not set".to_string()))?;
        let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_options(api_key, base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::info!("Requesting structured completion from {} (model {})", url, request.model);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&ChatRequest::from(request))
            .send()
            .await?; // Propagates reqwest::Error as LlmError::Network

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("HTTP error status: {} from {}", status, url);
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("Received 429 Too Many Requests - check rate limits and quota.");
            }
            return Err(LlmError::Http { status, body });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        tracing::debug!("Received {} bytes of structured content", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_api_key() {
        assert!(matches!(OpenAiClient::new("  "), Err(LlmError::Config(_))));
    }

    #[test]
    fn normalizes_base_url() {
        let client =
            OpenAiClient::with_options("sk-test", "http://localhost:8080/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn unreachable_endpoint_is_a_network_error() {
        let client =
            OpenAiClient::with_options("sk-test", "http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let request = CompletionRequest {
            model: DEFAULT_MODEL.into(),
            system: "s".into(),
            user: "u".into(),
            schema: serde_json::json!({}),
            schema_name: "Test".into(),
            temperature: 0.1,
        };
        let result = tokio_test::block_on(client.complete(&request));
        assert!(matches!(result, Err(LlmError::Network(_))), "got {:?}", result);
    }
}
