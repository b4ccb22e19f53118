use super::{required_text, send_json};
use crate::error::ProviderError;
use crate::types::{Capability, SummarizeRequest};
use crate::ProviderClient;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl AnthropicClient {
    pub fn new(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            timeout,
        }
    }

    fn build_headers(&self) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| ProviderError::Unavailable(format!("Anthropic: {}", e)))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        Ok(headers)
    }
}

#[async_trait]
impl ProviderClient for AnthropicClient {
    fn name(&self) -> &str {
        "Anthropic"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Summarize]
    }

    async fn complete(&self, request: &SummarizeRequest) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": [{ "role": "user", "content": request.prompt }],
        });
        let req = self
            .client
            .post(MESSAGES_URL)
            .headers(self.build_headers()?)
            .json(&body);
        let value = send_json("Anthropic", req, self.timeout).await?;
        required_text("Anthropic", &value, "/content/0/text")
    }
}
