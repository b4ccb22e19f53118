use super::{required_text, send_json};
use crate::error::ProviderError;
use crate::types::{Capability, SummarizeRequest};
use crate::ProviderClient;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const SYSTEM_PROMPT: &str =
    "You are a professional research analyst who creates clear, comprehensive summaries of content.";

/// Client for any endpoint speaking the OpenAI chat-completions shape.
///
/// Used for OpenAI, Perplexity and Together, which differ only in base
/// url, model and display name.
pub struct ChatCompletionsClient {
    client: Client,
    name: &'static str,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl ChatCompletionsClient {
    pub fn openai(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            name: "OpenAI",
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: api_key.into(),
            model: "gpt-3.5-turbo".to_string(),
            timeout,
        }
    }

    pub fn perplexity(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            name: "Perplexity",
            endpoint: "https://api.perplexity.ai/chat/completions".to_string(),
            api_key: api_key.into(),
            model: "sonar".to_string(),
            timeout,
        }
    }

    pub fn together(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            name: "Together",
            endpoint: "https://api.together.xyz/v1/chat/completions".to_string(),
            api_key: api_key.into(),
            model: "meta-llama/Llama-2-7b-chat-hf".to_string(),
            timeout,
        }
    }

    /// Override the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_headers(&self) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| ProviderError::Unavailable(format!("{}: {}", self.name, e)))?,
        );
        Ok(headers)
    }

    fn body(&self, request: &SummarizeRequest) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": request.prompt },
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "stream": false,
        })
    }
}

#[async_trait]
impl ProviderClient for ChatCompletionsClient {
    fn name(&self) -> &str {
        self.name
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Summarize]
    }

    async fn complete(&self, request: &SummarizeRequest) -> Result<String, ProviderError> {
        let req = self
            .client
            .post(&self.endpoint)
            .headers(self.build_headers()?)
            .json(&self.body(request));
        let value = send_json(self.name, req, self.timeout).await?;
        required_text(self.name, &value, "/choices/0/message/content")
    }
}
