use super::{required_text, send_json};
use crate::error::ProviderError;
use crate::types::{Capability, SummarizeRequest};
use crate::ProviderClient;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const DEFAULT_MODEL: &str = "llama2";

/// Local Ollama server. Enabled by flag rather than credential.
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl ProviderClient for OllamaClient {
    fn name(&self) -> &str {
        "Ollama"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Summarize]
    }

    async fn complete(&self, request: &SummarizeRequest) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.model,
            "prompt": request.prompt,
            "stream": false,
            "options": {
                "num_predict": request.max_tokens,
                "temperature": request.temperature,
                "top_p": 0.9,
            },
        });
        let req = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body);
        let value = send_json("Ollama", req, self.timeout).await?;
        required_text("Ollama", &value, "/response")
    }
}
