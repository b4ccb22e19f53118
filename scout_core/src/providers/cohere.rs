use super::{required_text, send_json, truncate_chars};
use crate::error::ProviderError;
use crate::types::{Capability, SummarizeRequest};
use crate::ProviderClient;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const SUMMARIZE_URL: &str = "https://api.cohere.ai/v1/summarize";

/// The summarize endpoint rejects inputs over 100k characters
const MAX_INPUT_CHARS: usize = 100_000;

pub struct CohereClient {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl CohereClient {
    pub fn new(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ProviderClient for CohereClient {
    fn name(&self) -> &str {
        "Cohere"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Summarize]
    }

    async fn complete(&self, request: &SummarizeRequest) -> Result<String, ProviderError> {
        let length = if request.max_tokens >= 1000 {
            "long"
        } else {
            "medium"
        };
        let body = json!({
            "text": truncate_chars(&request.text, MAX_INPUT_CHARS),
            "length": length,
            "format": "paragraph",
            "model": "summarize-xlarge",
            "additional_command": format!(
                "Focus on key insights and important findings about {}.",
                request.query
            ),
            "temperature": request.temperature,
        });
        let req = self
            .client
            .post(SUMMARIZE_URL)
            .bearer_auth(&self.api_key)
            .json(&body);
        let value = send_json("Cohere", req, self.timeout).await?;
        required_text("Cohere", &value, "/summary")
    }
}
