use super::{required_text, send_json, truncate_chars};
use crate::error::ProviderError;
use crate::types::{Capability, SummarizeRequest};
use crate::ProviderClient;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const MODEL_URL: &str = "https://api-inference.huggingface.co/models/facebook/bart-large-cnn";

/// BART accepts roughly 1024 tokens of input
const MAX_INPUT_CHARS: usize = 3000;

/// Hosted summarization model. Takes raw text, not a chat prompt.
pub struct HuggingFaceClient {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl HuggingFaceClient {
    pub fn new(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ProviderClient for HuggingFaceClient {
    fn name(&self) -> &str {
        "HuggingFace"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Summarize]
    }

    async fn complete(&self, request: &SummarizeRequest) -> Result<String, ProviderError> {
        let body = json!({
            "inputs": truncate_chars(&request.text, MAX_INPUT_CHARS),
            "parameters": {
                "max_length": request.max_tokens,
                "min_length": 100u32.min(request.max_tokens),
                "do_sample": false,
            },
        });
        let req = self
            .client
            .post(MODEL_URL)
            .bearer_auth(&self.api_key)
            .json(&body);
        let value = send_json("HuggingFace", req, self.timeout).await?;
        required_text("HuggingFace", &value, "/0/summary_text")
    }
}
