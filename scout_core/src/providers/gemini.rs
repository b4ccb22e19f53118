use super::{required_text, send_json};
use crate::error::ProviderError;
use crate::types::{Capability, SummarizeRequest};
use crate::ProviderClient;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.model)
    }

    fn body(request: &SummarizeRequest) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": request.prompt }] }],
            "generationConfig": {
                "maxOutputTokens": request.max_tokens,
                "temperature": request.temperature,
                "topP": 0.8,
                "topK": 40,
            },
        })
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Summarize]
    }

    async fn complete(&self, request: &SummarizeRequest) -> Result<String, ProviderError> {
        let req = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::body(request));
        let value = send_json("Gemini", req, self.timeout).await?;

        // A blocked prompt comes back 200 with no candidates
        if let Some(reason) = value
            .pointer("/promptFeedback/blockReason")
            .and_then(|v| v.as_str())
        {
            return Err(ProviderError::EmptyResponse(format!(
                "Gemini (blocked: {})",
                reason
            )));
        }
        required_text("Gemini", &value, "/candidates/0/content/parts/0/text")
    }
}
