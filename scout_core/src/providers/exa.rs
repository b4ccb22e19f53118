use super::{clean_text, send_json, str_field, truncate_chars};
use crate::error::ProviderError;
use crate::types::{Capability, NormalizedRequest, SearchHit};
use crate::ProviderClient;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const SEARCH_URL: &str = "https://api.exa.ai/search";

const SNIPPET_CHARS: usize = 500;

/// Exa neural search.
pub struct ExaClient {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl ExaClient {
    pub fn new(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            timeout,
        }
    }

    fn build_headers(&self) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| ProviderError::Unavailable(format!("Exa: {}", e)))?,
        );
        Ok(headers)
    }

    fn body(request: &NormalizedRequest) -> Value {
        let mut body = json!({
            "query": request.query,
            "type": "auto",
            "numResults": request.max_results,
            "contents": {
                "text": { "maxCharacters": 2000 },
                "summary": true,
            },
        });
        let days = match request.param_str("time_filter") {
            Some("day") => Some(1),
            Some("week") => Some(7),
            Some("month") => Some(30),
            Some("year") => Some(365),
            _ => None,
        };
        if let Some(days) = days {
            let since = Utc::now() - ChronoDuration::days(days);
            body["startPublishedDate"] = json!(since.format("%Y-%m-%dT00:00:00.000Z").to_string());
        }
        body
    }
}

/// Map an Exa response into hits. Prefers `summary`, then `text`.
pub(crate) fn parse_results(value: &Value) -> Vec<SearchHit> {
    value
        .get("results")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let url = str_field(item, "url");
                    if url.is_empty() {
                        return None;
                    }
                    let snippet = [str_field(item, "summary"), str_field(item, "text")]
                        .into_iter()
                        .find(|s| !s.trim().is_empty())
                        .unwrap_or("");
                    let mut extra = serde_json::Map::new();
                    for key in ["publishedDate", "author"] {
                        if let Some(v) = item.get(key).filter(|v| !v.is_null()) {
                            extra.insert(key.to_string(), v.clone());
                        }
                    }
                    let hit = SearchHit::new(clean_text(str_field(item, "title")), url, "Exa")
                        .with_snippet(truncate_chars(&clean_text(snippet), SNIPPET_CHARS))
                        .with_score(item.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0));
                    Some(if extra.is_empty() {
                        hit
                    } else {
                        hit.with_extra(Value::Object(extra))
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ProviderClient for ExaClient {
    fn name(&self) -> &str {
        "Exa"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Search]
    }

    async fn fetch_hits(
        &self,
        request: &NormalizedRequest,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        let req = self
            .client
            .post(SEARCH_URL)
            .headers(self.build_headers()?)
            .json(&Self::body(request));
        let value = send_json("Exa", req, self.timeout).await?;
        Ok(parse_results(&value))
    }
}
