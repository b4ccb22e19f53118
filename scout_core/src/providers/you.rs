use super::{clean_text, send_json, str_field};
use crate::error::ProviderError;
use crate::types::{Capability, NormalizedRequest, SearchHit};
use crate::ProviderClient;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const SEARCH_URL: &str = "https://api.ydc-index.io/search";

/// You.com web index.
pub struct YouClient {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl YouClient {
    pub fn new(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            timeout,
        }
    }
}

/// Map a You.com response into hits.
///
/// Snippet is the description, or the first snippet when there is none.
pub(crate) fn parse_results(value: &Value) -> Vec<SearchHit> {
    let items = value
        .get("hits")
        .or_else(|| value.get("web_results"))
        .and_then(|v| v.as_array());

    items
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let url = str_field(item, "url");
                    if url.is_empty() {
                        return None;
                    }
                    let mut snippet = str_field(item, "description").to_string();
                    if snippet.trim().is_empty() {
                        snippet = item
                            .get("snippets")
                            .and_then(|s| s.as_array())
                            .and_then(|s| s.first())
                            .and_then(|s| s.as_str())
                            .unwrap_or("")
                            .to_string();
                    }
                    Some(
                        SearchHit::new(clean_text(str_field(item, "title")), url, "You.com")
                            .with_snippet(clean_text(&snippet)),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ProviderClient for YouClient {
    fn name(&self) -> &str {
        "You.com"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Search]
    }

    async fn fetch_hits(
        &self,
        request: &NormalizedRequest,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-API-Key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| ProviderError::Unavailable(format!("You.com: {}", e)))?,
        );
        let count = request.max_results.to_string();
        let req = self
            .client
            .get(SEARCH_URL)
            .headers(headers)
            .query(&[("query", request.query.as_str()), ("num_web_results", count.as_str())]);
        let value = send_json("You.com", req, self.timeout).await?;
        Ok(parse_results(&value))
    }
}
