use super::{clean_text, send_json, str_field};
use crate::error::ProviderError;
use crate::types::{Capability, NormalizedRequest, SearchHit};
use crate::ProviderClient;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const SEARCH_URL: &str = "https://api.tavily.com/search";

/// Tavily real-time web search.
pub struct TavilyClient {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl TavilyClient {
    pub fn new(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            timeout,
        }
    }

    fn body(&self, request: &NormalizedRequest) -> Value {
        let depth = request.param_str("search_depth").unwrap_or("advanced");
        let mut body = json!({
            "api_key": self.api_key,
            "query": request.query,
            "search_depth": depth,
            "include_answer": false,
            "include_raw_content": false,
            "max_results": request.max_results,
        });
        if let Some(days) = request.param_str("time_filter").and_then(days_for) {
            body["days"] = json!(days);
        }
        body
    }
}

fn days_for(filter: &str) -> Option<u32> {
    match filter {
        "day" => Some(1),
        "week" => Some(7),
        "month" => Some(30),
        "year" => Some(365),
        _ => None,
    }
}

/// Map a Tavily response into hits. `content` becomes the snippet.
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
                    let hit = SearchHit::new(clean_text(str_field(item, "title")), url, "Tavily")
                        .with_snippet(clean_text(str_field(item, "content")))
                        .with_score(item.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0));
                    Some(match item.get("published_date") {
                        Some(date) if !date.is_null() => {
                            hit.with_extra(json!({ "published_date": date }))
                        }
                        _ => hit,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ProviderClient for TavilyClient {
    fn name(&self) -> &str {
        "Tavily"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Search]
    }

    async fn fetch_hits(
        &self,
        request: &NormalizedRequest,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let req = self
            .client
            .post(SEARCH_URL)
            .headers(headers)
            .json(&self.body(request));
        let value = send_json("Tavily", req, self.timeout).await?;
        Ok(parse_results(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_results() {
        let value = json!({
            "answer": null,
            "results": [
                {
                    "title": "Solar &amp; wind",
                    "url": "https://energy.gov/solar",
                    "content": "Renewables are growing.",
                    "score": 0.91,
                    "published_date": "2024-03-01"
                },
                { "title": "No url", "content": "dropped" }
            ]
        });
        let hits = parse_results(&value);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Solar & wind");
        assert_eq!(hits[0].domain, "energy.gov");
        assert_eq!(hits[0].source_name, "Tavily");
        assert_eq!(hits[0].score, 0.91);
        assert_eq!(hits[0].extra["published_date"], "2024-03-01");
    }

    #[test]
    fn test_time_filter_maps_to_days() {
        let client = TavilyClient::new(Client::new(), "tvly-x", Duration::from_secs(1));
        let request = NormalizedRequest::new(Capability::Search, "q", 5)
            .with_param("time_filter", "week");
        assert_eq!(client.body(&request)["days"], 7);
        let request = NormalizedRequest::new(Capability::Search, "q", 5);
        assert!(client.body(&request).get("days").is_none());
    }
}
