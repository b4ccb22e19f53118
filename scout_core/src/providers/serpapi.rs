use super::{clean_text, send_json, str_field};
use crate::error::ProviderError;
use crate::types::{Capability, NormalizedRequest, SearchHit};
use crate::ProviderClient;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const SEARCH_URL: &str = "https://serpapi.com/search.json";

/// Google pages at most 10 organic results per request
const MAX_PER_REQUEST: usize = 10;

/// Quality assigned to Google image results when ranking images
pub const SERPAPI_IMAGE_QUALITY: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Web,
    Images,
}

/// SerpAPI Google results, either organic web or image search.
pub struct SerpApiClient {
    client: Client,
    api_key: String,
    timeout: Duration,
    mode: Mode,
}

impl SerpApiClient {
    pub fn web(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            timeout,
            mode: Mode::Web,
        }
    }

    pub fn images(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            timeout,
            mode: Mode::Images,
        }
    }

    fn params(&self, request: &NormalizedRequest) -> Vec<(&'static str, String)> {
        let num = request.max_results.clamp(1, MAX_PER_REQUEST).to_string();
        let mut params = vec![
            ("api_key", self.api_key.clone()),
            ("q", request.query.clone()),
            ("num", num),
        ];
        match self.mode {
            Mode::Web => {
                params.push(("engine", "google".to_string()));
                if let Some(tbs) = request.param_str("time_filter").and_then(tbs_filter) {
                    params.push(("tbs", tbs.to_string()));
                }
            }
            Mode::Images => {
                params.push(("engine", "google".to_string()));
                params.push(("tbm", "isch".to_string()));
                params.push(("safe", "active".to_string()));
            }
        }
        params
    }
}

/// Map a recency filter to Google's `tbs` value.
pub(crate) fn tbs_filter(filter: &str) -> Option<&'static str> {
    match filter {
        "day" => Some("qdr:d"),
        "week" => Some("qdr:w"),
        "month" => Some("qdr:m"),
        "year" => Some("qdr:y"),
        _ => None,
    }
}

pub(crate) fn parse_organic(value: &Value, source: &str) -> Vec<SearchHit> {
    value
        .get("organic_results")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let link = str_field(item, "link");
                    if link.is_empty() {
                        return None;
                    }
                    let hit = SearchHit::new(clean_text(str_field(item, "title")), link, source)
                        .with_snippet(clean_text(str_field(item, "snippet")));
                    Some(match item.get("date").and_then(|d| d.as_str()) {
                        Some(date) => hit.with_extra(json!({ "published_date": date })),
                        None => hit,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn parse_images(value: &Value) -> Vec<SearchHit> {
    value
        .get("images_results")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let original = str_field(item, "original");
                    if original.is_empty() {
                        return None;
                    }
                    let context = str_field(item, "link");
                    let mut hit =
                        SearchHit::new(clean_text(str_field(item, "title")), original, "SerpAPI Images")
                            .with_snippet(clean_text(str_field(item, "snippet")))
                            .as_image()
                            .with_extra(json!({
                                "thumbnail_url": str_field(item, "thumbnail"),
                                "context_url": context,
                                "width": item.get("original_width").cloned().unwrap_or(json!(0)),
                                "height": item.get("original_height").cloned().unwrap_or(json!(0)),
                                "quality": SERPAPI_IMAGE_QUALITY,
                                "tags": [],
                            }));
                    // The page hosting the image is the meaningful domain
                    if !context.is_empty() {
                        hit.domain = super::extract_domain(context);
                    }
                    Some(hit)
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ProviderClient for SerpApiClient {
    fn name(&self) -> &str {
        match self.mode {
            Mode::Web => "SerpAPI",
            Mode::Images => "SerpAPI Images",
        }
    }

    fn capabilities(&self) -> &'static [Capability] {
        match self.mode {
            Mode::Web => &[Capability::Search],
            Mode::Images => &[Capability::ImageSearch],
        }
    }

    async fn fetch_hits(
        &self,
        request: &NormalizedRequest,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        let req = self.client.get(SEARCH_URL).query(&self.params(request));
        let value = send_json(self.name(), req, self.timeout).await?;
        if let Some(error) = value.get("error").and_then(|e| e.as_str()) {
            // "no results" is reported as an error field with 200
            if error.to_ascii_lowercase().contains("hasn't returned any results") {
                return Ok(Vec::new());
            }
            return Err(ProviderError::MalformedResponse(format!(
                "{}: {}",
                self.name(),
                error
            )));
        }
        Ok(match self.mode {
            Mode::Web => parse_organic(&value, "SerpAPI"),
            Mode::Images => parse_images(&value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tbs_filter() {
        assert_eq!(tbs_filter("day"), Some("qdr:d"));
        assert_eq!(tbs_filter("year"), Some("qdr:y"));
        assert_eq!(tbs_filter("decade"), None);
    }

    #[test]
    fn test_params_include_tbs() {
        let client = SerpApiClient::web(Client::new(), "k".repeat(30), Duration::from_secs(1));
        let request = NormalizedRequest::new(Capability::Search, "rust", 50)
            .with_param("time_filter", "week");
        let params = client.params(&request);
        assert!(params.contains(&("tbs", "qdr:w".to_string())));
        assert!(params.contains(&("num", "10".to_string())));
        assert!(params.contains(&("engine", "google".to_string())));
    }

    #[test]
    fn test_parse_organic() {
        let value = json!({
            "organic_results": [
                { "title": "Rust", "link": "https://www.rust-lang.org/", "snippet": "A language" },
                { "title": "Missing link" }
            ]
        });
        let hits = parse_organic(&value, "SerpAPI");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://www.rust-lang.org/");
        assert_eq!(hits[0].domain, "rust-lang.org");
    }

    #[test]
    fn test_parse_images() {
        let value = json!({
            "images_results": [
                {
                    "title": "Panel",
                    "original": "https://cdn.example.com/panel.jpg",
                    "link": "https://www.nrel.gov/solar",
                    "thumbnail": "https://t.example.com/p.jpg",
                    "original_width": 1200,
                    "original_height": 800
                }
            ]
        });
        let hits = parse_images(&value);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].is_image());
        assert_eq!(hits[0].domain, "nrel.gov");
        assert_eq!(hits[0].extra["width"], 1200);
        assert_eq!(hits[0].extra["quality"], 5.0);
    }
}
