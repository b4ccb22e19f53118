use super::serpapi::{parse_organic, tbs_filter};
use super::send_json;
use crate::error::ProviderError;
use crate::types::{Capability, NormalizedRequest, SearchHit};
use crate::ProviderClient;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const SEARCH_URL: &str = "https://www.searchapi.io/api/v1/search";

/// SearchApi.io Google results. Same organic result shape as SerpAPI.
pub struct SearchApiClient {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl SearchApiClient {
    pub fn new(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ProviderClient for SearchApiClient {
    fn name(&self) -> &str {
        "SearchApi"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Search]
    }

    async fn fetch_hits(
        &self,
        request: &NormalizedRequest,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        let num = request.max_results.clamp(1, 10).to_string();
        let mut params = vec![
            ("engine", "google".to_string()),
            ("q", request.query.clone()),
            ("num", num),
        ];
        if let Some(tbs) = request.param_str("time_filter").and_then(tbs_filter) {
            params.push(("time_period", tbs.trim_start_matches("qdr:").to_string()));
        }
        let req = self
            .client
            .get(SEARCH_URL)
            .bearer_auth(&self.api_key)
            .query(&params);
        let value = send_json("SearchApi", req, self.timeout).await?;
        Ok(parse_organic(&value, "SearchApi"))
    }
}
