//! Stock photo providers.

use super::{clean_text, send_json, str_field};
use crate::error::ProviderError;
use crate::types::{Capability, NormalizedRequest, SearchHit};
use crate::ProviderClient;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const UNSPLASH_URL: &str = "https://api.unsplash.com/search/photos";
const PIXABAY_URL: &str = "https://pixabay.com/api/";

pub const UNSPLASH_QUALITY: f64 = 9.0;
pub const PIXABAY_QUALITY: f64 = 7.0;

/// Unsplash professional photography.
pub struct UnsplashClient {
    client: Client,
    access_key: String,
    timeout: Duration,
}

impl UnsplashClient {
    pub fn new(client: Client, access_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            access_key: access_key.into(),
            timeout,
        }
    }
}

pub(crate) fn parse_unsplash(value: &Value) -> Vec<SearchHit> {
    let Some(items) = value.get("results").and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let url = item.pointer("/urls/regular").and_then(|v| v.as_str())?;
            let title = [str_field(item, "alt_description"), str_field(item, "description")]
                .into_iter()
                .find(|s| !s.trim().is_empty())
                .unwrap_or("");
            let tags: Vec<&str> = item
                .get("tags")
                .and_then(|t| t.as_array())
                .map(|tags| tags.iter().filter_map(|t| t.get("title")?.as_str()).collect())
                .unwrap_or_default();
            let page = item.pointer("/links/html").and_then(|v| v.as_str()).unwrap_or("");
            Some(
                SearchHit::new(clean_text(title), url, "Unsplash")
                    .as_image()
                    .with_extra(json!({
                        "quality": UNSPLASH_QUALITY,
                        "tags": tags,
                        "thumbnail_url": item.pointer("/urls/small").and_then(|v| v.as_str()).unwrap_or(""),
                        "context_url": page,
                        "width": item.get("width").cloned().unwrap_or(json!(0)),
                        "height": item.get("height").cloned().unwrap_or(json!(0)),
                        "photographer": item.pointer("/user/name").and_then(|v| v.as_str()).unwrap_or(""),
                    })),
            )
        })
        .collect()
}

#[async_trait]
impl ProviderClient for UnsplashClient {
    fn name(&self) -> &str {
        "Unsplash"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::ImageSearch]
    }

    async fn fetch_hits(
        &self,
        request: &NormalizedRequest,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        let per_page = request.max_results.clamp(1, 30).to_string();
        let req = self
            .client
            .get(UNSPLASH_URL)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .query(&[
                ("query", request.query.as_str()),
                ("per_page", per_page.as_str()),
                ("order_by", "relevant"),
                ("orientation", "landscape"),
            ]);
        let value = send_json("Unsplash", req, self.timeout).await?;
        Ok(parse_unsplash(&value))
    }
}

/// Pixabay stock images.
pub struct PixabayClient {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl PixabayClient {
    pub fn new(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            timeout,
        }
    }
}

/// Pixabay has no titles; its comma separated tags double as one.
pub(crate) fn parse_pixabay(value: &Value) -> Vec<SearchHit> {
    let Some(items) = value.get("hits").and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let url = str_field(item, "webformatURL");
            if url.is_empty() {
                return None;
            }
            let raw_tags = str_field(item, "tags");
            let tags: Vec<&str> = raw_tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect();
            let photographer = match str_field(item, "user") {
                "" => "Pixabay",
                user => user,
            };
            Some(
                SearchHit::new(clean_text(raw_tags), url, "Pixabay")
                    .as_image()
                    .with_extra(json!({
                        "quality": PIXABAY_QUALITY,
                        "tags": tags,
                        "thumbnail_url": str_field(item, "previewURL"),
                        "context_url": str_field(item, "pageURL"),
                        "width": item.get("imageWidth").cloned().unwrap_or(json!(0)),
                        "height": item.get("imageHeight").cloned().unwrap_or(json!(0)),
                        "photographer": photographer,
                    })),
            )
        })
        .collect()
}

#[async_trait]
impl ProviderClient for PixabayClient {
    fn name(&self) -> &str {
        "Pixabay"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::ImageSearch]
    }

    async fn fetch_hits(
        &self,
        request: &NormalizedRequest,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        // Pixabay rejects per_page below 3
        let per_page = request.max_results.clamp(3, 20).to_string();
        let req = self.client.get(PIXABAY_URL).query(&[
            ("key", self.api_key.as_str()),
            ("q", request.query.as_str()),
            ("image_type", "photo"),
            ("orientation", "horizontal"),
            ("per_page", per_page.as_str()),
            ("safesearch", "true"),
        ]);
        let value = send_json("Pixabay", req, self.timeout).await?;
        Ok(parse_pixabay(&value))
    }
}
