//! Core data types shared by providers, the orchestrator and the aggregator.

use crate::error::ProviderError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// What a provider can be asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Summarize,
    Search,
    ImageSearch,
    HistoricalData,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Summarize,
        Capability::Search,
        Capability::ImageSearch,
        Capability::HistoricalData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Summarize => "summarize",
            Capability::Search => "search",
            Capability::ImageSearch => "image_search",
            Capability::HistoricalData => "historical_data",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of a configured provider.
///
/// Lower `priority` values are tried first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub capability: Capability,
    pub name: String,
    pub priority: u32,
    pub credential_present: bool,
}

impl ProviderDescriptor {
    pub fn new(capability: Capability, name: impl Into<String>, priority: u32) -> Self {
        Self {
            capability,
            name: name.into(),
            priority,
            credential_present: true,
        }
    }

    /// Mark the descriptor as not backed by a credential (local providers).
    pub fn without_credential(mut self) -> Self {
        self.credential_present = false;
        self
    }
}

/// A capability-tagged request handed to each provider attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRequest {
    pub capability: Capability,
    pub query: String,
    pub max_results: usize,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra_params: Map<String, Value>,
}

impl NormalizedRequest {
    pub fn new(capability: Capability, query: impl Into<String>, max_results: usize) -> Self {
        Self {
            capability,
            query: query.into(),
            max_results,
            extra_params: Map::new(),
        }
    }

    /// Builder method to attach a provider parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_params.insert(key.into(), value.into());
        self
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.extra_params.get(key).and_then(|v| v.as_str())
    }
}

/// Input for a single summarization attempt.
///
/// Chat-style providers send `prompt`; summarization endpoints that take raw
/// text send `text` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub query: String,
    pub text: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Outcome of one summarization attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub text: String,
    pub provider_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_seconds: f64,
    pub timestamp: DateTime<Utc>,
}

impl NormalizedResult {
    pub fn succeeded(
        provider_name: impl Into<String>,
        text: impl Into<String>,
        latency_seconds: f64,
    ) -> Self {
        Self {
            text: text.into(),
            provider_name: provider_name.into(),
            success: true,
            error: None,
            latency_seconds,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(
        provider_name: impl Into<String>,
        error: impl Into<String>,
        latency_seconds: f64,
    ) -> Self {
        Self {
            text: String::new(),
            provider_name: provider_name.into(),
            success: false,
            error: Some(error.into()),
            latency_seconds,
            timestamp: Utc::now(),
        }
    }

    /// Length-over-latency score used by best-of-N selection.
    ///
    /// Favors long, fast answers whether or not they are better answers.
    /// Kept for compatibility; treat it as a rough heuristic.
    pub fn best_of_score(&self) -> f64 {
        self.text.chars().count() as f64 / (self.latency_seconds + 1.0)
    }
}

/// Kind of a search hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    #[default]
    Text,
    Image,
}

/// A normalized search result from any provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,

    /// Unique key for deduplication
    pub url: String,

    #[serde(default)]
    pub snippet: String,

    #[serde(default)]
    pub domain: String,

    /// Provider that produced the hit (e.g. "Exa", "Tavily")
    pub source_name: String,

    /// Upstream score on input, aggregated relevance score after ranking
    #[serde(default)]
    pub score: f64,

    #[serde(default)]
    pub result_type: ResultType,

    /// Provider-specific fields (image dimensions, tags, dates)
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub extra: Value,
}

impl SearchHit {
    /// Create a text hit. The domain is derived from the url.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        let url = url.into();
        Self {
            title: title.into(),
            domain: crate::providers::extract_domain(&url),
            url,
            snippet: String::new(),
            source_name: source_name.into(),
            score: 0.0,
            result_type: ResultType::Text,
            extra: Value::Null,
        }
    }

    /// Builder method to add a snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    /// Builder method to set the upstream score.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Builder method to mark the hit as an image.
    pub fn as_image(mut self) -> Self {
        self.result_type = ResultType::Image;
        self
    }

    /// Builder method to add provider-specific fields.
    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = extra;
        self
    }

    pub fn is_image(&self) -> bool {
        self.result_type == ResultType::Image
    }
}

/// A provider that failed during a fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: String,
    pub code: String,
    #[serde(default)]
    pub is_timeout: bool,
}

impl ProviderFailure {
    pub fn from_error(provider: impl Into<String>, error: &ProviderError) -> Self {
        let code = error.code_str();
        Self {
            provider: provider.into(),
            error: error.to_string(),
            code: code.to_string(),
            is_timeout: code == "timeout",
        }
    }
}

/// Result of one provider's search call.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub provider_name: String,
    pub hits: Vec<SearchHit>,
    pub failure: Option<ProviderFailure>,
    pub latency_seconds: f64,
}

/// Metadata attached to a merged search response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchMeta {
    pub query: String,

    /// Providers that were asked, in priority order
    pub providers_queried: Vec<String>,

    /// Providers that answered
    pub completed: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ProviderFailure>,

    /// Whether some providers failed or timed out
    #[serde(default)]
    pub partial: bool,

    #[serde(default)]
    pub cached: bool,

    /// Hits before deduplication
    #[serde(default)]
    pub total_before_dedup: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Search results, always in one shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub meta: SearchMeta,
}

impl SearchResponse {
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            hits: Vec::new(),
            meta: SearchMeta {
                query: query.into(),
                ..SearchMeta::default()
            },
        }
    }

    pub fn text_hits(&self) -> impl Iterator<Item = &SearchHit> {
        self.hits.iter().filter(|h| !h.is_image())
    }

    pub fn image_hits(&self) -> impl Iterator<Item = &SearchHit> {
        self.hits.iter().filter(|h| h.is_image())
    }
}

/// A record of one provider attempt in a fail-over chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub provider: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_seconds: f64,
}

impl From<&NormalizedResult> for AttemptRecord {
    fn from(result: &NormalizedResult) -> Self {
        Self {
            provider: result.provider_name.clone(),
            success: result.success,
            error: result.error.clone(),
            latency_seconds: result.latency_seconds,
        }
    }
}

/// Word-level statistics reported with comprehensive summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub sources_analyzed: usize,
    pub total_words: usize,
    pub keywords_extracted: usize,
}

/// What callers of `summarize` receive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResult {
    #[serde(flatten)]
    pub result: NormalizedResult,

    /// "simple", "quick", "advanced" or "comprehensive"
    pub format_type: String,

    /// Every provider tried, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<AttemptRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_analysis: Option<ContentAnalysis>,

    /// Whether the local fallback produced the text
    #[serde(default)]
    pub used_fallback: bool,

    #[serde(default)]
    pub cached: bool,
}

impl SummaryResult {
    pub fn text(&self) -> &str {
        &self.result.text
    }

    pub fn provider_name(&self) -> &str {
        &self.result.provider_name
    }

    /// Providers that were tried and failed.
    pub fn failed_attempts(&self) -> impl Iterator<Item = &AttemptRecord> {
        self.attempts.iter().filter(|a| !a.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_hit_builder() {
        let hit = SearchHit::new("Title", "https://www.example.org/page", "Exa")
            .with_snippet("Snippet")
            .with_score(0.5)
            .with_extra(json!({"published": "2024-01-01"}));

        assert_eq!(hit.domain, "example.org");
        assert_eq!(hit.snippet, "Snippet");
        assert_eq!(hit.score, 0.5);
        assert_eq!(hit.result_type, ResultType::Text);
        assert_eq!(hit.extra["published"], "2024-01-01");
    }

    #[test]
    fn test_best_of_score() {
        let mut result = NormalizedResult::succeeded("A", "x".repeat(300), 2.0);
        assert_eq!(result.best_of_score(), 100.0);
        result.latency_seconds = 0.0;
        assert_eq!(result.best_of_score(), 300.0);
    }

    #[test]
    fn test_summary_result_flattens() {
        let summary = SummaryResult {
            result: NormalizedResult::succeeded("OpenAI", "text", 1.0),
            format_type: "quick".into(),
            attempts: Vec::new(),
            keywords: Vec::new(),
            content_analysis: None,
            used_fallback: false,
            cached: false,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["provider_name"], "OpenAI");
        assert_eq!(value["success"], true);
        assert!(value.get("attempts").is_none());

        let parsed: SummaryResult = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.text(), "text");
    }

    #[test]
    fn test_request_params() {
        let request = NormalizedRequest::new(Capability::Search, "rust", 5)
            .with_param("time_filter", "week");
        assert_eq!(request.param_str("time_filter"), Some("week"));
        assert_eq!(request.param_str("missing"), None);
    }
}
