// src/lib.rs
pub mod aggregate;
pub mod cache;
pub mod capabilities;
pub mod config;
pub mod cpu_pool;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod formatting;
pub mod historical;
pub mod options;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod registry;
pub mod report;
pub mod trends;
pub mod types;

use crate::error::ProviderError;
use async_trait::async_trait;
use std::time::Instant;

pub use crate::aggregate::ResultAggregator;
pub use crate::cache::{CacheKind, CacheLayer, CacheStats, CacheStore, DiskCache, MemoryCache};
pub use crate::capabilities::Capabilities;
pub use crate::config::Settings;
pub use crate::extract::ContentExtractor;
pub use crate::fallback::LocalHeuristicFallback;
pub use crate::historical::HistoricalSeries;
pub use crate::options::{ResearchOptions, SearchSpeed, SummaryType, TimeFilter};
pub use crate::orchestrator::FallbackOrchestrator;
pub use crate::registry::ProviderRegistry;
pub use crate::trends::TrendAnalysis;
pub use crate::types::{
    AttemptRecord, Capability, NormalizedRequest, NormalizedResult, ProviderDescriptor,
    ProviderFailure, ResultType, SearchHit, SearchMeta, SearchOutcome, SearchResponse,
    SummarizeRequest, SummaryResult,
};

/// One external service behind a uniform contract.
///
/// Implementors provide the fallible `complete` / `fetch_hits` /
/// `fetch_series` calls for the capabilities they support. The provided
/// `summarize` and `search` wrappers never fail: they fold errors into
/// the returned value so callers can iterate a provider chain without
/// error plumbing.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Display name, also used as `provider_name` / `source_name`.
    fn name(&self) -> &str;

    /// Capabilities this client can serve.
    fn capabilities(&self) -> &'static [Capability];

    async fn complete(&self, _request: &SummarizeRequest) -> Result<String, ProviderError> {
        Err(ProviderError::Unavailable(format!(
            "{} does not support summarization",
            self.name()
        )))
    }

    async fn fetch_hits(
        &self,
        _request: &NormalizedRequest,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        Err(ProviderError::Unavailable(format!(
            "{} does not support search",
            self.name()
        )))
    }

    async fn fetch_series(
        &self,
        _indicator: &str,
        _years: u32,
    ) -> Result<HistoricalSeries, ProviderError> {
        Err(ProviderError::Unavailable(format!(
            "{} does not provide historical data",
            self.name()
        )))
    }

    /// One summarization attempt. Empty output counts as a failure.
    async fn summarize(&self, request: &SummarizeRequest) -> NormalizedResult {
        let start = Instant::now();
        let outcome = self.complete(request).await;
        let latency = start.elapsed().as_secs_f64();
        match outcome {
            Ok(text) if !text.trim().is_empty() => {
                NormalizedResult::succeeded(self.name(), text.trim(), latency)
            }
            Ok(_) => NormalizedResult::failed(
                self.name(),
                ProviderError::EmptyResponse(self.name().to_string()).to_string(),
                latency,
            ),
            Err(err) => NormalizedResult::failed(self.name(), err.to_string(), latency),
        }
    }

    /// One search attempt. Failures yield no hits and a recorded failure.
    async fn search(&self, request: &NormalizedRequest) -> SearchOutcome {
        let start = Instant::now();
        let outcome = self.fetch_hits(request).await;
        let latency_seconds = start.elapsed().as_secs_f64();
        match outcome {
            Ok(mut hits) => {
                hits.truncate(request.max_results);
                SearchOutcome {
                    provider_name: self.name().to_string(),
                    hits,
                    failure: None,
                    latency_seconds,
                }
            }
            Err(err) => SearchOutcome {
                provider_name: self.name().to_string(),
                hits: Vec::new(),
                failure: Some(ProviderFailure::from_error(self.name(), &err)),
                latency_seconds,
            },
        }
    }
}
