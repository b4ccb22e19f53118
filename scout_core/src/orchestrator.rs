//! Provider fail-over, fan-out and the local fallback, tied together.
//!
//! Public calls here never return an error. Provider failures are logged
//! and recorded on the result; when every provider fails the local
//! heuristics answer instead.

use crate::aggregate::ResultAggregator;
use crate::cache::{cache_key, content_hash, CacheKind, CacheLayer};
use crate::config::Settings;
use crate::cpu_pool::{panic_message, spawn_cpu};
use crate::error::ProviderError;
use crate::fallback::{FallbackStyle, LocalHeuristicFallback};
use crate::formatting::apply_detailed_formatting;
use crate::historical::{demo_series, HistoricalSeries};
use crate::options::{ResearchOptions, SummaryType};
use crate::prompts::build_request;
use crate::registry::{ProviderRegistry, RegisteredProvider};
use crate::types::{
    AttemptRecord, Capability, NormalizedRequest, NormalizedResult, ProviderFailure, SearchHit,
    SearchMeta, SearchOutcome, SearchResponse, SummarizeRequest, SummaryResult,
};
use chrono::Utc;
use futures::{stream, FutureExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Added to the client's own HTTP timeout before the orchestrator gives up.
const DEADLINE_GRACE: Duration = Duration::from_secs(5);

/// `format_type` of summaries requested without options.
pub const SIMPLE_FORMAT: &str = "simple";

/// Work shared by the fail-over and best-of-N entry points.
struct SummaryJob<'a> {
    text: &'a str,
    query: &'a str,
    options: Option<&'a ResearchOptions>,
    keywords: Vec<String>,
    request: SummarizeRequest,
    cache_key: Option<String>,
}

impl SummaryJob<'_> {
    fn style(&self) -> FallbackStyle {
        self.options
            .map(FallbackStyle::for_options)
            .unwrap_or(FallbackStyle::Enhanced)
    }

    fn format_type(&self) -> &'static str {
        format_type(self.options)
    }

    fn is_comprehensive(&self) -> bool {
        self.options
            .is_some_and(|o| o.summary_type == SummaryType::Comprehensive)
    }
}

fn format_type(options: Option<&ResearchOptions>) -> &'static str {
    options
        .map(ResearchOptions::format_type)
        .unwrap_or(SIMPLE_FORMAT)
}

fn failed_outcome(name: &str, error: &ProviderError, start: Instant) -> SearchOutcome {
    SearchOutcome {
        provider_name: name.to_string(),
        hits: Vec::new(),
        failure: Some(ProviderFailure::from_error(name, error)),
        latency_seconds: start.elapsed().as_secs_f64(),
    }
}

fn search_meta(query: &str, outcomes: &[SearchOutcome], start: Instant) -> SearchMeta {
    let errors: Vec<ProviderFailure> = outcomes
        .iter()
        .filter_map(|o| o.failure.clone())
        .collect();
    SearchMeta {
        query: query.to_string(),
        providers_queried: outcomes.iter().map(|o| o.provider_name.clone()).collect(),
        completed: outcomes
            .iter()
            .filter(|o| o.failure.is_none())
            .map(|o| o.provider_name.clone())
            .collect(),
        partial: !errors.is_empty(),
        errors,
        cached: false,
        total_before_dedup: outcomes.iter().map(|o| o.hits.len()).sum(),
        duration_ms: Some(start.elapsed().as_millis() as u64),
    }
}

/// Images mixed into a web search: one per three text hits.
fn image_quota(max_results: usize) -> usize {
    (max_results / 3).max(1)
}

/// Runs provider chains for every capability.
#[derive(Debug, Clone)]
pub struct FallbackOrchestrator {
    registry: Arc<ProviderRegistry>,
    settings: Settings,
    cache: Option<CacheLayer>,
    fallback: LocalHeuristicFallback,
    aggregator: ResultAggregator,
    attempt_timeout: Option<Duration>,
}

impl FallbackOrchestrator {
    pub fn new(registry: Arc<ProviderRegistry>, settings: Settings) -> Self {
        Self {
            registry,
            settings,
            cache: None,
            fallback: LocalHeuristicFallback::new(),
            aggregator: ResultAggregator::new(),
            attempt_timeout: None,
        }
    }

    /// Builder method to consult and fill `cache` around every call.
    pub fn with_cache(mut self, cache: CacheLayer) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Builder method to bound every provider attempt by one fixed deadline.
    pub fn with_attempt_timeout(mut self, deadline: Duration) -> Self {
        self.attempt_timeout = Some(deadline);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> Option<&CacheLayer> {
        self.active_cache()
    }

    fn active_cache(&self) -> Option<&CacheLayer> {
        self.cache.as_ref().filter(|_| self.settings.enable_cache)
    }

    fn deadline(&self, capability: Capability, provider: &str) -> Duration {
        if let Some(deadline) = self.attempt_timeout {
            return deadline;
        }
        let base = match capability {
            Capability::Summarize if provider == "Ollama" => self.settings.ollama_timeout(),
            Capability::Summarize => self.settings.summarize_timeout(),
            _ => self.settings.search_timeout(),
        };
        base + DEADLINE_GRACE
    }

    fn key_for<T: Serialize>(&self, kind: CacheKind, request: &T) -> Option<String> {
        self.active_cache()?;
        match cache_key(kind, request) {
            Ok(key) => Some(key),
            Err(err) => {
                warn!(target: "scout.orchestrator", %kind, error = %err, "could not derive cache key");
                None
            }
        }
    }

    async fn cached<T: DeserializeOwned>(&self, kind: CacheKind, key: Option<&str>) -> Option<T> {
        let (cache, key) = (self.active_cache()?, key?);
        cache.get_json(kind, key).await
    }

    async fn store<T: Serialize>(&self, kind: CacheKind, key: Option<&str>, value: &T) {
        if let (Some(cache), Some(key)) = (self.active_cache(), key) {
            cache.put_json(kind, key, value).await;
        }
    }

    // ------------------------------------------------------------------
    // Summarization
    // ------------------------------------------------------------------

    /// Try summarization providers in priority order and return the first
    /// success. When all fail, or none is configured, the local fallback
    /// answers. Always returns `success == true` with non-empty text.
    pub async fn summarize(
        &self,
        text: &str,
        query: &str,
        options: Option<&ResearchOptions>,
    ) -> SummaryResult {
        let job = match self.prepare(text, query, options, "failover").await {
            Ok(job) => job,
            Err(done) => return done,
        };

        let (winner, attempts) = self.failover(&job.request).await;
        self.conclude(job, winner, attempts).await
    }

    /// Send a prepared request down the summarization chain in priority
    /// order. No local fallback: `None` means every provider failed or none
    /// is configured.
    pub async fn failover(
        &self,
        request: &SummarizeRequest,
    ) -> (Option<NormalizedResult>, Vec<AttemptRecord>) {
        let mut attempts = Vec::new();
        for provider in self.registry.entries(Capability::Summarize) {
            let result = self.attempt_summarize(provider, request).await;
            attempts.push(AttemptRecord::from(&result));
            if result.success {
                return (Some(result), attempts);
            }
        }
        (None, attempts)
    }

    /// Ask every summarization provider at once and keep the answer with the
    /// highest `NormalizedResult::best_of_score`. Falls back like `summarize`.
    pub async fn summarize_best_of(
        &self,
        text: &str,
        query: &str,
        options: Option<&ResearchOptions>,
    ) -> SummaryResult {
        let job = match self.prepare(text, query, options, "best_of").await {
            Ok(job) => job,
            Err(done) => return done,
        };

        let results = self.fan_out_summaries(&job.request).await;
        let attempts = results.iter().map(AttemptRecord::from).collect();
        // earlier priority wins ties
        let winner = results
            .into_iter()
            .filter(|r| r.success)
            .fold(None::<NormalizedResult>, |best, candidate| match best {
                Some(best) if best.best_of_score() >= candidate.best_of_score() => Some(best),
                _ => Some(candidate),
            });
        self.conclude(job, winner, attempts).await
    }

    /// Every provider's answer, successful or not, in priority order.
    pub async fn summarize_all(
        &self,
        text: &str,
        query: &str,
        options: Option<&ResearchOptions>,
    ) -> Vec<NormalizedResult> {
        if LocalHeuristicFallback::is_insufficient(text) {
            return Vec::new();
        }
        let keywords = self.keywords_for(text, query, options).await;
        let request = build_request(text, query, options, &keywords, self.settings.temperature);
        self.fan_out_summaries(&request).await
    }

    /// Short-circuits with a finished result for insufficient input or a
    /// cache hit.
    async fn prepare<'a>(
        &self,
        text: &'a str,
        query: &'a str,
        options: Option<&'a ResearchOptions>,
        mode: &str,
    ) -> Result<SummaryJob<'a>, SummaryResult> {
        if LocalHeuristicFallback::is_insufficient(text) {
            let style = options
                .map(FallbackStyle::for_options)
                .unwrap_or(FallbackStyle::Enhanced);
            debug!(target: "scout.orchestrator", query, "insufficient content, skipping providers");
            let result = NormalizedResult::succeeded(
                style.provider_name(),
                self.fallback.summarize(text, query, style),
                0.0,
            );
            return Err(SummaryResult {
                result,
                format_type: format_type(options).to_string(),
                attempts: Vec::new(),
                keywords: Vec::new(),
                content_analysis: None,
                used_fallback: true,
                cached: false,
            });
        }

        let cache_key = match content_hash(&[text]) {
            Ok(hash) => self.key_for(
                CacheKind::Summaries,
                &json!({ "content_hash": hash, "query": query, "options": options, "mode": mode }),
            ),
            Err(_) => None,
        };
        if let Some(mut hit) = self
            .cached::<SummaryResult>(CacheKind::Summaries, cache_key.as_deref())
            .await
        {
            debug!(target: "scout.orchestrator", query, "summary served from cache");
            hit.cached = true;
            return Err(hit);
        }

        let keywords = self.keywords_for(text, query, options).await;
        let request = build_request(text, query, options, &keywords, self.settings.temperature);
        Ok(SummaryJob {
            text,
            query,
            options,
            keywords,
            request,
            cache_key,
        })
    }

    /// Keywords are only extracted for comprehensive summaries.
    async fn keywords_for(
        &self,
        text: &str,
        query: &str,
        options: Option<&ResearchOptions>,
    ) -> Vec<String> {
        if !options.is_some_and(|o| o.summary_type == SummaryType::Comprehensive) {
            return Vec::new();
        }
        let fallback = self.fallback;
        let (content, query) = (text.to_string(), query.to_string());
        match spawn_cpu("keywords", move || Ok(fallback.keywords(&content, &query))).await {
            Ok(keywords) => keywords,
            Err(err) => {
                warn!(target: "scout.orchestrator", error = %err, "keyword extraction failed");
                Vec::new()
            }
        }
    }

    async fn conclude(
        &self,
        job: SummaryJob<'_>,
        winner: Option<NormalizedResult>,
        attempts: Vec<AttemptRecord>,
    ) -> SummaryResult {
        let (result, used_fallback) = match winner {
            Some(mut result) => {
                if let Some(options) = job.options.filter(|o| o.detailed_formatting) {
                    result.text = apply_detailed_formatting(&result.text, job.query, options);
                }
                (result, false)
            }
            None => {
                let style = job.style();
                info!(
                    target: "scout.orchestrator",
                    attempted = attempts.len(),
                    fallback = style.provider_name(),
                    "no provider succeeded, using local fallback"
                );
                (self.run_fallback(job.text, job.query, style).await, true)
            }
        };

        let content_analysis = job.is_comprehensive().then(|| {
            let source_count = job.options.map(|o| o.source_count).unwrap_or_default();
            self.fallback
                .content_analysis(job.text, &job.keywords, source_count)
        });
        let summary = SummaryResult {
            result,
            format_type: job.format_type().to_string(),
            attempts,
            keywords: job.keywords,
            content_analysis,
            used_fallback,
            cached: false,
        };

        // fallback output is cheap to recompute and should not mask providers
        if !used_fallback {
            self.store(CacheKind::Summaries, job.cache_key.as_deref(), &summary)
                .await;
        }
        summary
    }

    async fn run_fallback(&self, text: &str, query: &str, style: FallbackStyle) -> NormalizedResult {
        let start = Instant::now();
        let fallback = self.fallback;
        let (content, q) = (text.to_string(), query.to_string());
        let job = move || Ok(fallback.summarize(&content, &q, style));
        let summary = match spawn_cpu("local fallback", job).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(target: "scout.orchestrator", error = %err, "local fallback failed");
                format!(
                    "Summary of research on '{}': the collected content could not be analysed.",
                    query
                )
            }
        };
        NormalizedResult::succeeded(style.provider_name(), summary, start.elapsed().as_secs_f64())
    }

    /// One guarded attempt: panics and overruns become failed results.
    async fn attempt_summarize(
        &self,
        provider: &RegisteredProvider,
        request: &SummarizeRequest,
    ) -> NormalizedResult {
        let name = provider.descriptor.name.as_str();
        let deadline = self.deadline(Capability::Summarize, name);
        let start = Instant::now();
        let guarded = AssertUnwindSafe(provider.client.summarize(request)).catch_unwind();
        let mut result = match timeout(deadline, guarded).await {
            Ok(Ok(result)) => result,
            Ok(Err(payload)) => NormalizedResult::failed(
                name,
                ProviderError::Other(format!(
                    "provider panicked: {}",
                    panic_message(payload.as_ref())
                ))
                .to_string(),
                start.elapsed().as_secs_f64(),
            ),
            Err(_) => NormalizedResult::failed(
                name,
                ProviderError::Timeout(format!("{} after {:.1}s", name, deadline.as_secs_f64()))
                    .to_string(),
                start.elapsed().as_secs_f64(),
            ),
        };
        result.provider_name = name.to_string();

        if result.success {
            debug!(
                target: "scout.orchestrator",
                provider = name,
                latency_s = result.latency_seconds,
                chars = result.text.len(),
                "provider attempt succeeded"
            );
        } else {
            warn!(
                target: "scout.orchestrator",
                provider = name,
                latency_s = result.latency_seconds,
                error = result.error.as_deref().unwrap_or("unknown error"),
                "provider attempt failed"
            );
        }
        result
    }

    async fn fan_out_summaries(&self, request: &SummarizeRequest) -> Vec<NormalizedResult> {
        let providers = self.registry.entries(Capability::Summarize);
        if providers.is_empty() {
            return Vec::new();
        }
        let pool = self.settings.pool_size(providers.len());
        let mut results: Vec<(usize, NormalizedResult)> = stream::iter(providers.into_iter().enumerate())
            .map(|(idx, provider)| async move { (idx, self.attempt_summarize(provider, request).await) })
            .buffer_unordered(pool)
            .collect()
            .await;
        results.sort_by_key(|(idx, _)| *idx);
        results.into_iter().map(|(_, result)| result).collect()
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Query every search provider (and image provider when
    /// `include_images` is set) concurrently, then merge, rank and
    /// interleave. Provider failures are reported in `meta.errors`.
    pub async fn search(
        &self,
        query: &str,
        options: &ResearchOptions,
        max_results: usize,
    ) -> SearchResponse {
        let start = Instant::now();
        let max_results = max_results.max(1);
        let key = self.key_for(
            CacheKind::Search,
            &json!({
                "query": query,
                "max_results": max_results,
                "time_filter": options.time_filter,
                "include_images": options.include_images,
            }),
        );
        if let Some(mut hit) = self
            .cached::<SearchResponse>(CacheKind::Search, key.as_deref())
            .await
        {
            hit.meta.cached = true;
            return hit;
        }

        let mut text_request = NormalizedRequest::new(Capability::Search, query, max_results);
        if let Some(filter) = options.time_filter {
            text_request = text_request.with_param("time_filter", filter.as_str());
        }
        let images_wanted = image_quota(max_results);
        let image_request = NormalizedRequest::new(Capability::ImageSearch, query, images_wanted);

        let mut jobs: Vec<(&RegisteredProvider, &NormalizedRequest)> = self
            .registry
            .entries(Capability::Search)
            .into_iter()
            .map(|p| (p, &text_request))
            .collect();
        if options.include_images {
            jobs.extend(
                self.registry
                    .entries(Capability::ImageSearch)
                    .into_iter()
                    .map(|p| (p, &image_request)),
            );
        }
        if jobs.is_empty() {
            info!(target: "scout.orchestrator", query, "no search providers configured");
        }

        let outcomes = self.fan_out_search(jobs).await;
        let meta = search_meta(query, &outcomes, start);

        let (image_outcomes, text_outcomes): (Vec<SearchOutcome>, Vec<SearchOutcome>) = outcomes
            .into_iter()
            .partition(|o| o.hits.first().is_some_and(SearchHit::is_image));
        let mut text_hits = self.aggregator.merge_outcomes(&text_outcomes, query);
        text_hits.truncate(max_results);
        let mut image_hits = self.aggregator.rank_images(
            image_outcomes.into_iter().flat_map(|o| o.hits).collect(),
            query,
        );
        image_hits.truncate(images_wanted);

        let combined = ResultAggregator::dedup_by_url(text_hits.into_iter().chain(image_hits));
        let response = SearchResponse {
            hits: self.aggregator.interleave(combined),
            meta,
        };
        info!(
            target: "scout.orchestrator",
            query,
            hits = response.hits.len(),
            completed = response.meta.completed.len(),
            failed = response.meta.errors.len(),
            "search finished"
        );

        if !response.hits.is_empty() {
            self.store(CacheKind::Search, key.as_deref(), &response).await;
        }
        response
    }

    /// Image search: the higher-priority providers split `count` between
    /// them, and the lowest-priority one only fills a shortfall. Results are
    /// deduplicated and ranked by `ResultAggregator::image_score`.
    pub async fn search_images(&self, query: &str, count: usize) -> SearchResponse {
        let start = Instant::now();
        let count = count.max(1);
        let key = self.key_for(CacheKind::Images, &json!({ "query": query, "count": count }));
        if let Some(mut hit) = self
            .cached::<SearchResponse>(CacheKind::Images, key.as_deref())
            .await
        {
            hit.meta.cached = true;
            return hit;
        }

        let providers = self.registry.entries(Capability::ImageSearch);
        let split = providers.len().saturating_sub(1).max(1).min(providers.len());
        let (primary, fill) = providers.split_at(split);

        let mut outcomes = Vec::new();
        if !primary.is_empty() {
            let request =
                NormalizedRequest::new(Capability::ImageSearch, query, count.div_ceil(primary.len()));
            outcomes = self
                .fan_out_search(primary.iter().map(|p| (*p, &request)).collect())
                .await;
        }

        let found = ResultAggregator::dedup_by_url(outcomes.iter().flat_map(|o| o.hits.iter().cloned())).len();
        if found < count && !fill.is_empty() {
            debug!(target: "scout.orchestrator", found, count, "filling image shortfall");
            let request = NormalizedRequest::new(Capability::ImageSearch, query, count - found);
            outcomes.extend(
                self.fan_out_search(fill.iter().map(|p| (*p, &request)).collect())
                    .await,
            );
        }

        let meta = search_meta(query, &outcomes, start);
        let mut hits = self
            .aggregator
            .rank_images(outcomes.into_iter().flat_map(|o| o.hits).collect(), query);
        hits.truncate(count);
        let response = SearchResponse { hits, meta };

        if !response.hits.is_empty() {
            self.store(CacheKind::Images, key.as_deref(), &response).await;
        }
        response
    }

    async fn attempt_search(
        &self,
        provider: &RegisteredProvider,
        request: &NormalizedRequest,
    ) -> SearchOutcome {
        let name = provider.descriptor.name.as_str();
        let deadline = self.deadline(request.capability, name);
        let start = Instant::now();
        let guarded = AssertUnwindSafe(provider.client.search(request)).catch_unwind();
        let mut outcome = match timeout(deadline, guarded).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(payload)) => failed_outcome(
                name,
                &ProviderError::Other(format!(
                    "provider panicked: {}",
                    panic_message(payload.as_ref())
                )),
                start,
            ),
            Err(_) => failed_outcome(
                name,
                &ProviderError::Timeout(format!("{} after {:.1}s", name, deadline.as_secs_f64())),
                start,
            ),
        };
        outcome.provider_name = name.to_string();

        match &outcome.failure {
            Some(failure) => warn!(
                target: "scout.orchestrator",
                provider = name,
                code = %failure.code,
                error = %failure.error,
                "search provider failed"
            ),
            None => debug!(
                target: "scout.orchestrator",
                provider = name,
                hits = outcome.hits.len(),
                latency_s = outcome.latency_seconds,
                "search provider answered"
            ),
        }
        outcome
    }

    /// Run search attempts on a bounded pool; outcomes come back in job order.
    async fn fan_out_search(
        &self,
        jobs: Vec<(&RegisteredProvider, &NormalizedRequest)>,
    ) -> Vec<SearchOutcome> {
        if jobs.is_empty() {
            return Vec::new();
        }
        let pool = self.settings.pool_size(jobs.len());
        let mut outcomes: Vec<(usize, SearchOutcome)> = stream::iter(jobs.into_iter().enumerate())
            .map(|(idx, (provider, request))| async move {
                (idx, self.attempt_search(provider, request).await)
            })
            .buffer_unordered(pool)
            .collect()
            .await;
        outcomes.sort_by_key(|(idx, _)| *idx);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }

    // ------------------------------------------------------------------
    // Historical data
    // ------------------------------------------------------------------

    /// First non-empty series from the historical providers, in priority
    /// order. Generates the demo series when nothing answers.
    pub async fn fetch_series(&self, indicator: &str, years: u32) -> HistoricalSeries {
        let years = years.max(1);
        for provider in self.registry.entries(Capability::HistoricalData) {
            let name = provider.descriptor.name.as_str();
            let deadline = self.deadline(Capability::HistoricalData, name);
            let guarded =
                AssertUnwindSafe(provider.client.fetch_series(indicator, years)).catch_unwind();
            let error = match timeout(deadline, guarded).await {
                Ok(Ok(Ok(series))) if !series.is_empty() => {
                    debug!(
                        target: "scout.orchestrator",
                        provider = name,
                        indicator,
                        points = series.points.len(),
                        "historical series fetched"
                    );
                    return series;
                }
                Ok(Ok(Ok(_))) => ProviderError::EmptyResponse(name.to_string()),
                Ok(Ok(Err(err))) => err,
                Ok(Err(payload)) => ProviderError::Other(format!(
                    "provider panicked: {}",
                    panic_message(payload.as_ref())
                )),
                Err(_) => ProviderError::Timeout(format!("{} after {:.1}s", name, deadline.as_secs_f64())),
            };
            warn!(
                target: "scout.orchestrator",
                provider = name,
                indicator,
                code = error.code_str(),
                error = %error,
                "historical provider failed"
            );
        }
        info!(target: "scout.orchestrator", indicator, "no historical provider answered, using demo series");
        demo_series(indicator, years, Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderClient;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl ProviderClient for Echo {
        fn name(&self) -> &str {
            "Echo"
        }

        fn capabilities(&self) -> &'static [Capability] {
            &[Capability::Summarize]
        }

        async fn complete(&self, request: &SummarizeRequest) -> Result<String, ProviderError> {
            Ok(format!("echo: {}", request.query))
        }
    }

    fn orchestrator(registry: ProviderRegistry) -> FallbackOrchestrator {
        FallbackOrchestrator::new(Arc::new(registry), Settings::default())
    }

    #[tokio::test]
    async fn test_detailed_formatting_wraps_provider_answer() {
        let mut registry = ProviderRegistry::new();
        registry.push(Capability::Summarize, Arc::new(Echo));
        let options = ResearchOptions {
            detailed_formatting: true,
            ..ResearchOptions::default()
        };
        let summary = orchestrator(registry)
            .summarize("Plenty of content to summarize here.", "rust", Some(&options))
            .await;
        assert_eq!(summary.provider_name(), "Echo");
        assert!(summary.text().starts_with("# AI Research Summary: rust"));
        assert!(summary.text().contains("echo: rust"));
    }

    #[tokio::test]
    async fn test_insufficient_content_skips_providers() {
        let mut registry = ProviderRegistry::new();
        registry.push(Capability::Summarize, Arc::new(Echo));
        let summary = orchestrator(registry).summarize("hi", "rust", None).await;
        assert!(summary.result.success);
        assert!(summary.used_fallback);
        assert!(summary.attempts.is_empty());
        assert_eq!(summary.format_type, SIMPLE_FORMAT);
    }

    #[tokio::test]
    async fn test_comprehensive_reports_keywords() {
        let summary = orchestrator(ProviderRegistry::new())
            .summarize(
                "Solar panels convert sunlight. Solar farms need land and storage.",
                "solar energy",
                Some(&ResearchOptions::comprehensive()),
            )
            .await;
        assert_eq!(summary.provider_name(), "Comprehensive Fallback");
        assert_eq!(summary.keywords[0], "solar");
        let analysis = summary.content_analysis.unwrap();
        assert_eq!(analysis.keywords_extracted, summary.keywords.len());
    }

    #[tokio::test]
    async fn test_historical_falls_back_to_demo() {
        let series = orchestrator(ProviderRegistry::new())
            .fetch_series("GDP", 2)
            .await;
        assert_eq!(series.source, "Demo Data");
        assert_eq!(series.points.len(), 8);
    }

    #[test]
    fn test_image_quota() {
        assert_eq!(image_quota(1), 1);
        assert_eq!(image_quota(10), 3);
    }
}
