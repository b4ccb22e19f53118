use async_trait::async_trait;
use chrono::NaiveDate;
use scout_core::error::ProviderError;
use scout_core::historical::{SeriesPoint, DEMO_SOURCE};
use scout_core::report::{ResearchReport, SourceDocument};
use scout_core::trends::LOCAL_TRENDS;
use scout_core::{
    CacheLayer, Capability, DiskCache, FallbackOrchestrator, HistoricalSeries, NormalizedRequest,
    ProviderClient, ProviderRegistry, ResearchOptions, SearchHit, Settings, SummarizeRequest,
    SummaryType,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const SUMMARIZE: &[Capability] = &[Capability::Summarize];
const SEARCH: &[Capability] = &[Capability::Search];
const IMAGES: &[Capability] = &[Capability::ImageSearch];
const HISTORICAL: &[Capability] = &[Capability::HistoricalData];

const ARTICLE: &str = "Artificial intelligence is transforming healthcare delivery. \
    AI diagnostic tools now detect early signs of disease in medical imaging. \
    Hospitals report that machine learning models reduce wait times by 30 percent. \
    Regulators are developing new frameworks to evaluate AI systems in healthcare. \
    Researchers caution that biased training data can affect patient outcomes.";

enum Behavior {
    Answer(&'static str),
    Fail,
    Panic,
    Slow(Duration),
    Hits(Vec<SearchHit>),
}

struct Fake {
    name: &'static str,
    capabilities: &'static [Capability],
    behavior: Behavior,
    calls: AtomicUsize,
    last_max_results: AtomicUsize,
}

impl Fake {
    fn new(name: &'static str, capabilities: &'static [Capability], behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            name,
            capabilities,
            behavior,
            calls: AtomicUsize::new(0),
            last_max_results: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderClient for Fake {
    fn name(&self) -> &str {
        self.name
    }

    fn capabilities(&self) -> &'static [Capability] {
        self.capabilities
    }

    async fn complete(&self, _request: &SummarizeRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Answer(text) => Ok(text.to_string()),
            Behavior::Panic => panic!("{} blew up", self.name),
            Behavior::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("too late".to_string())
            }
            _ => Err(ProviderError::Upstream {
                status: 500,
                body: "internal error".to_string(),
            }),
        }
    }

    async fn fetch_hits(&self, request: &NormalizedRequest) -> Result<Vec<SearchHit>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_max_results.store(request.max_results, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Hits(hits) => Ok(hits.clone()),
            Behavior::Panic => panic!("{} blew up", self.name),
            Behavior::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(vec![hit("Too late", "https://slow.com/x", self.name)])
            }
            _ => Err(ProviderError::Unavailable(format!("{} is down", self.name))),
        }
    }

    async fn fetch_series(&self, indicator: &str, years: u32) -> Result<HistoricalSeries, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Answer(_) => Ok(HistoricalSeries::new(
                indicator,
                "Test series",
                self.name,
                years,
                vec![
                    SeriesPoint {
                        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                        value: 1.0,
                    },
                    SeriesPoint {
                        date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                        value: 2.0,
                    },
                ],
            )),
            _ => Err(ProviderError::Unavailable(format!("{} is down", self.name))),
        }
    }
}

fn orchestrator(providers: Vec<Arc<Fake>>) -> FallbackOrchestrator {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        let capability = provider.capabilities[0];
        registry.push(capability, provider);
    }
    FallbackOrchestrator::new(Arc::new(registry), Settings::default())
}

fn hit(title: &str, url: &str, source: &str) -> SearchHit {
    SearchHit::new(title, url, source).with_snippet(format!("{} snippet", title))
}

fn image(title: &str, url: &str, source: &str) -> SearchHit {
    SearchHit::new(title, url, source)
        .as_image()
        .with_extra(json!({ "width": 1200, "height": 800 }))
}

#[tokio::test]
async fn test_first_failure_falls_through_to_next_provider() {
    let a = Fake::new("A", SUMMARIZE, Behavior::Fail);
    let b = Fake::new("B", SUMMARIZE, Behavior::Answer("B's summary of the article."));
    let c = Fake::new("C", SUMMARIZE, Behavior::Answer("never asked"));
    let orch = orchestrator(vec![a.clone(), b.clone(), c.clone()]);

    let summary = orch.summarize(ARTICLE, "AI in healthcare", None).await;

    assert!(summary.result.success);
    assert_eq!(summary.provider_name(), "B");
    assert_eq!(summary.text(), "B's summary of the article.");
    assert!(!summary.used_fallback);
    assert_eq!(summary.format_type, "simple");
    assert_eq!(summary.attempts.len(), 2);
    assert_eq!(summary.attempts[0].provider, "A");
    assert!(!summary.attempts[0].success);
    assert_eq!(c.calls(), 0);
}

#[tokio::test]
async fn test_timed_out_provider_is_skipped() {
    let a = Fake::new("A", SUMMARIZE, Behavior::Slow(Duration::from_secs(10)));
    let b = Fake::new("B", SUMMARIZE, Behavior::Answer("fast answer"));
    let orch = orchestrator(vec![a, b]).with_attempt_timeout(Duration::from_millis(100));

    let summary = orch.summarize(ARTICLE, "AI in healthcare", None).await;

    assert_eq!(summary.provider_name(), "B");
    let failed: Vec<_> = summary.failed_attempts().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].provider, "A");
    assert!(failed[0].latency_seconds < 5.0);
}

#[tokio::test]
async fn test_panicking_provider_is_recorded_as_failure() {
    let a = Fake::new("A", SUMMARIZE, Behavior::Panic);
    let b = Fake::new("B", SUMMARIZE, Behavior::Answer("steady answer"));
    let orch = orchestrator(vec![a, b]);

    let summary = orch.summarize(ARTICLE, "AI in healthcare", None).await;

    assert_eq!(summary.provider_name(), "B");
    let error = summary.attempts[0].error.as_deref().unwrap_or_default();
    assert!(error.contains("A blew up"), "unexpected error: {}", error);
}

/// Provider panic isolation relies on unwinding.
#[test]
fn test_release_profile_unwinds_on_panic() {
    let manifest = include_str!("../../Cargo.toml");
    let release = manifest
        .split("[profile.release]")
        .nth(1)
        .and_then(|rest| rest.split("\n[").next())
        .unwrap_or_default();
    assert!(
        !release.contains("panic = \"abort\""),
        "release profile must keep panic unwinding"
    );
}

#[tokio::test]
async fn test_blank_answer_counts_as_failure() {
    let a = Fake::new("A", SUMMARIZE, Behavior::Answer("   "));
    let b = Fake::new("B", SUMMARIZE, Behavior::Answer("real answer"));
    let orch = orchestrator(vec![a, b]);

    let summary = orch.summarize(ARTICLE, "AI in healthcare", None).await;

    assert_eq!(summary.provider_name(), "B");
    assert!(!summary.attempts[0].success);
}

#[tokio::test]
async fn test_no_providers_uses_local_fallback() {
    let orch = orchestrator(Vec::new());

    let summary = orch
        .summarize(ARTICLE, "AI in healthcare", Some(&ResearchOptions::default()))
        .await;

    assert!(summary.result.success);
    assert!(summary.used_fallback);
    assert_eq!(summary.provider_name(), "Enhanced Fallback");
    assert!(summary.text().contains("AI"));
    assert!(summary.text().contains("healthcare"));
    assert!(summary.attempts.is_empty());
}

#[tokio::test]
async fn test_every_provider_failing_still_succeeds() {
    let a = Fake::new("A", SUMMARIZE, Behavior::Fail);
    let b = Fake::new("B", SUMMARIZE, Behavior::Panic);
    let orch = orchestrator(vec![a, b]);

    let summary = orch
        .summarize(ARTICLE, "AI in healthcare", Some(&ResearchOptions::quick()))
        .await;

    assert!(summary.result.success);
    assert!(!summary.text().trim().is_empty());
    assert!(summary.used_fallback);
    assert_eq!(summary.attempts.len(), 2);
    assert!(summary.attempts.iter().all(|a| !a.success));
}

#[tokio::test]
async fn test_empty_text_never_reaches_providers() {
    let a = Fake::new("A", SUMMARIZE, Behavior::Answer("should not be called"));
    let orch = orchestrator(vec![a.clone()]);

    let summary = orch.summarize("", "anything", None).await;

    assert!(summary.result.success);
    assert!(!summary.text().is_empty());
    assert_eq!(a.calls(), 0);
}

#[tokio::test]
async fn test_best_of_prefers_longer_answer() {
    let a = Fake::new("A", SUMMARIZE, Behavior::Answer("short"));
    let b = Fake::new(
        "B",
        SUMMARIZE,
        Behavior::Answer("a much longer and more thorough answer about healthcare and AI"),
    );
    let c = Fake::new("C", SUMMARIZE, Behavior::Fail);
    let orch = orchestrator(vec![a, b, c]);

    let summary = orch.summarize_best_of(ARTICLE, "AI in healthcare", None).await;

    assert_eq!(summary.provider_name(), "B");
    assert_eq!(summary.attempts.len(), 3);
    let order: Vec<_> = summary.attempts.iter().map(|a| a.provider.as_str()).collect();
    assert_eq!(order, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_summarize_all_keeps_priority_order() {
    let a = Fake::new("A", SUMMARIZE, Behavior::Fail);
    let b = Fake::new("B", SUMMARIZE, Behavior::Answer("b"));
    let orch = orchestrator(vec![a, b]);

    let results = orch.summarize_all(ARTICLE, "AI", None).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].provider_name, "A");
    assert!(!results[0].success);
    assert!(results[1].success);
}

#[tokio::test]
async fn test_comprehensive_summary_carries_keywords() {
    let a = Fake::new("A", SUMMARIZE, Behavior::Answer("provider answer"));
    let orch = orchestrator(vec![a]);
    let mut options = ResearchOptions::comprehensive();
    options.source_count = 3;

    let summary = orch.summarize(ARTICLE, "AI in healthcare", Some(&options)).await;

    assert_eq!(summary.format_type, "comprehensive");
    assert!(!summary.keywords.is_empty());
    let analysis = summary.content_analysis.expect("content analysis");
    assert_eq!(analysis.sources_analyzed, 3);
    assert_eq!(analysis.keywords_extracted, summary.keywords.len());
}

#[tokio::test]
async fn test_summary_cache_serves_repeat_calls() {
    let a = Fake::new("A", SUMMARIZE, Behavior::Answer("cached answer"));
    let orch = orchestrator(vec![a.clone()]).with_cache(CacheLayer::memory());

    let first = orch.summarize(ARTICLE, "AI", None).await;
    let second = orch.summarize(ARTICLE, "AI", None).await;

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(second.text(), "cached answer");
    assert_eq!(a.calls(), 1);
}

#[tokio::test]
async fn test_fallback_results_are_not_cached() {
    let a = Fake::new("A", SUMMARIZE, Behavior::Fail);
    let orch = orchestrator(vec![a.clone()]).with_cache(CacheLayer::memory());

    orch.summarize(ARTICLE, "AI", None).await;
    let second = orch.summarize(ARTICLE, "AI", None).await;

    assert!(!second.cached);
    assert!(second.used_fallback);
    assert_eq!(a.calls(), 2);
}

#[tokio::test]
async fn test_disk_cache_survives_new_orchestrator() {
    let dir = tempfile::tempdir().unwrap();
    let store = || {
        CacheLayer::new(Arc::new(DiskCache::new(
            dir.path(),
            Duration::from_secs(3600),
            10 * 1024 * 1024,
        )))
    };
    let a = Fake::new("A", SUMMARIZE, Behavior::Answer("persisted answer"));

    let first = orchestrator(vec![a.clone()]).with_cache(store());
    first.summarize(ARTICLE, "AI", None).await;

    let second = orchestrator(vec![a.clone()]).with_cache(store());
    let summary = second.summarize(ARTICLE, "AI", None).await;

    assert!(summary.cached);
    assert_eq!(summary.text(), "persisted answer");
    assert_eq!(a.calls(), 1);
}

#[tokio::test]
async fn test_search_merges_and_deduplicates() {
    let exa = Fake::new(
        "Exa",
        SEARCH,
        Behavior::Hits(vec![
            hit("AI diagnostics in healthcare", "https://example.com/a", "Exa"),
            hit("Hospital AI adoption", "https://example.com/b", "Exa"),
        ]),
    );
    let tavily = Fake::new(
        "Tavily",
        SEARCH,
        Behavior::Hits(vec![
            hit("AI diagnostics in healthcare (copy)", "https://example.com/a", "Tavily"),
            hit("Healthcare AI regulation", "https://nih.gov/c", "Tavily"),
        ]),
    );
    let broken = Fake::new("Broken", SEARCH, Behavior::Fail);
    let orch = orchestrator(vec![exa, tavily, broken]);
    let mut options = ResearchOptions::default();
    options.include_images = false;

    let response = orch.search("AI healthcare", &options, 10).await;

    let urls: Vec<_> = response.hits.iter().map(|h| h.url.as_str()).collect();
    assert_eq!(urls.len(), 3);
    assert_eq!(urls.iter().filter(|u| **u == "https://example.com/a").count(), 1);
    // first occurrence in priority order wins
    let first = response.hits.iter().find(|h| h.url == "https://example.com/a").unwrap();
    assert_eq!(first.source_name, "Exa");

    assert_eq!(response.meta.providers_queried, vec!["Exa", "Tavily", "Broken"]);
    assert_eq!(response.meta.completed, vec!["Exa", "Tavily"]);
    assert!(response.meta.partial);
    assert_eq!(response.meta.errors[0].provider, "Broken");
    assert_eq!(response.meta.total_before_dedup, 4);
}

#[tokio::test]
async fn test_slow_search_provider_is_cut_off() {
    let slow = Fake::new("Slow", SEARCH, Behavior::Slow(Duration::from_secs(10)));
    let fast = Fake::new(
        "Fast",
        SEARCH,
        Behavior::Hits(vec![hit("Fast answer", "https://fast.com/x", "Fast")]),
    );
    let orch = orchestrator(vec![slow, fast]).with_attempt_timeout(Duration::from_millis(200));
    let mut options = ResearchOptions::default();
    options.include_images = false;

    let started = std::time::Instant::now();
    let response = orch.search("anything", &options, 5).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    let urls: Vec<_> = response.hits.iter().map(|h| h.url.as_str()).collect();
    assert_eq!(urls, vec!["https://fast.com/x"]);
    assert_eq!(response.meta.completed, vec!["Fast"]);
    assert!(response.meta.partial);
    assert_eq!(response.meta.errors.len(), 1);
    assert_eq!(response.meta.errors[0].provider, "Slow");
    assert_eq!(response.meta.errors[0].code, "timeout");
    assert!(response.meta.errors[0].is_timeout);
}

#[tokio::test]
async fn test_search_is_deterministic() {
    let build = || {
        orchestrator(vec![
            Fake::new(
                "Exa",
                SEARCH,
                Behavior::Hits(vec![
                    hit("Solar storage", "https://a.org/1", "Exa"),
                    hit("Wind output", "https://b.com/2", "Exa"),
                ]),
            ),
            Fake::new(
                "Tavily",
                SEARCH,
                Behavior::Hits(vec![hit("Solar grid parity", "https://c.edu/3", "Tavily")]),
            ),
        ])
    };
    let options = ResearchOptions {
        include_images: false,
        ..ResearchOptions::default()
    };

    let first = build().search("solar", &options, 10).await;
    let second = build().search("solar", &options, 10).await;

    let urls = |r: &scout_core::SearchResponse| r.hits.iter().map(|h| h.url.clone()).collect::<Vec<_>>();
    assert_eq!(urls(&first), urls(&second));
}

#[tokio::test]
async fn test_search_mixes_in_images() {
    let exa = Fake::new(
        "Exa",
        SEARCH,
        Behavior::Hits(
            (0..6)
                .map(|i| hit(&format!("Solar {}", i), &format!("https://a.com/{}", i), "Exa"))
                .collect(),
        ),
    );
    let unsplash = Fake::new(
        "Unsplash",
        IMAGES,
        Behavior::Hits(vec![
            image("Solar panels", "https://img.com/1", "Unsplash"),
            image("Solar farm", "https://img.com/2", "Unsplash"),
            image("Solar roof", "https://img.com/3", "Unsplash"),
        ]),
    );
    let orch = orchestrator(vec![exa, unsplash.clone()]);

    let response = orch.search("solar", &ResearchOptions::default(), 6).await;

    assert_eq!(response.text_hits().count(), 6);
    assert_eq!(response.image_hits().count(), 2);
    assert!(response.hits[3].is_image());
    assert_eq!(unsplash.last_max_results.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_search_cache_marks_meta() {
    let exa = Fake::new(
        "Exa",
        SEARCH,
        Behavior::Hits(vec![hit("Cached result", "https://a.com/1", "Exa")]),
    );
    let orch = orchestrator(vec![exa.clone()]).with_cache(CacheLayer::memory());
    let options = ResearchOptions::default();

    let first = orch.search("cache", &options, 5).await;
    let second = orch.search("cache", &options, 5).await;

    assert!(!first.meta.cached);
    assert!(second.meta.cached);
    let urls = |r: &scout_core::SearchResponse| r.hits.iter().map(|h| h.url.clone()).collect::<Vec<_>>();
    assert_eq!(urls(&second), urls(&first));
    assert_eq!(exa.calls(), 1);
}

#[tokio::test]
async fn test_search_without_providers_is_empty() {
    let orch = orchestrator(Vec::new());

    let response = orch.search("nothing", &ResearchOptions::default(), 5).await;

    assert!(response.hits.is_empty());
    assert!(response.meta.providers_queried.is_empty());
    assert!(!response.meta.partial);
}

#[tokio::test]
async fn test_image_search_fills_shortfall_from_last_provider() {
    let unsplash = Fake::new(
        "Unsplash",
        IMAGES,
        Behavior::Hits(vec![
            image("Mountain lake", "https://img.com/1", "Unsplash"),
            image("Mountain peak", "https://img.com/2", "Unsplash"),
        ]),
    );
    let serpapi = Fake::new(
        "SerpAPI Images",
        IMAGES,
        Behavior::Hits(vec![
            image("Mountain lake", "https://img.com/1", "SerpAPI Images"),
            image("Mountain trail", "https://img.com/3", "SerpAPI Images"),
        ]),
    );
    let orch = orchestrator(vec![unsplash.clone(), serpapi.clone()]);

    let response = orch.search_images("mountain", 3).await;

    assert_eq!(unsplash.last_max_results.load(Ordering::SeqCst), 3);
    assert_eq!(serpapi.calls(), 1);
    assert_eq!(serpapi.last_max_results.load(Ordering::SeqCst), 1);
    // the filler's only hit duplicates one already found
    assert_eq!(response.hits.len(), 2);
    assert!(response.hits.iter().all(|h| h.is_image()));
}

#[tokio::test]
async fn test_image_search_skips_fill_when_satisfied() {
    let unsplash = Fake::new(
        "Unsplash",
        IMAGES,
        Behavior::Hits(vec![image("Forest", "https://img.com/1", "Unsplash")]),
    );
    let serpapi = Fake::new("SerpAPI Images", IMAGES, Behavior::Fail);
    let orch = orchestrator(vec![unsplash, serpapi.clone()]);

    let response = orch.search_images("forest", 1).await;

    assert_eq!(response.hits.len(), 1);
    assert_eq!(serpapi.calls(), 0);
}

#[tokio::test]
async fn test_historical_fails_over_then_uses_demo_data() {
    let broken = Fake::new("FRED", HISTORICAL, Behavior::Fail);
    let working = Fake::new("World Bank", HISTORICAL, Behavior::Answer(""));
    let orch = orchestrator(vec![broken.clone(), working]);

    let series = orch.fetch_series("GDP", 2).await;
    assert_eq!(series.source, "World Bank");
    assert_eq!(broken.calls(), 1);

    let orch = orchestrator(vec![Fake::new("FRED", HISTORICAL, Behavior::Panic)]);
    let series = orch.fetch_series("unemployment", 3).await;
    assert_eq!(series.source, DEMO_SOURCE);
    assert_eq!(series.points.len(), 12);
}

#[tokio::test]
async fn test_report_without_providers() {
    let orch = orchestrator(Vec::new());
    let mut paper = SourceDocument::new(
        "AI in clinical practice",
        "https://www.stanford.edu/ai-clinic",
        ARTICLE,
    );
    paper.published = Some("2023-06-01".to_string());
    let documents = vec![
        paper,
        SourceDocument::new("Hospital AI survey", "https://news.example.com/survey", ARTICLE),
    ];

    let report =
        ResearchReport::build(&orch, &documents, "AI in healthcare", SummaryType::Comprehensive).await;

    let executive = report.executive_summary.as_ref().expect("executive summary");
    assert!(executive.used_fallback);
    assert!(report.detailed_analysis.is_some());
    assert!(!report.key_findings.is_empty());
    assert_eq!(report.citations.len(), 2);
    assert!(report.citations[0].apa.starts_with("(2023). AI in clinical practice."));
    assert_eq!(report.source_analysis.unique_domains, 2);
    assert_eq!(report.metadata.total_sources, 2);
    assert!(report.to_markdown().contains("## References (APA)"));

    let trends = report.trend_analysis.as_ref().expect("trend analysis");
    assert!(trends.used_fallback);
    assert_eq!(trends.provider_name, LOCAL_TRENDS);
    assert_eq!(
        trends.emerging_trends,
        vec!["Regulators are developing new frameworks to evaluate AI systems in healthcare."]
    );
    assert!(!trends.recurring_themes.is_empty());
    assert!(report
        .metadata
        .providers_used
        .iter()
        .any(|p| p == LOCAL_TRENDS));
    let markdown = report.to_markdown();
    assert!(markdown.contains("## Trend Analysis\n### Emerging Trends\n- Regulators"));
    assert!(markdown.contains("### Full Trend Analysis"));
}

#[tokio::test]
async fn test_report_trend_analysis_from_provider() {
    let answer = "Emerging trends\n- Diagnostic imaging moves to AI triage\n\
                  Research gaps\n- Few trials measure patient outcomes\n";
    let a = Fake::new("A", SUMMARIZE, Behavior::Answer(answer));
    let orch = orchestrator(vec![a.clone()]);
    let documents = vec![SourceDocument::new("Only source", "https://a.org/x", ARTICLE)];

    let report = ResearchReport::build(&orch, &documents, "AI", SummaryType::Brief).await;

    // executive summary plus trend analysis
    assert_eq!(a.calls(), 2);
    let trends = report.trend_analysis.expect("trend analysis");
    assert!(!trends.used_fallback);
    assert_eq!(trends.provider_name, "A");
    assert_eq!(trends.emerging_trends, vec!["Diagnostic imaging moves to AI triage"]);
    assert_eq!(trends.research_gaps, vec!["Few trials measure patient outcomes"]);
    assert_eq!(trends.attempts.len(), 1);
    assert_eq!(report.metadata.providers_used, vec!["A"]);
}

#[tokio::test]
async fn test_report_trend_analysis_can_be_disabled() {
    let a = Fake::new("A", SUMMARIZE, Behavior::Answer("Brief overview of the sources."));
    let mut registry = ProviderRegistry::new();
    registry.push(Capability::Summarize, a.clone());
    let settings = Settings {
        enable_trend_analysis: false,
        ..Settings::default()
    };
    let orch = FallbackOrchestrator::new(Arc::new(registry), settings);
    let documents = vec![SourceDocument::new("Only source", "https://a.org/x", ARTICLE)];

    let report = ResearchReport::build(&orch, &documents, "AI", SummaryType::Brief).await;

    assert!(report.trend_analysis.is_none());
    assert_eq!(a.calls(), 1);
    assert!(!report.to_markdown().contains("## Trend Analysis"));
}

#[tokio::test]
async fn test_brief_report_has_only_executive_summary() {
    let a = Fake::new("A", SUMMARIZE, Behavior::Answer("Brief overview of the sources."));
    let orch = orchestrator(vec![a]);
    let documents = vec![SourceDocument::new("Only source", "https://a.org/x", ARTICLE)];

    let report = ResearchReport::build(&orch, &documents, "AI", SummaryType::Brief).await;

    assert_eq!(
        report.executive_summary.as_ref().map(|s| s.text()),
        Some("Brief overview of the sources.")
    );
    assert!(report.detailed_analysis.is_none());
    assert!(report.key_findings.is_empty());
    assert_eq!(report.metadata.providers_used, vec!["A"]);
}
