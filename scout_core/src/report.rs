//! Multi-source research reports: summaries, source analysis and citations.

use crate::cache::{cache_key, content_hash, CacheKind};
use crate::fallback::sentences::intelligent_findings;
use crate::formatting::key_points;
use crate::options::{ResearchOptions, SummaryType};
use crate::orchestrator::FallbackOrchestrator;
use crate::providers::{extract_domain, truncate_chars};
use crate::trends::{self, TrendAnalysis};
use crate::types::{SearchHit, SummaryResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

/// Characters of each source's text passed to the summarizer.
const SOURCE_TEXT_CHARS: usize = 2000;
const MAX_KEY_FINDINGS: usize = 10;

const HIGH_AUTHORITY_MARKERS: &[&str] = &[
    ".edu", ".gov", ".org", "nature.com", "science.org", "arxiv.org",
];

/// A fetched source handed to the report builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub title: String,
    pub url: String,
    pub domain: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
}

impl SourceDocument {
    pub fn new(title: impl Into<String>, url: impl Into<String>, text: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            title: title.into(),
            domain: extract_domain(&url),
            url,
            text: text.into(),
            author: None,
            published: None,
        }
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

impl From<&SearchHit> for SourceDocument {
    fn from(hit: &SearchHit) -> Self {
        let published = hit
            .extra
            .get("published_date")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            title: hit.title.clone(),
            url: hit.url.clone(),
            domain: hit.domain.clone(),
            text: hit.snippet.clone(),
            author: None,
            published,
        }
    }
}

/// Every source as one block of text for the summarizer.
pub fn combine_sources(documents: &[SourceDocument]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let n = i + 1;
            let title = if doc.title.trim().is_empty() {
                format!("Source {}", n)
            } else {
                doc.title.clone()
            };
            let mut text = truncate_chars(&doc.text, SOURCE_TEXT_CHARS);
            if doc.text.chars().count() > SOURCE_TEXT_CHARS {
                text.push_str("...");
            }
            format!(
                "Source {}: {}\nDomain: {}\nURL: {}\n\nContent:\n{}\n\n---\n",
                n, title, doc.domain, doc.url, text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainCategory {
    Academic,
    News,
    Government,
    Organization,
    Other,
}

impl DomainCategory {
    /// First matching rule wins, so `.com` news sites beat `.gov` lookalikes.
    pub fn classify(domain: &str) -> Self {
        let domain = domain.to_lowercase();
        if [".edu", "university", "college"].iter().any(|m| domain.contains(m)) {
            DomainCategory::Academic
        } else if [".com", "news", "media"].iter().any(|m| domain.contains(m)) {
            DomainCategory::News
        } else if domain.contains(".gov") {
            DomainCategory::Government
        } else if domain.contains(".org") {
            DomainCategory::Organization
        } else {
            DomainCategory::Other
        }
    }
}

impl fmt::Display for DomainCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DomainCategory::Academic => "academic",
            DomainCategory::News => "news",
            DomainCategory::Government => "government",
            DomainCategory::Organization => "organization",
            DomainCategory::Other => "other",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAnalysis {
    pub total_sources: usize,
    pub unique_domains: usize,
    pub domain_categories: BTreeMap<DomainCategory, Vec<String>>,
    pub diversity_score: f64,
    pub source_quality: String,
}

impl SourceAnalysis {
    pub fn analyze(documents: &[SourceDocument]) -> Self {
        let unique: BTreeSet<&str> = documents.iter().map(|d| d.domain.as_str()).collect();
        let mut domain_categories: BTreeMap<DomainCategory, Vec<String>> = BTreeMap::new();
        for domain in &unique {
            domain_categories
                .entry(DomainCategory::classify(domain))
                .or_default()
                .push(domain.to_string());
        }
        let diversity_score = if documents.is_empty() {
            0.0
        } else {
            crate::historical::round2(unique.len() as f64 / documents.len() as f64)
        };
        Self {
            total_sources: documents.len(),
            unique_domains: unique.len(),
            domain_categories,
            diversity_score,
            source_quality: source_quality(documents).to_string(),
        }
    }
}

/// Label from the share of sources on high-authority domains.
pub fn source_quality(documents: &[SourceDocument]) -> &'static str {
    if documents.is_empty() {
        return "No sources available";
    }
    let high = documents
        .iter()
        .filter(|d| {
            let domain = d.domain.to_lowercase();
            HIGH_AUTHORITY_MARKERS.iter().any(|m| domain.contains(m))
        })
        .count();
    let ratio = high as f64 / documents.len() as f64;
    if ratio >= 0.7 {
        "High quality sources"
    } else if ratio >= 0.4 {
        "Mixed quality sources"
    } else {
        "Variable quality sources"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub id: usize,
    pub title: String,
    pub url: String,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    pub access_date: NaiveDate,
    pub apa: String,
    pub mla: String,
}

/// Year part of a publication date, or "n.d.".
fn citation_year(published: Option<&str>) -> String {
    match published.map(str::trim) {
        Some(date) if date.chars().count() >= 4 => date.chars().take(4).collect(),
        _ => "n.d.".to_string(),
    }
}

impl Citation {
    pub fn new(id: usize, doc: &SourceDocument, access_date: NaiveDate) -> Self {
        let author = doc.author.as_deref().filter(|a| !a.trim().is_empty());
        let title = doc.title.trim();
        let year = citation_year(doc.published.as_deref());

        let mut apa = Vec::new();
        if let Some(author) = author {
            apa.push(format!("{}.", author));
        }
        apa.push(format!("({}).", year));
        if !title.is_empty() {
            apa.push(format!("{}.", title));
        }
        if !doc.domain.is_empty() {
            apa.push(format!("{}.", doc.domain));
        }
        if !doc.url.is_empty() {
            apa.push(format!("Retrieved {} from {}", access_date.format("%Y-%m-%d"), doc.url));
        }

        let mut mla = Vec::new();
        if let Some(author) = author {
            mla.push(format!("{}.", author));
        }
        if !title.is_empty() {
            mla.push(format!("\"{}.\"", title));
        }
        if !doc.domain.is_empty() {
            mla.push(format!("{},", doc.domain));
        }
        mla.push(format!("{},", year));
        if !doc.url.is_empty() {
            mla.push(format!("{}.", doc.url));
        }

        Self {
            id,
            title: if title.is_empty() { "Untitled".to_string() } else { title.to_string() },
            url: doc.url.clone(),
            domain: doc.domain.clone(),
            author: author.map(str::to_string),
            publish_date: doc.published.clone(),
            access_date,
            apa: apa.join(" "),
            mla: mla.join(" "),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub query: String,
    pub summary_type: SummaryType,
    pub total_sources: usize,
    pub generated_at: DateTime<Utc>,
    /// Providers that wrote the summaries, fallback included
    pub providers_used: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<SummaryResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_findings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_analysis: Option<SummaryResult>,
    /// Present when trend analysis is enabled and there are sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_analysis: Option<TrendAnalysis>,
    pub source_analysis: SourceAnalysis,
    pub citations: Vec<Citation>,
    pub metadata: ReportMetadata,
    #[serde(default)]
    pub cached: bool,
}

#[derive(Serialize)]
struct DocumentSignature<'a> {
    url: &'a str,
    title: &'a str,
    word_count: usize,
}

impl ResearchReport {
    /// Build the sections `summary_type` asks for. Brief reports carry an
    /// executive summary, detailed ones key findings and an analysis, and
    /// comprehensive ones all three. Every type gets a trend analysis unless
    /// `Settings::enable_trend_analysis` is off.
    pub async fn build(
        orchestrator: &FallbackOrchestrator,
        documents: &[SourceDocument],
        query: &str,
        summary_type: SummaryType,
    ) -> Self {
        let key = report_cache_key(orchestrator, documents, query, summary_type);
        if let (Some(cache), Some(key)) = (orchestrator.cache(), key.as_deref()) {
            if let Some(mut report) = cache.get_json::<ResearchReport>(CacheKind::Summaries, key).await {
                debug!(target: "scout.report", query, "report served from cache");
                report.cached = true;
                return report;
            }
        }

        let combined = combine_sources(documents);
        let wants_executive = matches!(summary_type, SummaryType::Brief | SummaryType::Comprehensive);
        let wants_analysis = matches!(summary_type, SummaryType::Detailed | SummaryType::Comprehensive);

        let executive_summary = if wants_executive {
            let options = (summary_type == SummaryType::Comprehensive).then(|| ResearchOptions {
                source_count: documents.len(),
                ..ResearchOptions::comprehensive()
            });
            Some(orchestrator.summarize(&combined, query, options.as_ref()).await)
        } else {
            None
        };

        let (detailed_analysis, key_findings) = if wants_analysis {
            let options = ResearchOptions {
                source_count: documents.len(),
                ..ResearchOptions::default()
            };
            let analysis = orchestrator.summarize(&combined, query, Some(&options)).await;
            let mut findings = if analysis.used_fallback {
                intelligent_findings(&combined, query, MAX_KEY_FINDINGS)
            } else {
                key_points(analysis.text())
            };
            findings.truncate(MAX_KEY_FINDINGS);
            (Some(analysis), findings)
        } else {
            (None, Vec::new())
        };

        let trend_analysis = if orchestrator.settings().enable_trend_analysis && !documents.is_empty() {
            Some(trends::analyze(orchestrator, documents, query).await)
        } else {
            None
        };

        let access_date = Utc::now().date_naive();
        let citations = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| Citation::new(i + 1, doc, access_date))
            .collect();

        let mut providers_used: Vec<String> = Vec::new();
        let writers = executive_summary
            .iter()
            .chain(detailed_analysis.iter())
            .map(SummaryResult::provider_name)
            .chain(trend_analysis.iter().map(|t| t.provider_name.as_str()));
        for name in writers {
            if !providers_used.iter().any(|used| used == name) {
                providers_used.push(name.to_string());
            }
        }

        let report = ResearchReport {
            executive_summary,
            key_findings,
            detailed_analysis,
            trend_analysis,
            source_analysis: SourceAnalysis::analyze(documents),
            citations,
            metadata: ReportMetadata {
                query: query.to_string(),
                summary_type,
                total_sources: documents.len(),
                generated_at: Utc::now(),
                providers_used,
            },
            cached: false,
        };

        if let (Some(cache), Some(key)) = (orchestrator.cache(), key.as_deref()) {
            cache.put_json(CacheKind::Summaries, key, &report).await;
        }
        report
    }

    /// Markdown rendering used by the CLI.
    pub fn to_markdown(&self) -> String {
        let mut out = vec![
            format!("# Research Report: {}", self.metadata.query),
            String::new(),
            format!(
                "*{} sources, {} report, generated {}*",
                self.metadata.total_sources,
                self.metadata.summary_type,
                self.metadata.generated_at.format("%Y-%m-%d %H:%M UTC")
            ),
            String::new(),
        ];

        if let Some(summary) = &self.executive_summary {
            out.push("## Executive Summary".to_string());
            out.push(summary.text().to_string());
            out.push(String::new());
        }
        if !self.key_findings.is_empty() {
            out.push("## Key Findings".to_string());
            out.extend(self.key_findings.iter().map(|f| format!("- {}", f)));
            out.push(String::new());
        }
        if let Some(analysis) = &self.detailed_analysis {
            out.push("## Detailed Analysis".to_string());
            out.push(analysis.text().to_string());
            out.push(String::new());
        }
        if let Some(trends) = &self.trend_analysis {
            out.push("## Trend Analysis".to_string());
            for (title, items) in trends.sections() {
                if items.is_empty() {
                    continue;
                }
                out.push(format!("### {}", title));
                out.extend(items.iter().map(|item| format!("- {}", item)));
                out.push(String::new());
            }
            out.push("### Full Trend Analysis".to_string());
            out.push(trends.analysis_text.clone());
            out.push(String::new());
        }

        let sources = &self.source_analysis;
        out.push("## Source Analysis".to_string());
        out.push(format!("- **Total sources**: {}", sources.total_sources));
        out.push(format!("- **Unique domains**: {}", sources.unique_domains));
        out.push(format!("- **Diversity score**: {:.2}", sources.diversity_score));
        out.push(format!("- **Quality**: {}", sources.source_quality));
        for (category, domains) in &sources.domain_categories {
            out.push(format!("- **{}**: {}", category, domains.join(", ")));
        }
        out.push(String::new());

        if !self.citations.is_empty() {
            out.push("## References (APA)".to_string());
            out.extend(self.citations.iter().map(|c| format!("{}. {}", c.id, c.apa)));
            out.push(String::new());
        }
        out.join("\n").trim_end().to_string()
    }
}

fn report_cache_key(
    orchestrator: &FallbackOrchestrator,
    documents: &[SourceDocument],
    query: &str,
    summary_type: SummaryType,
) -> Option<String> {
    orchestrator.cache()?;
    let signatures: Vec<DocumentSignature<'_>> = documents
        .iter()
        .map(|d| DocumentSignature {
            url: &d.url,
            title: &d.title,
            word_count: d.word_count(),
        })
        .collect();
    let key = content_hash(&signatures).and_then(|hash| {
        cache_key(
            CacheKind::Summaries,
            &json!({ "report": hash, "query": query, "summary_type": summary_type }),
        )
    });
    match key {
        Ok(key) => Some(key),
        Err(err) => {
            warn!(target: "scout.report", error = %err, "could not derive report cache key");
            None
        }
    }
}
