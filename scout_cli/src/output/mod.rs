use crate::cli::OutputFormat;
use crate::commands::Result;
use scout_core::cache::CacheStats;
use scout_core::historical::SeriesAnalysis;
use scout_core::report::ResearchReport;
use scout_core::{
    CacheKind, Capabilities, HistoricalSeries, ProviderDescriptor, SearchResponse, SummaryResult,
};
use serde::Serialize;
use serde_json::Value;

mod pretty;
pub use pretty::{paint, paint_stderr, terminal_width, Tone};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputData {
    Summary {
        query: String,
        summary: SummaryResult,
    },
    SearchResults(SearchResponse),
    Images(SearchResponse),
    Series {
        series: HistoricalSeries,
        analysis: Option<SeriesAnalysis>,
    },
    Report(ResearchReport),
    Providers(Vec<ProviderDescriptor>),
    Status(Capabilities),
    CacheStats(CacheStats),
    CacheCleared {
        kind: Option<CacheKind>,
        removed: usize,
    },
    ConfigInfo(Value),
}

pub fn format_output(data: &OutputData, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(data)?);
        }
        OutputFormat::Text => {
            print!("{}", format_text_output(data)?);
        }
        OutputFormat::Markdown => {
            print!("{}", format_markdown_output(data)?);
        }
        OutputFormat::Pretty => {
            print!("{}", pretty::render(data, terminal_width()));
        }
    }
    Ok(())
}

fn format_text_output(data: &OutputData) -> Result<String> {
    let mut out = String::new();
    match data {
        OutputData::Summary { summary, .. } => {
            out.push_str(summary.text());
            out.push('\n');
        }
        OutputData::SearchResults(response) | OutputData::Images(response) => {
            for hit in &response.hits {
                out.push_str(&format!("{}\t{}\t{}\n", hit.title, hit.url, hit.source_name));
            }
        }
        OutputData::Series { series, .. } => {
            for point in &series.points {
                out.push_str(&format!("{}\t{}\n", point.date, point.value));
            }
        }
        OutputData::Report(report) => {
            out.push_str(&report.to_markdown());
            out.push('\n');
        }
        OutputData::Providers(descriptors) => {
            for d in descriptors {
                out.push_str(&format!("{}\t{}\t{}\n", d.capability, d.priority, d.name));
            }
        }
        OutputData::Status(caps) => {
            for (label, on) in pretty::capability_rows(caps) {
                out.push_str(&format!("{}\t{}\n", label, on));
            }
        }
        OutputData::CacheStats(stats) => {
            for (kind, entry) in &stats.by_kind {
                out.push_str(&format!("{}\t{}\t{:.2}\n", kind, entry.files, entry.size_mb));
            }
        }
        OutputData::CacheCleared { removed, .. } => {
            out.push_str(&format!("{}\n", removed));
        }
        OutputData::ConfigInfo(config) => {
            out.push_str(&serde_json::to_string_pretty(config)?);
            out.push('\n');
        }
    }
    Ok(out)
}

fn fenced_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(format!("```json\n{}\n```\n", serde_json::to_string_pretty(value)?))
}

fn format_markdown_output(data: &OutputData) -> Result<String> {
    let out = match data {
        OutputData::Summary { query, summary } => format!(
            "# Summary: {}\n\n{}\n\n*Provider: {}*\n",
            query,
            summary.text(),
            summary.provider_name()
        ),
        OutputData::SearchResults(response) | OutputData::Images(response) => {
            let mut out = format!("# Search Results: {}\n\n", response.meta.query);
            for (i, hit) in response.hits.iter().enumerate() {
                if hit.is_image() {
                    out.push_str(&format!("{}. ![{}]({})\n", i + 1, hit.title, hit.url));
                } else if hit.snippet.is_empty() {
                    out.push_str(&format!("{}. [{}]({})\n", i + 1, hit.title, hit.url));
                } else {
                    out.push_str(&format!(
                        "{}. [{}]({}): {}\n",
                        i + 1,
                        hit.title,
                        hit.url,
                        hit.snippet.replace('\n', " ")
                    ));
                }
            }
            out
        }
        OutputData::Series { series, analysis } => {
            let mut out = format!("# {}\n\n*Source: {}*\n\n", series.title, series.source);
            out.push_str("| Date | Value |\n|------|-------|\n");
            for point in &series.points {
                out.push_str(&format!("| {} | {:.2} |\n", point.date, point.value));
            }
            if let Some(a) = analysis {
                out.push_str(&format!(
                    "\nTrend: {} ({:+.2}%), pattern: {}\n",
                    a.trend, a.change_pct, a.pattern
                ));
            }
            out
        }
        OutputData::Report(report) => format!("{}\n", report.to_markdown()),
        OutputData::Providers(descriptors) => {
            let mut out = String::from("# Providers\n\n| Capability | Priority | Provider |\n|---|---|---|\n");
            for d in descriptors {
                out.push_str(&format!("| {} | {} | {} |\n", d.capability, d.priority, d.name));
            }
            out
        }
        OutputData::Status(caps) => {
            let mut out = String::from("# Status\n\n");
            for (label, on) in pretty::capability_rows(caps) {
                out.push_str(&format!("- {}: {}\n", label, if on { "yes" } else { "no" }));
            }
            out
        }
        OutputData::CacheStats(stats) => format!("# Cache\n\n{}", fenced_json(stats)?),
        OutputData::CacheCleared { kind, removed } => format!(
            "Removed {} cached entries from {}.\n",
            removed,
            kind.map(|k| k.to_string()).unwrap_or_else(|| "all kinds".to_string())
        ),
        OutputData::ConfigInfo(config) => format!("# Configuration\n\n{}", fenced_json(config)?),
    };
    Ok(out)
}
