//! Pretty formatter for terminal output.
//!
//! Bold titles, dimmed metadata, cards for result lists and tables for
//! columnar data. Long text is wrapped to the terminal, never truncated
//! mid-word.

use super::OutputData;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::{OwoColorize, Stream, Style};
use scout_core::cache::CacheStats;
use scout_core::historical::SeriesAnalysis;
use scout_core::report::ResearchReport;
use scout_core::{Capabilities, HistoricalSeries, ProviderDescriptor, SearchResponse, SummaryResult};
use serde_json::Value;
use std::fmt::Display;

/// Terminal width for formatting (default fallback)
const DEFAULT_WIDTH: usize = 80;

/// Prose is never wrapped wider than this
const MAX_TEXT_WIDTH: usize = 100;

/// Indent for card content (after number)
const CARD_INDENT: usize = 6;

const SNIPPET_CHARS: usize = 300;

#[derive(Debug, Clone, Copy)]
pub enum Tone {
    Heading,
    Accent,
    Good,
    Warn,
    Bad,
    Dim,
    Strong,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Tone::Heading => Style::new().cyan().bold(),
            Tone::Accent => Style::new().cyan(),
            Tone::Good => Style::new().green(),
            Tone::Warn => Style::new().yellow(),
            Tone::Bad => Style::new().red().bold(),
            Tone::Dim => Style::new().dimmed(),
            Tone::Strong => Style::new().bold(),
        }
    }
}

/// Colorize for stdout unless colors are disabled or unsupported.
pub fn paint<T: Display>(text: T, tone: Tone) -> String {
    text.if_supports_color(Stream::Stdout, |t| t.style(tone.style()))
        .to_string()
}

pub fn paint_stderr<T: Display>(text: T, tone: Tone) -> String {
    text.if_supports_color(Stream::Stderr, |t| t.style(tone.style()))
        .to_string()
}

pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

pub fn render(data: &OutputData, width: usize) -> String {
    match data {
        OutputData::Summary { query, summary } => render_summary(query, summary, width),
        OutputData::SearchResults(response) => render_hits("Search", response, width),
        OutputData::Images(response) => render_hits("Images", response, width),
        OutputData::Series { series, analysis } => render_series(series, analysis.as_ref(), width),
        OutputData::Report(report) => render_report(report, width),
        OutputData::Providers(descriptors) => render_providers(descriptors, width),
        OutputData::Status(caps) => render_status(caps, width),
        OutputData::CacheStats(stats) => render_cache_stats(stats, width),
        OutputData::CacheCleared { kind, removed } => format!(
            "{} Removed {} cached entries from {}\n",
            paint("✓", Tone::Good),
            paint(removed, Tone::Strong),
            kind.map(|k| k.to_string())
                .unwrap_or_else(|| "all kinds".to_string())
        ),
        OutputData::ConfigInfo(config) => render_config(config, width),
    }
}

// ============================================================================
// Summaries and reports
// ============================================================================

fn render_summary(query: &str, summary: &SummaryResult, width: usize) -> String {
    let mut out = section_header(&format!("Summary: {}", query), width);
    out.push_str("\n\n");
    out.push_str(&wrap_block(summary.text(), width, "  "));
    out.push_str("\n\n");

    let mut via = format!(
        "  {} {} {}",
        paint("via", Tone::Dim),
        paint(summary.provider_name(), Tone::Good),
        paint(format!("({:.1}s, {})", summary.result.latency_seconds, summary.format_type), Tone::Dim)
    );
    if summary.cached {
        via.push_str(&format!(" {}", paint("[cached]", Tone::Accent)));
    }
    if summary.used_fallback {
        via.push_str(&format!(" {}", paint("[local fallback]", Tone::Warn)));
    }
    out.push_str(&via);
    out.push('\n');

    for attempt in summary.failed_attempts() {
        out.push_str(&format!(
            "  {} {} {}\n",
            paint("✗", Tone::Bad),
            attempt.provider,
            paint(attempt.error.as_deref().unwrap_or("failed"), Tone::Dim)
        ));
    }
    if !summary.keywords.is_empty() {
        let keywords = summary.keywords.iter().take(12).cloned().collect::<Vec<_>>().join(", ");
        out.push_str(&format!("  {} {}\n", paint("Keywords:", Tone::Dim), keywords));
    }
    out
}

fn render_report(report: &ResearchReport, width: usize) -> String {
    let mut out = String::new();
    for line in report.to_markdown().lines() {
        if let Some(title) = line.strip_prefix("# ") {
            out.push_str(&section_header(title, width));
        } else if let Some(title) = line.strip_prefix("## ") {
            out.push_str(&paint(title, Tone::Heading));
        } else if let Some(title) = line.strip_prefix("### ") {
            out.push_str(&format!(" {}", paint(title, Tone::Strong)));
        } else if line.trim().is_empty() {
            // keep paragraph breaks
        } else {
            out.push_str(&wrap_block(line, width, "  "));
        }
        out.push('\n');
    }
    if report.cached {
        out.push_str(&format!("  {}\n", paint("[cached]", Tone::Accent)));
    }
    out
}

// ============================================================================
// Result cards
// ============================================================================

fn render_hits(label: &str, response: &SearchResponse, width: usize) -> String {
    let mut out = section_header(
        &format!("{}: {} ({} results)", label, response.meta.query, response.hits.len()),
        width,
    );
    out.push('\n');

    if response.hits.is_empty() {
        out.push_str(&format!("\n  {}\n", paint("No results.", Tone::Warn)));
    }
    for (i, hit) in response.hits.iter().enumerate() {
        out.push('\n');
        let marker = if hit.is_image() {
            format!(" {}", paint("[image]", Tone::Accent))
        } else {
            String::new()
        };
        out.push_str(&format!(
            " {:>3}. {}{}\n",
            paint(i + 1, Tone::Heading),
            paint(&hit.title, Tone::Strong),
            marker
        ));
        let indent = " ".repeat(CARD_INDENT);
        out.push_str(&format!("{}{}\n", indent, paint(&hit.url, Tone::Accent)));
        if !hit.snippet.trim().is_empty() {
            let snippet = truncate_str(&clean_snippet(&hit.snippet), SNIPPET_CHARS);
            out.push_str(&wrap_block(&snippet, width, &indent));
            out.push('\n');
        }
        out.push_str(&format!(
            "{}{}\n",
            indent,
            paint(format!("{} · {} · score {:.1}", hit.source_name, hit.domain, hit.score), Tone::Dim)
        ));
    }

    out.push('\n');
    let meta = &response.meta;
    if !meta.completed.is_empty() {
        out.push_str(&format!(
            "  {} {}\n",
            paint("Providers:", Tone::Dim),
            meta.completed.join(", ")
        ));
    }
    for failure in &meta.errors {
        out.push_str(&format!(
            "  {} {} {}\n",
            paint("✗", Tone::Bad),
            failure.provider,
            paint(&failure.error, Tone::Dim)
        ));
    }
    if meta.cached {
        out.push_str(&format!("  {}\n", paint("[cached]", Tone::Accent)));
    }
    out
}

// ============================================================================
// Tables
// ============================================================================

fn new_table(width: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(width.min(u16::MAX as usize) as u16);
    table
}

fn render_series(series: &HistoricalSeries, analysis: Option<&SeriesAnalysis>, width: usize) -> String {
    let mut out = section_header(&series.title, width);
    out.push_str(&format!(
        "\n  {} {}  {} {} years\n\n",
        paint("Source:", Tone::Dim),
        series.source,
        paint("Period:", Tone::Dim),
        series.period_years
    ));

    let mut table = new_table(width.min(60));
    table.set_header(vec!["Date", "Value"]);
    for point in &series.points {
        table.add_row(vec![point.date.to_string(), format!("{:.2}", point.value)]);
    }
    out.push_str(&table.to_string());
    out.push('\n');

    if let Some(a) = analysis {
        let change = format!("{:+.2}%", a.change_pct);
        let change = if a.change_pct >= 0.0 {
            paint(change, Tone::Good)
        } else {
            paint(change, Tone::Bad)
        };
        out.push_str(&format!(
            "\n  {} {:.2}  {} {:.2}  {} {:.2}..{:.2}  {} {}\n  {} {}  {} {}\n",
            paint("Current", Tone::Dim),
            a.current_value,
            paint("Average", Tone::Dim),
            a.avg_value,
            paint("Range", Tone::Dim),
            a.min,
            a.max,
            paint("Change", Tone::Dim),
            change,
            paint("Trend", Tone::Dim),
            a.trend,
            paint("Pattern", Tone::Dim),
            a.pattern
        ));
    }
    out
}

fn render_providers(descriptors: &[ProviderDescriptor], width: usize) -> String {
    let mut out = section_header("Providers", width);
    out.push_str("\n\n");
    if descriptors.is_empty() {
        out.push_str(&format!("  {}\n", paint("No providers configured.", Tone::Warn)));
        return out;
    }
    let mut table = new_table(width);
    table.set_header(vec!["Capability", "Priority", "Provider", "Credential"]);
    for d in descriptors {
        let credential = if d.credential_present { "environment" } else { "local" };
        table.add_row(vec![
            d.capability.to_string(),
            d.priority.to_string(),
            d.name.clone(),
            credential.to_string(),
        ]);
    }
    out.push_str(&table.to_string());
    out.push('\n');
    out
}

/// Display label and state for every capability flag.
pub fn capability_rows(caps: &Capabilities) -> Vec<(&'static str, bool)> {
    vec![
        ("AI summarization", caps.ai_summarization),
        ("Web search", caps.web_search),
        ("Image search", caps.image_search),
        ("Historical data", caps.historical_data),
        ("OCR", caps.ocr_available),
        ("Advanced extraction", caps.advanced_extraction_available),
    ]
}

fn render_status(caps: &Capabilities, width: usize) -> String {
    let mut out = section_header("Status", width);
    out.push_str("\n\n");
    for (label, on) in capability_rows(caps) {
        let mark = if on {
            paint("✓", Tone::Good)
        } else {
            paint("✗", Tone::Bad)
        };
        out.push_str(&format!("  {} {}\n", mark, label));
    }
    out.push('\n');
    if caps.fully_operational {
        out.push_str(&format!("  {}\n", paint("Fully operational", Tone::Good)));
    } else {
        out.push_str(&format!(
            "  {} {}\n",
            paint("Partially operational:", Tone::Warn),
            "missing capabilities fall back to local analysis or demo data"
        ));
    }
    out
}

fn render_cache_stats(stats: &CacheStats, width: usize) -> String {
    let mut out = section_header("Cache", width);
    out.push_str("\n\n");
    let mut table = new_table(width.min(60));
    table.set_header(vec!["Kind", "Files", "Size (MB)"]);
    for (kind, entry) in &stats.by_kind {
        table.add_row(vec![
            kind.to_string(),
            entry.files.to_string(),
            format!("{:.2}", entry.size_mb),
        ]);
    }
    out.push_str(&table.to_string());
    out.push_str(&format!(
        "\n\n  {} {} files, {:.2} of {} MB, entries expire after {}h\n",
        paint("Total:", Tone::Dim),
        stats.total_files,
        stats.total_size_mb,
        stats.max_size_mb,
        stats.expiry_hours
    ));
    out
}

fn render_config(config: &Value, width: usize) -> String {
    let mut out = section_header("Configuration", width);
    out.push_str("\n\n");
    let Some(obj) = config.as_object() else {
        out.push_str(&config.to_string());
        out.push('\n');
        return out;
    };
    let mut table = new_table(width);
    table.set_header(vec!["Key", "Value"]);
    for (key, value) in obj {
        let shown = match value {
            Value::String(s) => s.clone(),
            Value::Null => "-".to_string(),
            other => other.to_string(),
        };
        table.add_row(vec![key.clone(), shown]);
    }
    out.push_str(&table.to_string());
    out.push('\n');
    out
}

// ============================================================================
// Helpers
// ============================================================================

fn section_header(label: &str, width: usize) -> String {
    let line_len = width.saturating_sub(label.chars().count() + 4).min(60);
    format!(
        "{} {} {}",
        paint("──", Tone::Accent),
        paint(label, Tone::Heading),
        paint("─".repeat(line_len), Tone::Accent)
    )
}

/// Wrap each line of `text` to the terminal, keeping blank lines.
fn wrap_block(text: &str, width: usize, indent: &str) -> String {
    let width = width.clamp(20, MAX_TEXT_WIDTH);
    let options = textwrap::Options::new(width)
        .initial_indent(indent)
        .subsequent_indent(indent);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                textwrap::fill(line, &options)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated.trim_end())
    }
}

fn clean_snippet(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::SearchHit;

    #[test]
    fn test_truncate_str() {
        let long = "This is a very long string that should be truncated";
        let truncated = truncate_str(long, 20);
        assert!(truncated.ends_with("..."));
        assert!(truncated.chars().count() <= 20);
    }

    #[test]
    fn test_wrap_block_indents_every_line() {
        let wrapped = wrap_block(&"word ".repeat(40), 40, "  ");
        assert!(wrapped.lines().count() > 1);
        assert!(wrapped.lines().all(|l| l.starts_with("  ")));
    }

    #[test]
    fn test_render_hits_card() {
        let mut response = SearchResponse::empty("rust");
        response.hits = vec![SearchHit::new("The Book", "https://doc.rust-lang.org/book", "Exa")
            .with_snippet("Learn\n  Rust")];
        response.meta.completed = vec!["Exa".to_string()];
        let out = render_hits("Search", &response, 80);
        assert!(out.contains("The Book"));
        assert!(out.contains("doc.rust-lang.org"));
        assert!(out.contains("Learn Rust"));
    }

    #[test]
    fn test_capability_rows() {
        let caps = Capabilities {
            web_search: true,
            ..Capabilities::default()
        };
        let rows = capability_rows(&caps);
        assert_eq!(rows.len(), 6);
        assert!(rows.contains(&("Web search", true)));
    }
}
