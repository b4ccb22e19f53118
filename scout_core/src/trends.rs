//! Trend section of research reports.
//!
//! The summarization chain is asked for a sectioned trend analysis and the
//! answer is bucketed by its headings. Without a provider the buckets are
//! filled from marker words in the source text.

use crate::cpu_pool::spawn_cpu;
use crate::fallback::extract_keywords;
use crate::fallback::sentences::{matching_sentences, perspectives};
use crate::orchestrator::FallbackOrchestrator;
use crate::prompts::trend_request;
use crate::report::{combine_sources, SourceDocument};
use crate::types::AttemptRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const LOCAL_TRENDS: &str = "Local Trend Scan";

/// Items kept per bucket by the local scan.
const LOCAL_ITEMS: usize = 3;
const LOCAL_THEMES: usize = 6;

const EMERGING_MARKERS: &[&str] = &[
    "emerging", "growing", "increasing", "rising", "new ", "trend", "accelerat",
];
const CONSENSUS_MARKERS: &[&str] = &[
    "consensus", "agree", "widely", "consistent", "established", "well known",
];
const GAP_MARKERS: &[&str] = &[
    "limited", "unclear", "unknown", " lack", "gap", "further research", "remains to",
    "not yet",
];
const FUTURE_MARKERS: &[&str] = &[
    "future", " will ", "expected", "forecast", "next decade", "by 20", "plans to",
];

/// Heading keywords per bucket, checked in this order.
const SECTION_KEYWORDS: &[(TrendSection, &[&str])] = &[
    (TrendSection::Emerging, &["emerging", "trend"]),
    (TrendSection::Recurring, &["recurring", "theme"]),
    (TrendSection::Consensus, &["consensus", "agreement"]),
    (TrendSection::Debates, &["debate", "disagreement", "controversy"]),
    (TrendSection::Gaps, &["gap", "limitation", "missing"]),
    (TrendSection::Future, &["future", "direction", "recommendation"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrendSection {
    Emerging,
    Recurring,
    Consensus,
    Debates,
    Gaps,
    Future,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    #[serde(default)]
    pub emerging_trends: Vec<String>,
    #[serde(default)]
    pub recurring_themes: Vec<String>,
    #[serde(default)]
    pub consensus_points: Vec<String>,
    #[serde(default)]
    pub debates: Vec<String>,
    #[serde(default)]
    pub research_gaps: Vec<String>,
    #[serde(default)]
    pub future_directions: Vec<String>,
    /// Full answer, or a prose digest of the local scan
    pub analysis_text: String,
    pub provider_name: String,
    #[serde(default)]
    pub used_fallback: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<AttemptRecord>,
}

impl TrendAnalysis {
    fn bucket(&mut self, section: TrendSection) -> &mut Vec<String> {
        match section {
            TrendSection::Emerging => &mut self.emerging_trends,
            TrendSection::Recurring => &mut self.recurring_themes,
            TrendSection::Consensus => &mut self.consensus_points,
            TrendSection::Debates => &mut self.debates,
            TrendSection::Gaps => &mut self.research_gaps,
            TrendSection::Future => &mut self.future_directions,
        }
    }

    /// Bucket titles and their items, in report order.
    pub fn sections(&self) -> [(&'static str, &[String]); 6] {
        [
            ("Emerging Trends", self.emerging_trends.as_slice()),
            ("Recurring Themes", self.recurring_themes.as_slice()),
            ("Consensus", self.consensus_points.as_slice()),
            ("Debates", self.debates.as_slice()),
            ("Research Gaps", self.research_gaps.as_slice()),
            ("Future Directions", self.future_directions.as_slice()),
        ]
    }

    pub fn item_count(&self) -> usize {
        self.sections().iter().map(|(_, items)| items.len()).sum()
    }

    /// Bucket a provider's answer by its headings.
    ///
    /// A line naming a bucket keyword starts that bucket unless it is a
    /// `-`, `*` or `•` bullet. Bullets and numbered items go to the current
    /// bucket with their marker stripped; other prose is ignored. Numbered
    /// lines that name a keyword are headings.
    pub fn parse(answer: &str, provider_name: &str) -> Self {
        let mut analysis = TrendAnalysis {
            analysis_text: answer.trim().to_string(),
            provider_name: provider_name.to_string(),
            ..TrendAnalysis::default()
        };
        let mut current = None;

        for line in answer.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let item = list_item(line);
            let may_head = !matches!(item, Some(ListItem::Bullet(_)));
            if may_head {
                if let Some(section) = section_for(line) {
                    current = Some(section);
                    continue;
                }
            }
            let text = match item {
                Some(ListItem::Bullet(text) | ListItem::Numbered(text)) => clean_item(text),
                None => continue,
            };
            if let (Some(section), false) = (current, text.is_empty()) {
                analysis.bucket(section).push(text);
            }
        }
        analysis
    }

    /// Fill the buckets from marker words in `content`.
    pub fn local(content: &str, query: &str) -> Self {
        let mut analysis = TrendAnalysis {
            emerging_trends: matching_sentences(content, EMERGING_MARKERS, LOCAL_ITEMS),
            recurring_themes: extract_keywords(content, query)
                .into_iter()
                .take(LOCAL_THEMES)
                .collect(),
            consensus_points: matching_sentences(content, CONSENSUS_MARKERS, LOCAL_ITEMS),
            debates: perspectives(content, LOCAL_ITEMS)
                .into_iter()
                .map(|s| clean_item(&s))
                .collect(),
            research_gaps: matching_sentences(content, GAP_MARKERS, LOCAL_ITEMS),
            future_directions: matching_sentences(content, FUTURE_MARKERS, LOCAL_ITEMS),
            provider_name: LOCAL_TRENDS.to_string(),
            used_fallback: true,
            ..TrendAnalysis::default()
        };
        analysis.analysis_text = local_digest(&analysis, query);
        analysis
    }
}

enum ListItem<'a> {
    Bullet(&'a str),
    Numbered(&'a str),
}

fn list_item(line: &str) -> Option<ListItem<'_>> {
    for marker in ["• ", "- ", "* "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(ListItem::Bullet(rest));
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix('.') {
            return Some(ListItem::Numbered(rest));
        }
    }
    None
}

/// Keywords match word prefixes, so "disagreement" is not "agreement".
fn section_for(line: &str) -> Option<TrendSection> {
    let lower = line.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    SECTION_KEYWORDS
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|k| words.iter().any(|w| w.starts_with(k)))
        })
        .map(|(section, _)| *section)
}

fn clean_item(text: &str) -> String {
    text.trim().trim_matches('*').trim().to_string()
}

fn local_digest(analysis: &TrendAnalysis, query: &str) -> String {
    let mut lines = vec![format!(
        "Trend scan of the collected material on '{}' without an AI provider.",
        query
    )];
    if !analysis.recurring_themes.is_empty() {
        lines.push(format!(
            "Recurring themes: {}.",
            analysis.recurring_themes.join(", ")
        ));
    }
    let counted: Vec<String> = analysis
        .sections()
        .iter()
        .filter(|(title, items)| *title != "Recurring Themes" && !items.is_empty())
        .map(|(title, items)| format!("{} {}", items.len(), title.to_lowercase()))
        .collect();
    if counted.is_empty() {
        lines.push("No trend markers were found in the source text.".to_string());
    } else {
        lines.push(format!("Signals found: {}.", counted.join(", ")));
    }
    lines.join(" ")
}

/// Trend analysis of `documents` through the summarization chain, or the
/// local scan of their text when no provider answers.
pub async fn analyze(
    orchestrator: &FallbackOrchestrator,
    documents: &[SourceDocument],
    query: &str,
) -> TrendAnalysis {
    let request = trend_request(
        &combine_sources(documents),
        query,
        orchestrator.settings().temperature,
    );
    let (winner, attempts) = orchestrator.failover(&request).await;
    if let Some(result) = winner {
        let mut analysis = TrendAnalysis::parse(&result.text, &result.provider_name);
        debug!(
            target: "scout.report",
            provider = %analysis.provider_name,
            items = analysis.item_count(),
            "trend analysis parsed"
        );
        analysis.attempts = attempts;
        return analysis;
    }

    info!(target: "scout.report", attempted = attempts.len(), "no provider for trend analysis, scanning locally");
    let text = documents
        .iter()
        .map(|doc| doc.text.trim().trim_end_matches('.'))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(". ");
    let q = query.to_string();
    let mut analysis = match spawn_cpu("trend scan", move || Ok(TrendAnalysis::local(&text, &q))).await {
        Ok(analysis) => analysis,
        Err(err) => {
            warn!(target: "scout.report", error = %err, "local trend scan failed");
            TrendAnalysis {
                analysis_text: format!("Trend analysis for '{}' is unavailable.", query),
                provider_name: LOCAL_TRENDS.to_string(),
                used_fallback: true,
                ..TrendAnalysis::default()
            }
        }
    };
    analysis.attempts = attempts;
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWER: &str = "## Trend Analysis\n\
        1. **Emerging Trends**\n\
        - Utilities are pairing batteries with solar farms\n\
        - Sodium cells are entering pilot production\n\
        2. **Recurring Themes**\n\
        * Cost per kilowatt-hour\n\
        Some prose the parser ignores.\n\
        3. Consensus\n\
        • Storage is needed for high renewable shares\n\
        4. Debates and Disagreement\n\
        - Whether hydrogen competes on cost\n\
        5. Research Gaps\n\
        1. Long-term degradation data\n\
        6. Future Directions\n\
        - Recycling at scale\n";

    #[test]
    fn test_parse_buckets_by_heading() {
        let analysis = TrendAnalysis::parse(ANSWER, "OpenAI");
        assert_eq!(
            analysis.emerging_trends,
            vec![
                "Utilities are pairing batteries with solar farms",
                "Sodium cells are entering pilot production"
            ]
        );
        assert_eq!(analysis.recurring_themes, vec!["Cost per kilowatt-hour"]);
        assert_eq!(
            analysis.consensus_points,
            vec!["Storage is needed for high renewable shares"]
        );
        assert_eq!(analysis.debates, vec!["Whether hydrogen competes on cost"]);
        assert_eq!(analysis.research_gaps, vec!["Long-term degradation data"]);
        assert_eq!(analysis.future_directions, vec!["Recycling at scale"]);
        assert_eq!(analysis.item_count(), 7);
        assert_eq!(analysis.analysis_text, ANSWER.trim());
        assert_eq!(analysis.provider_name, "OpenAI");
        assert!(!analysis.used_fallback);
    }

    #[test]
    fn test_bullet_mentioning_keyword_stays_an_item() {
        let answer = "Emerging trends:\n- A growing trend toward home batteries\n- Missing grid data\n";
        let analysis = TrendAnalysis::parse(answer, "Gemini");
        assert_eq!(
            analysis.emerging_trends,
            vec!["A growing trend toward home batteries", "Missing grid data"]
        );
        assert!(analysis.research_gaps.is_empty());
    }

    #[test]
    fn test_disagreement_heading_is_a_debate() {
        let answer = "Consensus vs. disagreement\n- Costs are falling\nDisagreement\n- Grid fees\n";
        let analysis = TrendAnalysis::parse(answer, "Gemini");
        assert_eq!(analysis.consensus_points, vec!["Costs are falling"]);
        assert_eq!(analysis.debates, vec!["Grid fees"]);
    }

    #[test]
    fn test_parse_without_headings_keeps_text() {
        let analysis = TrendAnalysis::parse("- orphan bullet\nplain answer", "Claude");
        assert_eq!(analysis.item_count(), 0);
        assert_eq!(analysis.analysis_text, "- orphan bullet\nplain answer");
    }

    #[test]
    fn test_local_scan() {
        let content = "Home battery installs are growing every quarter. \
            Most analysts agree that storage lowers peak prices. \
            However, critics argue that subsidies distort the market. \
            Data on battery lifetimes remains limited for older systems. \
            Installers will need new certification schemes within the decade.";
        let analysis = TrendAnalysis::local(content, "home batteries");

        assert!(analysis.used_fallback);
        assert_eq!(analysis.provider_name, LOCAL_TRENDS);
        assert_eq!(
            analysis.emerging_trends[0],
            "Home battery installs are growing every quarter."
        );
        assert_eq!(
            analysis.consensus_points,
            vec!["Most analysts agree that storage lowers peak prices."]
        );
        assert_eq!(
            analysis.debates,
            vec!["However, critics argue that subsidies distort the market"]
        );
        assert_eq!(
            analysis.research_gaps,
            vec!["Data on battery lifetimes remains limited for older systems."]
        );
        assert_eq!(
            analysis.future_directions,
            vec!["Installers will need new certification schemes within the decade."]
        );
        assert!(!analysis.recurring_themes.is_empty());
        assert!(analysis.analysis_text.contains("'home batteries'"));
        assert!(analysis.analysis_text.contains("1 research gaps"));
    }

    #[test]
    fn test_local_scan_without_markers() {
        let analysis = TrendAnalysis::local("Plain words. Nothing else here at all.", "q");
        assert_eq!(analysis.emerging_trends.len(), 0);
        assert!(analysis
            .analysis_text
            .contains("No trend markers were found"));
    }
}
