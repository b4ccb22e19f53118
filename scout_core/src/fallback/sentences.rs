//! Sentence splitting, scoring and extraction heuristics.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Sentences this short carry no finding.
const MIN_SENTENCE_CHARS: usize = 20;

/// Intelligent findings only look at the head of the document.
const FINDINGS_SCAN_LIMIT: usize = 50;

const RESEARCH_WORDS: &[&str] = &["study", "research", "analysis", "found"];
const EMPHASIS_WORDS: &[&str] = &["important", "significant", "major", "key"];
const EVIDENCE_WORDS: &[&str] = &["data", "results", "evidence", "shows"];

const IMPORTANT_INDICATORS: &[&str] = &[
    "significant", "important", "key", "major", "critical", "essential", "primary", "main",
    "crucial", "vital",
];

const TECHNICAL_INDICATORS: &[&str] = &[
    "algorithm", "method", "technique", "process", "system", "framework", "model", "approach",
    "protocol", "standard",
];

const CONTRAST_INDICATORS: &[&str] = &[
    "however", "but", "although", "though", "on the other hand", "alternatively", "conversely",
    "whereas", "while", "despite", "in contrast",
];

static QUANTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?%?").expect("QUANTITY pattern is valid"));

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSentence {
    pub text: String,
    pub score: u32,
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Split on `.` and keep trimmed sentences longer than 20 chars.
pub fn split_sentences(content: &str) -> Vec<&str> {
    content
        .split('.')
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .collect()
}

/// `. ` separated clauses, used by the extraction heuristics.
fn clauses(content: &str) -> impl Iterator<Item = &str> {
    content.split(". ").map(str::trim)
}

/// 3 per query word present, +2 research vocabulary, +2 emphasis, +1 evidence.
pub fn score_sentence(sentence: &str, query_words: &HashSet<String>) -> u32 {
    let lower = sentence.to_lowercase();
    let words: HashSet<&str> = lower.split_whitespace().collect();
    let overlap = query_words.iter().filter(|w| words.contains(w.as_str())).count() as u32;

    let mut score = overlap * 3;
    if contains_any(&lower, RESEARCH_WORDS) {
        score += 2;
    }
    if contains_any(&lower, EMPHASIS_WORDS) {
        score += 2;
    }
    if contains_any(&lower, EVIDENCE_WORDS) {
        score += 1;
    }
    score
}

/// All sentences by descending score; equal scores keep document order.
pub fn rank_sentences(content: &str, query: &str) -> Vec<ScoredSentence> {
    let query_words: HashSet<String> = query.to_lowercase().split_whitespace().map(String::from).collect();
    let mut scored: Vec<ScoredSentence> = split_sentences(content)
        .into_iter()
        .map(|s| ScoredSentence {
            score: score_sentence(s, &query_words),
            text: s.to_string(),
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

fn terminate(sentence: &str) -> String {
    if sentence.ends_with('.') {
        sentence.to_string()
    } else {
        format!("{}.", sentence)
    }
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|s| seen.insert(s.clone())).collect()
}

/// Sentences mentioning a query term or an importance marker.
pub fn intelligent_findings(content: &str, query: &str, limit: usize) -> Vec<String> {
    let lower_query = query.to_lowercase();
    let terms: Vec<&str> = lower_query.split_whitespace().collect();
    let findings = clauses(content)
        .take(FINDINGS_SCAN_LIMIT)
        .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
        .filter(|s| {
            let lower = s.to_lowercase();
            terms.iter().any(|t| lower.contains(t)) || contains_any(&lower, IMPORTANT_INDICATORS)
        })
        .map(terminate)
        .collect();
    let mut findings = dedup(findings);
    findings.truncate(limit);
    findings
}

/// Sentences describing methods, systems or models.
pub fn technical_sentences(content: &str, limit: usize) -> Vec<String> {
    clauses(content)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .filter(|s| contains_any(&s.to_lowercase(), TECHNICAL_INDICATORS))
        .take(limit)
        .map(String::from)
        .collect()
}

/// Sentences that set one view against another.
pub fn perspectives(content: &str, limit: usize) -> Vec<String> {
    clauses(content)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .filter(|s| contains_any(&s.to_lowercase(), CONTRAST_INDICATORS))
        .take(limit)
        .map(String::from)
        .collect()
}

/// Terminated clauses containing any of `markers`, deduplicated, in
/// document order. Markers are matched against the lowercased clause.
pub fn matching_sentences(content: &str, markers: &[&str], limit: usize) -> Vec<String> {
    let matches = clauses(content)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .filter(|s| contains_any(&format!(" {} ", s.to_lowercase()), markers))
        .map(terminate)
        .collect();
    let mut matches = dedup(matches);
    matches.truncate(limit);
    matches
}

/// Numbers and percentages in document order.
pub fn quantities(content: &str, limit: usize) -> Vec<String> {
    QUANTITY
        .find_iter(content)
        .take(limit)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Short prose on the numbers and vocabulary of the text.
pub fn technical_insights(content: &str) -> String {
    let lower = content.to_lowercase();
    let mut insights = Vec::new();

    let numbers = quantities(content, 3);
    if !numbers.is_empty() {
        insights.push(format!(
            "Quantitative data includes metrics such as {}",
            numbers.join(", ")
        ));
    }

    let terms: Vec<&str> = [
        ("algorithm", "algorithmic approaches"),
        ("data", "data analysis"),
        ("system", "system architecture"),
        ("process", "process optimization"),
    ]
    .iter()
    .filter(|(needle, _)| lower.contains(needle))
    .map(|(_, label)| *label)
    .collect();
    if !terms.is_empty() {
        insights.push(format!("Technical aspects include {}", terms.join(", ")));
    }

    let word_count = content.split_whitespace().count();
    insights.push(
        if word_count > 500 {
            "Comprehensive analysis with detailed examination of multiple factors"
        } else if word_count > 200 {
            "Moderate-depth analysis covering key aspects"
        } else {
            "Focused analysis highlighting essential points"
        }
        .to_string(),
    );

    format!("{}.", insights.join(". "))
}
