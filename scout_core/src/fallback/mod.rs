//! Local summarization used when no provider answers.
//!
//! Everything here is a pure function of its inputs: no I/O, no clock,
//! no randomness. Every input maps to a non-empty string.

pub mod keywords;
pub mod sentences;
pub mod template;

use crate::options::{ResearchOptions, SummaryType};
use crate::types::ContentAnalysis;

pub use keywords::extract_keywords;

/// Inputs shorter than this (after trimming) are not worth analysing.
pub const MIN_CONTENT_CHARS: usize = 10;

pub const ENHANCED_FALLBACK: &str = "Enhanced Fallback";
pub const COMPREHENSIVE_FALLBACK: &str = "Comprehensive Fallback";

/// Which template the fallback renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStyle {
    Enhanced,
    Quick,
    Advanced,
    Comprehensive { source_count: usize },
}

impl FallbackStyle {
    /// Style matching the prompt family chosen for `options`.
    pub fn for_options(options: &ResearchOptions) -> Self {
        match options.summary_type {
            SummaryType::Comprehensive => FallbackStyle::Comprehensive {
                source_count: options.source_count,
            },
            SummaryType::Brief => FallbackStyle::Quick,
            SummaryType::Detailed if options.is_quick() => FallbackStyle::Quick,
            SummaryType::Detailed if options.detailed_formatting => FallbackStyle::Advanced,
            SummaryType::Detailed => FallbackStyle::Enhanced,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            FallbackStyle::Comprehensive { .. } => COMPREHENSIVE_FALLBACK,
            _ => ENHANCED_FALLBACK,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalHeuristicFallback;

impl LocalHeuristicFallback {
    pub fn new() -> Self {
        Self
    }

    pub fn is_insufficient(content: &str) -> bool {
        content.trim().chars().count() < MIN_CONTENT_CHARS
    }

    /// Render a summary of `content` for `query`.
    pub fn summarize(&self, content: &str, query: &str, style: FallbackStyle) -> String {
        if Self::is_insufficient(content) {
            return template::insufficient(query);
        }
        match style {
            FallbackStyle::Enhanced => template::enhanced(content, query),
            FallbackStyle::Quick => template::quick(content, query),
            FallbackStyle::Advanced => template::advanced(content, query),
            FallbackStyle::Comprehensive { source_count } => {
                template::comprehensive(content, query, source_count)
            }
        }
    }

    pub fn keywords(&self, content: &str, query: &str) -> Vec<String> {
        extract_keywords(content, query)
    }

    pub fn content_analysis(
        &self,
        content: &str,
        keywords: &[String],
        source_count: usize,
    ) -> ContentAnalysis {
        ContentAnalysis {
            sources_analyzed: source_count,
            total_words: content.split_whitespace().count(),
            keywords_extracted: keywords.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_empty() {
        let fallback = LocalHeuristicFallback::new();
        let styles = [
            FallbackStyle::Enhanced,
            FallbackStyle::Quick,
            FallbackStyle::Advanced,
            FallbackStyle::Comprehensive { source_count: 0 },
        ];
        for content in ["", "   ", "short", "x.y.z.", "A sentence that is long enough."] {
            for style in styles {
                assert!(!fallback.summarize(content, "q", style).trim().is_empty());
            }
        }
    }

    #[test]
    fn test_insufficient_content_message() {
        let text = LocalHeuristicFallback.summarize("hi", "gene therapy", FallbackStyle::Enhanced);
        assert!(text.contains("gene therapy"));
        assert!(text.starts_with("Insufficient content"));
    }

    #[test]
    fn test_query_terms_preserved() {
        let text = LocalHeuristicFallback.summarize(
            "AI improves diagnostics.",
            "AI in healthcare",
            FallbackStyle::Enhanced,
        );
        assert!(text.contains("AI"));
        assert!(text.contains("healthcare"));
    }

    #[test]
    fn test_style_for_options() {
        let mut options = ResearchOptions::default();
        assert_eq!(FallbackStyle::for_options(&options), FallbackStyle::Enhanced);
        options.detailed_formatting = true;
        assert_eq!(FallbackStyle::for_options(&options), FallbackStyle::Advanced);
        assert_eq!(FallbackStyle::for_options(&ResearchOptions::quick()), FallbackStyle::Quick);
        let comprehensive = ResearchOptions::comprehensive();
        assert_eq!(
            FallbackStyle::for_options(&comprehensive).provider_name(),
            COMPREHENSIVE_FALLBACK
        );
    }

    #[test]
    fn test_content_analysis() {
        let keywords = vec!["a".to_string(), "b".to_string()];
        let analysis = LocalHeuristicFallback.content_analysis("one two three", &keywords, 4);
        assert_eq!(analysis.total_words, 3);
        assert_eq!(analysis.keywords_extracted, 2);
        assert_eq!(analysis.sources_analyzed, 4);
    }
}
