//! Prompt construction for AI summarization providers.

use crate::options::{ResearchOptions, SummaryType};
use crate::providers::truncate_chars;
use crate::types::SummarizeRequest;

/// Prompt family, each with its own content window and token budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// No options given: a short paragraph summary.
    Simple,
    Quick,
    Advanced,
    Comprehensive,
}

impl PromptStyle {
    pub fn for_options(options: Option<&ResearchOptions>) -> Self {
        let Some(options) = options else {
            return PromptStyle::Simple;
        };
        match options.summary_type {
            SummaryType::Comprehensive => PromptStyle::Comprehensive,
            _ if options.is_quick() => PromptStyle::Quick,
            _ => PromptStyle::Advanced,
        }
    }

    /// Characters of source content included in the prompt.
    pub fn content_limit(&self) -> usize {
        match self {
            PromptStyle::Simple => 4000,
            PromptStyle::Quick => 3000,
            PromptStyle::Advanced => 6000,
            PromptStyle::Comprehensive => 15000,
        }
    }

    pub fn max_tokens(&self) -> u32 {
        match self {
            PromptStyle::Simple => 400,
            PromptStyle::Quick => 800,
            PromptStyle::Advanced => 1200,
            PromptStyle::Comprehensive => 1500,
        }
    }
}

/// Keywords listed in the comprehensive outline.
const PROMPT_KEYWORDS: usize = 20;

fn simple_prompt(content: &str, query: &str) -> String {
    format!(
        "Based on the following content about \"{query}\", provide a comprehensive summary.\n\n\
         Requirements:\n\
         - 2-3 paragraphs maximum\n\
         - Focus on key information and insights\n\
         - Use clear, professional language\n\
         - Highlight important facts or findings\n\n\
         Content:\n{content}\n\nSummary:"
    )
}

fn quick_prompt(content: &str, query: &str) -> String {
    format!(
        "Based on the following content about \"{query}\", provide a concise but well-structured summary.\n\n\
         Requirements:\n\
         - Use clear headings with ##\n\
         - Include bullet points for key information\n\
         - Keep it concise but informative (2-3 paragraphs max)\n\
         - Focus on the most important insights\n\
         - Use professional formatting\n\n\
         Content:\n{content}\n\nProvide a structured summary:"
    )
}

fn advanced_prompt(content: &str, query: &str, options: &ResearchOptions) -> String {
    let mut instructions = String::new();
    if options.include_tables {
        instructions.push_str("\n- Include data tables when relevant (use | for table formatting)");
    }
    if options.include_bullet_points {
        instructions.push_str("\n- Use detailed bullet points for organization");
    }
    format!(
        "Based on the following content about \"{query}\", provide a comprehensive, structured analysis.\n\n\
         Required Structure:\n\
         ## Executive Summary\n[Brief overview in 2-3 sentences]\n\n\
         ## Key Findings\n- [Finding 1 with details]\n- [Finding 2 with details]\n- [Finding 3 with details]\n\n\
         ## Detailed Analysis\n\
         ### Current State\n[Analysis with bullet points]\n\n\
         ### Recent Developments\n[Key developments with specifics]\n\n\
         ### Implications & Impact\n[What this means moving forward]\n\n\
         ## Technical Details\n- [Technical aspect 1]\n- [Technical aspect 2]\n\n\
         ## Conclusion\n[Summary of key takeaways]{instructions}\n\n\
         Content to analyze:\n{content}\n\nProvide your comprehensive structured analysis:"
    )
}

fn comprehensive_prompt(content: &str, query: &str, keywords: &[String], source_count: usize) -> String {
    let keywords = keywords
        .iter()
        .take(PROMPT_KEYWORDS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Create a comprehensive, detailed research summary for the query: \"{query}\"\n\n\
         Based on the following content from multiple sources, provide a complete summary that includes all important information:\n\n\
         1. **EXECUTIVE SUMMARY** (3-4 detailed paragraphs with all key points)\n\
         2. **KEY FINDINGS** (10-15 bullet points with specific details and data)\n\
         3. **DETAILED ANALYSIS** (breakdown by themes)\n\
         4. **IMPORTANT KEYWORDS**: {keywords}\n\
         5. **EVIDENCE & DATA** (specific statistics, quotes, examples from sources)\n\
         6. **DIFFERENT PERSPECTIVES** (various viewpoints if any)\n\
         7. **IMPLICATIONS & CONCLUSIONS**\n\
         8. **SOURCE-BY-SOURCE SUMMARY** (what each source contributed)\n\n\
         Instructions:\n\
         - Include all relevant details from the sources\n\
         - Format with clear headings and bullet points\n\
         - Preserve specific facts, figures and quotes\n\n\
         Content from {source_count} sources:\n{content}\n\n\
         Provide a thorough, professional analysis:"
    )
}

/// Build the request every summarization provider receives.
///
/// `keywords` only feeds the comprehensive outline.
pub fn build_request(
    content: &str,
    query: &str,
    options: Option<&ResearchOptions>,
    keywords: &[String],
    temperature: f32,
) -> SummarizeRequest {
    let style = PromptStyle::for_options(options);
    let text = truncate_chars(content.trim(), style.content_limit());
    let prompt = match (style, options) {
        (PromptStyle::Quick, _) => quick_prompt(&text, query),
        (PromptStyle::Advanced, Some(options)) => advanced_prompt(&text, query, options),
        (PromptStyle::Comprehensive, Some(options)) => {
            comprehensive_prompt(&text, query, keywords, options.source_count)
        }
        _ => simple_prompt(&text, query),
    };
    SummarizeRequest {
        query: query.to_string(),
        text,
        prompt,
        max_tokens: style.max_tokens(),
        temperature,
    }
}

/// Source characters shown to the trend analysis.
const TREND_CONTENT_CHARS: usize = 8000;
const TREND_MAX_TOKENS: u32 = 800;

/// Request for the trend section of a research report. Each numbered
/// heading maps to one bucket of `TrendAnalysis`.
pub fn trend_request(content: &str, query: &str, temperature: f32) -> SummarizeRequest {
    let text = truncate_chars(content.trim(), TREND_CONTENT_CHARS);
    let prompt = format!(
        "Based on the following research content about \"{query}\", analyze trends and patterns.\n\n\
         Use these section headings, each followed by bullet points:\n\
         1. Emerging Trends\n\
         2. Recurring Themes\n\
         3. Consensus\n\
         4. Debates and Disagreement\n\
         5. Research Gaps\n\
         6. Future Directions\n\n\
         Research Content:\n{text}\n\nTrend Analysis:"
    );
    SummarizeRequest {
        query: query.to_string(),
        text,
        prompt,
        max_tokens: TREND_MAX_TOKENS,
        temperature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_selection() {
        assert_eq!(PromptStyle::for_options(None), PromptStyle::Simple);
        assert_eq!(
            PromptStyle::for_options(Some(&ResearchOptions::quick())),
            PromptStyle::Quick
        );
        assert_eq!(
            PromptStyle::for_options(Some(&ResearchOptions::default())),
            PromptStyle::Advanced
        );
        assert_eq!(
            PromptStyle::for_options(Some(&ResearchOptions::comprehensive())),
            PromptStyle::Comprehensive
        );
    }

    #[test]
    fn test_content_truncated_per_style() {
        let content = "é".repeat(20_000);
        let quick = build_request(&content, "q", Some(&ResearchOptions::quick()), &[], 0.1);
        assert_eq!(quick.text.chars().count(), 3000);
        assert_eq!(quick.max_tokens, 800);

        let comprehensive =
            build_request(&content, "q", Some(&ResearchOptions::comprehensive()), &[], 0.1);
        assert_eq!(comprehensive.text.chars().count(), 15000);
        assert_eq!(comprehensive.max_tokens, 1500);
    }

    #[test]
    fn test_advanced_optional_instructions() {
        let mut options = ResearchOptions::default();
        let with_all = build_request("text", "topic", Some(&options), &[], 0.1);
        assert!(with_all.prompt.contains("use | for table formatting"));
        assert!(with_all.prompt.contains("detailed bullet points"));
        assert!(with_all.prompt.contains("### Recent Developments"));

        options.include_tables = false;
        options.include_bullet_points = false;
        let bare = build_request("text", "topic", Some(&options), &[], 0.1);
        assert!(!bare.prompt.contains("table formatting"));
        assert!(!bare.prompt.contains("detailed bullet points"));
    }

    #[test]
    fn test_comprehensive_lists_keywords() {
        let keywords = vec!["solar".to_string(), "grid".to_string()];
        let mut options = ResearchOptions::comprehensive();
        options.source_count = 4;
        let request = build_request("text", "energy", Some(&options), &keywords, 0.1);
        assert!(request.prompt.contains("**IMPORTANT KEYWORDS**: solar, grid"));
        assert!(request.prompt.contains("Content from 4 sources"));
    }

    #[test]
    fn test_trend_request() {
        let content = "x".repeat(9000);
        let request = trend_request(&content, "heat pumps", 0.2);
        assert_eq!(request.text.chars().count(), 8000);
        assert_eq!(request.max_tokens, 800);
        assert!(request.prompt.contains("\"heat pumps\""));
        assert!(request.prompt.contains("5. Research Gaps"));
    }
}
