//! Markdown skeletons filled from the extracted sentences and keywords.

use super::keywords::{extract_keywords, query_terms};
use super::sentences::{
    intelligent_findings, perspectives, rank_sentences, split_sentences, technical_insights,
    technical_sentences,
};
use crate::providers::truncate_chars;

const EXECUTIVE_SENTENCES: usize = 4;
const ENHANCED_FINDINGS: usize = 5;
const ENHANCED_KEY_TERMS: usize = 10;
const ADVANCED_FINDINGS: usize = 5;
const ADVANCED_FINDING_CHARS: usize = 200;
const COMPREHENSIVE_FINDINGS: usize = 12;
const TECHNICAL_SENTENCES: usize = 6;
const PERSPECTIVES_EXTRACTED: usize = 8;
const PERSPECTIVES_SHOWN: usize = 5;

pub fn insufficient(query: &str) -> String {
    format!(
        "Insufficient content to summarize for '{}'. Provide more source text for a meaningful summary.",
        query
    )
}

fn no_content(query: &str) -> String {
    format!("No content available for summarization about '{}'.", query)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Default structured fallback: executive summary, findings, key terms,
/// technical notes and a conclusion.
pub fn enhanced(content: &str, query: &str) -> String {
    let content = content.trim();
    let ranked = rank_sentences(content, query);
    if ranked.is_empty() {
        return no_content(query);
    }

    let mut parts = vec![format!("## Research Summary: {}", query), String::new()];

    parts.push("**Executive Summary:**".to_string());
    let top: Vec<&str> = ranked
        .iter()
        .take(EXECUTIVE_SENTENCES)
        .filter(|s| s.score > 0)
        .map(|s| s.text.as_str())
        .collect();
    if top.is_empty() {
        parts.push(format!(
            "The supplied material on '{}' spans {} passages. None address the query terms \
             directly, so the findings below reflect the most informative passages.",
            query,
            ranked.len()
        ));
    } else {
        let mut executive = top.join(". ").replace("..", ".");
        if !executive.ends_with('.') {
            executive.push('.');
        }
        parts.push(executive);
    }
    parts.push(String::new());

    let mut findings = intelligent_findings(content, query, ENHANCED_FINDINGS);
    if findings.is_empty() {
        findings = ranked
            .iter()
            .take(ENHANCED_FINDINGS)
            .map(|s| format!("{}.", s.text))
            .collect();
    }
    parts.push("**Key Findings:**".to_string());
    parts.extend(findings.iter().map(|f| format!("• {}", f)));
    parts.push(String::new());

    let keywords = extract_keywords(content, query);
    parts.push(format!(
        "**Key Terms:** {}",
        keywords
            .iter()
            .take(ENHANCED_KEY_TERMS)
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    ));
    parts.push(String::new());

    parts.push("**Technical Analysis:**".to_string());
    let technical = technical_sentences(content, TECHNICAL_SENTENCES);
    if technical.is_empty() {
        parts.push(technical_insights(content));
    } else {
        parts.push("Technical aspects identified in the research include:".to_string());
        parts.push(String::new());
        parts.extend(technical.iter().map(|s| format!("• {}", s)));
    }
    parts.push(String::new());

    parts.push("**Conclusion:**".to_string());
    let terms = query_terms(query);
    let themes: Vec<&str> = keywords
        .iter()
        .filter(|k| !terms.contains(k))
        .take(3)
        .map(|k| k.as_str())
        .collect();
    let focus = if themes.is_empty() {
        String::new()
    } else {
        format!(", with recurring attention to {}", themes.join(", "))
    };
    parts.push(format!(
        "The material on '{}' yields {} findings from {} passages{}. \
         Check time-sensitive details against the original sources.",
        query,
        findings.len(),
        ranked.len(),
        focus
    ));
    parts.push(String::new());

    parts.push(
        "*This summary was generated using local text analysis and content extraction.*"
            .to_string(),
    );
    parts.join("\n")
}

/// Short bullet overview for quick searches and brief summaries.
pub fn quick(content: &str, query: &str) -> String {
    let content = content.trim();
    let ranked = rank_sentences(content, query);
    let mut out = format!(
        "## Quick Research Summary: {}\n\n\
         - **Topic Overview**: Research analysis of {} based on available sources\n\
         - **Key Information**: {} characters of content analyzed\n",
        query,
        query,
        content.chars().count()
    );
    out.push_str("\n### Main Insights\n");
    if ranked.is_empty() {
        out.push_str(&format!(
            "- Multiple sources provide information on {}\n",
            query
        ));
    } else {
        for sentence in ranked.iter().take(3) {
            out.push_str(&format!("- {}.\n", sentence.text));
        }
    }
    out.push_str(
        "\n**Note**: This quick summary covers the essentials. Use advanced mode for detailed findings and tables.",
    );
    out
}

/// Numbered findings, technical notes and implications.
pub fn advanced(content: &str, query: &str) -> String {
    let content = content.trim();
    let sentences: Vec<&str> = split_sentences(content);
    if sentences.is_empty() {
        return no_content(query);
    }
    let ranked = rank_sentences(content, query);

    let mut out = format!(
        "## Comprehensive Analysis: {}\n\n### Executive Summary\n\
         This analysis examines {} based on {} key information points from the supplied sources.\n\n\
         ### Key Findings\n",
        query,
        query,
        sentences.len()
    );
    for (i, sentence) in ranked.iter().take(ADVANCED_FINDINGS).enumerate() {
        let ellipsis = if sentence.text.chars().count() > ADVANCED_FINDING_CHARS {
            "..."
        } else {
            ""
        };
        out.push_str(&format!(
            "- **Finding {}**: {}{}\n",
            i + 1,
            truncate_chars(&sentence.text, ADVANCED_FINDING_CHARS),
            ellipsis
        ));
    }
    out.push_str(&format!(
        "\n### Technical Analysis\n{}\n\n\
         ### Current Status & Implications\n\
         - **Content Volume**: {} characters of source material\n\
         - **Coverage**: {} sentences considered\n\n\
         ### Conclusion\n\
         The material on {} points to an active area with ongoing developments. \
         Refer to the individual sources for the most current detail.\n",
        technical_insights(content),
        content.chars().count(),
        sentences.len(),
        query
    ));
    out
}

/// Long-form report with keywords, perspectives and recommendations.
pub fn comprehensive(content: &str, query: &str, source_count: usize) -> String {
    let content = content.trim();
    let keywords = extract_keywords(content, query);
    let word_count = content.split_whitespace().count();
    let mut parts = vec![
        format!("# Comprehensive Research Summary: {}", query),
        String::new(),
        format!("**Sources Analyzed**: {}", source_count),
        format!("**Content Volume**: {} words analyzed", word_count),
        String::new(),
        "## Executive Summary".to_string(),
    ];

    let opening: Vec<&str> = content
        .split(". ")
        .take(10)
        .map(str::trim)
        .filter(|s| s.chars().count() > 20)
        .take(6)
        .collect();
    if opening.is_empty() {
        parts.push(format!(
            "This analysis examines '{}' based on {} sources, covering current trends, developments and implications.",
            query, source_count
        ));
    } else {
        let mut summary = opening.join(". ");
        if !summary.ends_with('.') {
            summary.push('.');
        }
        parts.push(summary);
    }
    parts.push(String::new());

    if !keywords.is_empty() {
        parts.push("## Key Terms & Concepts".to_string());
        parts.push(
            keywords
                .iter()
                .map(|k| format!("**{}**", title_case(k)))
                .collect::<Vec<_>>()
                .join(", "),
        );
        parts.push(String::new());
    }

    parts.push("## Key Findings".to_string());
    let findings = intelligent_findings(content, query, COMPREHENSIVE_FINDINGS);
    if findings.is_empty() {
        parts.extend(generic_findings(query));
    } else {
        parts.extend(findings.iter().map(|f| format!("• {}", f)));
    }
    parts.push(String::new());

    parts.push("## Content Analysis".to_string());
    parts.push(format!("**Total Sources**: {}", source_count));
    parts.push(format!("**Content Depth**: {} words", word_count));
    parts.push(format!("**Key Themes**: {} concepts identified", keywords.len()));
    parts.push(String::new());

    let technical = technical_sentences(content, TECHNICAL_SENTENCES);
    if !technical.is_empty() {
        parts.push("## Technical Analysis".to_string());
        parts.extend(technical.iter().map(|s| format!("• {}", s)));
        parts.push(String::new());
    }

    let views = perspectives(content, PERSPECTIVES_EXTRACTED);
    if !views.is_empty() {
        parts.push("## Different Perspectives".to_string());
        parts.extend(
            views
                .iter()
                .take(PERSPECTIVES_SHOWN)
                .map(|s| format!("• {}", s)),
        );
        parts.push(String::new());
    }

    parts.push("## Implications & Conclusions".to_string());
    parts.push(format!(
        "This analysis of '{}' draws on {} sources. The findings suggest {} is an evolving field; \
         weigh the perspectives and technical considerations above when planning further work.",
        query, source_count, query
    ));
    parts.push(String::new());

    parts.push("## Recommendations".to_string());
    parts.extend(
        [
            "• Investigate emerging trends and developments in related fields",
            "• Consider cross-disciplinary approaches to address complex aspects",
            "• Monitor ongoing research and publications for updates",
            "• Engage with expert communities and professional networks",
            "• Evaluate practical applications and implementation strategies",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    parts.push(String::new());
    parts.push("---".to_string());
    parts.push(
        "*Generated by local content analysis: keyword extraction, finding identification and cross-source synthesis.*"
            .to_string(),
    );
    parts.join("\n")
}

fn generic_findings(query: &str) -> Vec<String> {
    vec![
        format!("• Analysis of {} shows research activity across multiple domains", query),
        "• Multiple sources offer differing perspectives on the topic".to_string(),
        "• Current trends indicate continuing interest and new developments".to_string(),
        format!("• The landscape mixes established knowledge and emerging work on {}", query),
        format!("• Cross-disciplinary links suggest {} matters across sectors", query),
        format!("• Stakeholder priorities differ in how they approach {}", query),
        format!("• Technical and practical considerations both shape {}", query),
        "• The outlook points to continued growth and refinement".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = "Solar power adoption grew significantly in 2023. \
        A major study found that solar costs fell 40% over a decade. \
        However, grid integration remains a challenge for utilities. \
        The forecasting model uses weather data to predict output.";

    #[test]
    fn test_enhanced_sections() {
        let text = enhanced(CONTENT, "solar power");
        assert!(text.starts_with("## Research Summary: solar power"));
        for heading in [
            "**Executive Summary:**",
            "**Key Findings:**",
            "**Key Terms:** solar, power",
            "**Technical Analysis:**",
            "**Conclusion:**",
        ] {
            assert!(text.contains(heading), "missing {heading}");
        }
        assert!(text.contains("The forecasting model uses weather data"));
        assert!(text.contains("Solar power adoption grew significantly in 2023"));
    }

    #[test]
    fn test_enhanced_sections_without_query_overlap() {
        let content = "Lithium cells dominate the battery market today. \
            Sodium chemistries promise cheaper cells for stationary use. \
            Recycling recovers most of the cobalt in spent cells.";
        let text = enhanced(content, "grid storage");

        let executive = text
            .split("**Executive Summary:**\n")
            .nth(1)
            .and_then(|rest| rest.lines().next())
            .unwrap();
        assert!(executive.starts_with("The supplied material on 'grid storage' spans 3 passages."));
        assert!(text.contains("**Key Findings:**\n• Lithium cells dominate the battery market today."));
        assert!(text.contains("**Key Terms:** grid, storage, cells"));
        assert!(text.contains("**Technical Analysis:**"));
        assert!(text.contains("**Conclusion:**\nThe material on 'grid storage' yields 3 findings from 3 passages, with recurring attention to cells"));
    }

    #[test]
    fn test_enhanced_without_sentences() {
        assert_eq!(
            enhanced("tiny. bits.", "x"),
            "No content available for summarization about 'x'."
        );
    }

    #[test]
    fn test_advanced_caps_findings() {
        let long = format!("{} solar.", "word ".repeat(80));
        let text = advanced(&long, "solar");
        assert!(text.contains("**Finding 1**"));
        assert!(text.contains("..."));
    }

    #[test]
    fn test_comprehensive_sections() {
        let text = comprehensive(CONTENT, "solar power", 3);
        for heading in [
            "## Key Terms & Concepts",
            "## Key Findings",
            "## Content Analysis",
            "## Technical Analysis",
            "## Different Perspectives",
            "## Implications & Conclusions",
            "## Recommendations",
        ] {
            assert!(text.contains(heading), "missing {heading}");
        }
        assert!(text.contains("**Solar**"));
        assert!(text.contains("However, grid integration remains a challenge"));
    }

    #[test]
    fn test_comprehensive_generic_findings() {
        let text = comprehensive("Cats sleep most of the afternoon away", "rust compilers", 0);
        assert!(text.contains("• The outlook points to continued growth"));
    }

    #[test]
    fn test_quick_mentions_query() {
        let text = quick(CONTENT, "solar power");
        assert!(text.starts_with("## Quick Research Summary: solar power"));
        assert!(text.contains("### Main Insights"));
    }
}
