//! Structured Markdown layout applied to provider answers on request.

use crate::options::ResearchOptions;
use crate::providers::truncate_chars;

const KEY_POINT_SCAN: usize = 5;
const MIN_KEY_POINT_CHARS: usize = 20;
const TABLE_CELL_CHARS: usize = 120;

/// First sentences of `summary` worth listing as bullets.
pub fn key_points(summary: &str) -> Vec<String> {
    summary
        .split(". ")
        .take(KEY_POINT_SCAN)
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_KEY_POINT_CHARS)
        .map(|s| {
            if s.ends_with('.') {
                s.to_string()
            } else {
                format!("{}.", s)
            }
        })
        .collect()
}

fn table_cell(text: &str) -> String {
    let flat = text.replace('|', "/").replace('\n', " ");
    if flat.chars().count() > TABLE_CELL_CHARS {
        format!("{}...", truncate_chars(&flat, TABLE_CELL_CHARS))
    } else {
        flat
    }
}

fn summary_table(points: &[String]) -> String {
    let insight = points
        .first()
        .map(|p| table_cell(p))
        .unwrap_or_else(|| "Primary findings and conclusions".to_string());
    [
        "| Aspect | Summary |".to_string(),
        "|--------|---------|".to_string(),
        format!("| Key Insight | {} |", insight),
        "| Methodology | Analysis approach and data sources |".to_string(),
        "| Implications | Broader impact and significance |".to_string(),
    ]
    .join("\n")
}

/// Wrap `summary` with a title, an executive summary section and, when
/// the options ask for them, key points and a summary table.
pub fn apply_detailed_formatting(summary: &str, query: &str, options: &ResearchOptions) -> String {
    let mut sections = vec![
        format!("# AI Research Summary: {}", query),
        String::new(),
        "## Executive Summary".to_string(),
        summary.trim().to_string(),
        String::new(),
    ];

    let points = key_points(summary);
    if options.include_bullet_points && !points.is_empty() {
        sections.push("## Key Points".to_string());
        sections.extend(points.iter().map(|p| format!("• {}", p)));
        sections.push(String::new());
    }

    if options.include_tables {
        sections.push("## Summary Table".to_string());
        sections.push(summary_table(&points));
        sections.push(String::new());
    }

    sections.join("\n").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = "Solar adoption grew quickly across Europe. Costs fell. \
        Grid operators are investing in storage capacity. Policy support remains uneven across regions";

    #[test]
    fn test_key_points() {
        assert_eq!(
            key_points(SUMMARY),
            vec![
                "Solar adoption grew quickly across Europe.",
                "Grid operators are investing in storage capacity.",
                "Policy support remains uneven across regions.",
            ]
        );
    }

    #[test]
    fn test_full_layout() {
        let text = apply_detailed_formatting(SUMMARY, "solar", &ResearchOptions::default());
        assert!(text.starts_with("# AI Research Summary: solar\n\n## Executive Summary\n"));
        assert!(text.contains("## Key Points\n• Solar adoption grew quickly across Europe."));
        assert!(text.contains("| Key Insight | Solar adoption grew quickly across Europe. |"));
    }

    #[test]
    fn test_sections_follow_options() {
        let mut options = ResearchOptions::default();
        options.include_bullet_points = false;
        options.include_tables = false;
        let text = apply_detailed_formatting(SUMMARY, "solar", &options);
        assert!(!text.contains("## Key Points"));
        assert!(!text.contains("## Summary Table"));
        assert!(text.ends_with("Policy support remains uneven across regions"));
    }
}
