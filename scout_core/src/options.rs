//! Per-call research options.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How much content and effort a call should spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSpeed {
    Quick,
    #[default]
    Advanced,
}

/// Shape of the summary requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryType {
    Brief,
    #[default]
    Detailed,
    Comprehensive,
}

/// Recency filter for web search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFilter {
    Day,
    Week,
    Month,
    Year,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
        }
    }
}

macro_rules! parse_enum {
    ($ty:ty, $label:literal, { $($text:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($variant),)+
                    other => Err(format!("unknown {} '{}'", $label, other)),
                }
            }
        }
    };
}

parse_enum!(SearchSpeed, "search speed", {
    "quick" => SearchSpeed::Quick,
    "advanced" => SearchSpeed::Advanced,
});

parse_enum!(SummaryType, "summary type", {
    "brief" => SummaryType::Brief,
    "detailed" => SummaryType::Detailed,
    "comprehensive" => SummaryType::Comprehensive,
});

parse_enum!(TimeFilter, "time filter", {
    "day" => TimeFilter::Day,
    "week" => TimeFilter::Week,
    "month" => TimeFilter::Month,
    "year" => TimeFilter::Year,
});

impl fmt::Display for SummaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SummaryType::Brief => "brief",
            SummaryType::Detailed => "detailed",
            SummaryType::Comprehensive => "comprehensive",
        })
    }
}

/// Options recognized by `summarize` and `search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchOptions {
    #[serde(default)]
    pub search_speed: SearchSpeed,

    /// Wrap provider answers in a structured Markdown layout
    #[serde(default)]
    pub detailed_formatting: bool,

    #[serde(default = "default_true")]
    pub include_tables: bool,

    #[serde(default = "default_true")]
    pub include_bullet_points: bool,

    #[serde(default)]
    pub summary_type: SummaryType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_filter: Option<TimeFilter>,

    #[serde(default = "default_true")]
    pub include_images: bool,

    /// Number of sources the content was gathered from
    #[serde(default)]
    pub source_count: usize,
}

fn default_true() -> bool {
    true
}

impl Default for ResearchOptions {
    fn default() -> Self {
        Self {
            search_speed: SearchSpeed::Advanced,
            detailed_formatting: false,
            include_tables: true,
            include_bullet_points: true,
            summary_type: SummaryType::Detailed,
            time_filter: None,
            include_images: true,
            source_count: 0,
        }
    }
}

impl ResearchOptions {
    pub fn quick() -> Self {
        Self {
            search_speed: SearchSpeed::Quick,
            summary_type: SummaryType::Brief,
            ..Self::default()
        }
    }

    pub fn comprehensive() -> Self {
        Self {
            summary_type: SummaryType::Comprehensive,
            ..Self::default()
        }
    }

    pub fn is_quick(&self) -> bool {
        self.search_speed == SearchSpeed::Quick || self.summary_type == SummaryType::Brief
    }

    /// Label reported as `format_type` on summary results.
    pub fn format_type(&self) -> &'static str {
        match self.summary_type {
            SummaryType::Comprehensive => "comprehensive",
            _ if self.is_quick() => "quick",
            _ => "advanced",
        }
    }
}
