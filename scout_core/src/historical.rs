//! Historical indicator series and their summary statistics.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name reported by the always-available local series generator.
pub const DEMO_SOURCE: &str = "Demo Data";

/// A pattern is directional once the overall change exceeds this percentage.
const PATTERN_THRESHOLD_PCT: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// An indicator time series, oldest point first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub indicator: String,
    pub title: String,
    pub source: String,
    pub period_years: u32,
    pub points: Vec<SeriesPoint>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Increasing,
    Decreasing,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Bullish,
    Bearish,
    Sideways,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Increasing => "Increasing",
            Trend::Decreasing => "Decreasing",
            Trend::Flat => "Flat",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Pattern::Bullish => "bullish",
            Pattern::Bearish => "bearish",
            Pattern::Sideways => "sideways",
        };
        f.write_str(s)
    }
}

/// Summary statistics over a series. Values are rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesAnalysis {
    pub data_points: usize,
    pub current_value: f64,
    pub avg_value: f64,
    pub min: f64,
    pub max: f64,
    pub change_pct: f64,
    pub trend: Trend,
    pub pattern: Pattern,
}

impl HistoricalSeries {
    pub fn new(
        indicator: impl Into<String>,
        title: impl Into<String>,
        source: impl Into<String>,
        period_years: u32,
        mut points: Vec<SeriesPoint>,
    ) -> Self {
        points.sort_by_key(|p| p.date);
        Self {
            indicator: indicator.into(),
            title: title.into(),
            source: source.into(),
            period_years,
            points,
            fetched_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `None` for an empty series.
    pub fn analysis(&self) -> Option<SeriesAnalysis> {
        let first = self.points.first()?.value;
        let last = self.points.last()?.value;
        let values = self.points.iter().map(|p| p.value);

        let sum: f64 = values.clone().sum();
        let min = values.clone().fold(f64::INFINITY, f64::min);
        let max = values.fold(f64::NEG_INFINITY, f64::max);
        let change_pct = if first.abs() > f64::EPSILON {
            (last - first) / first.abs() * 100.0
        } else {
            0.0
        };

        let trend = if last > first {
            Trend::Increasing
        } else if last < first {
            Trend::Decreasing
        } else {
            Trend::Flat
        };
        let pattern = if change_pct > PATTERN_THRESHOLD_PCT {
            Pattern::Bullish
        } else if change_pct < -PATTERN_THRESHOLD_PCT {
            Pattern::Bearish
        } else {
            Pattern::Sideways
        };

        Some(SeriesAnalysis {
            data_points: self.points.len(),
            current_value: round2(last),
            avg_value: round2(sum / self.points.len() as f64),
            min: round2(min),
            max: round2(max),
            change_pct: round2(change_pct),
            trend,
            pattern,
        })
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Display title for a well-known indicator code.
pub fn indicator_title(indicator: &str) -> String {
    match indicator.to_ascii_uppercase().as_str() {
        "GDP" => "GDP Growth Rate (%)".to_string(),
        "INFLATION" => "Inflation Rate (%)".to_string(),
        "UNEMPLOYMENT" => "Unemployment Rate (%)".to_string(),
        _ => format!("{} Index", indicator),
    }
}

/// Linear congruential generator; same seed, same sequence.
struct Lcg(u64);

impl Lcg {
    fn seeded(name: &str) -> Self {
        // FNV-1a
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in name.to_ascii_uppercase().bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Lcg(hash)
    }

    /// Next value in `[-1.0, 1.0)`.
    fn next_signed(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let unit = (self.0 >> 11) as f64 / (1u64 << 53) as f64;
        unit * 2.0 - 1.0
    }
}

/// Quarter-end dates, oldest first, with the last one on or before `end`.
fn quarter_ends(end: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut year = end.year();
    let mut quarter = (end.month0() / 3) as i32;
    // step back to the most recent completed quarter end
    let mut dates = Vec::with_capacity(count);
    loop {
        let date = quarter_end(year, quarter);
        if date <= end {
            break;
        }
        quarter -= 1;
        if quarter < 0 {
            quarter = 3;
            year -= 1;
        }
    }
    while dates.len() < count {
        dates.push(quarter_end(year, quarter));
        quarter -= 1;
        if quarter < 0 {
            quarter = 3;
            year -= 1;
        }
    }
    dates.reverse();
    dates
}

fn quarter_end(year: i32, quarter: i32) -> NaiveDate {
    let (month, day) = match quarter {
        0 => (3, 31),
        1 => (6, 30),
        2 => (9, 30),
        _ => (12, 31),
    };
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// Deterministic quarterly series used when no data provider answers.
///
/// The values depend only on the indicator name and `years`; the dates
/// end at the last quarter boundary on or before `end`.
pub fn demo_series(indicator: &str, years: u32, end: NaiveDate) -> HistoricalSeries {
    let count = (years.max(1) * 4) as usize;
    let mut rng = Lcg::seeded(indicator);
    let upper = indicator.to_ascii_uppercase();

    let points = quarter_ends(end, count)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let value = match upper.as_str() {
                "GDP" => 2.5 + rng.next_signed() * 0.5,
                "INFLATION" => 2.0 + rng.next_signed() * 0.8,
                _ => 100.0 + i as f64 * 2.0 + rng.next_signed() * 5.0,
            };
            SeriesPoint {
                date,
                value: round2(value),
            }
        })
        .collect();

    HistoricalSeries::new(
        indicator,
        indicator_title(indicator),
        DEMO_SOURCE,
        years.max(1),
        points,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_demo_series_is_deterministic() {
        let end = date(2024, 5, 15);
        let a = demo_series("GDP", 2, end);
        let b = demo_series("gdp", 2, end);
        assert_eq!(a.points, b.points);
        assert_eq!(a.points.len(), 8);
        assert_eq!(a.source, DEMO_SOURCE);
        assert!(a.points.iter().all(|p| (2.0..=3.0).contains(&p.value)));
    }

    #[test]
    fn test_demo_series_dates_are_quarter_ends() {
        let series = demo_series("INFLATION", 1, date(2024, 5, 15));
        let dates: Vec<_> = series.points.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![date(2023, 6, 30), date(2023, 9, 30), date(2023, 12, 31), date(2024, 3, 31)]
        );
    }

    #[test]
    fn test_generic_indicator_trends_up() {
        let series = demo_series("HOUSING", 5, date(2024, 1, 1));
        assert_eq!(series.title, "HOUSING Index");
        let analysis = series.analysis().unwrap();
        assert_eq!(analysis.data_points, 20);
        assert_eq!(analysis.trend, Trend::Increasing);
        assert_eq!(analysis.pattern, Pattern::Bullish);
    }

    #[test]
    fn test_analysis_values() {
        let points = vec![
            SeriesPoint { date: date(2023, 3, 31), value: 100.0 },
            SeriesPoint { date: date(2023, 6, 30), value: 90.0 },
            SeriesPoint { date: date(2023, 9, 30), value: 98.0 },
        ];
        let series = HistoricalSeries::new("X", "X Index", "test", 1, points);
        let analysis = series.analysis().unwrap();
        assert_eq!(analysis.current_value, 98.0);
        assert_eq!(analysis.avg_value, 96.0);
        assert_eq!(analysis.min, 90.0);
        assert_eq!(analysis.max, 100.0);
        assert_eq!(analysis.change_pct, -2.0);
        assert_eq!(analysis.trend, Trend::Decreasing);
        assert_eq!(analysis.pattern, Pattern::Sideways);
    }

    #[test]
    fn test_empty_series_has_no_analysis() {
        let series = HistoricalSeries::new("X", "X", "test", 1, Vec::new());
        assert!(series.analysis().is_none());
    }
}
