//! Economic indicator sources.

use super::send_json;
use crate::error::ProviderError;
use crate::historical::{demo_series, indicator_title, HistoricalSeries, SeriesPoint, DEMO_SOURCE};
use crate::types::Capability;
use crate::ProviderClient;
use async_trait::async_trait;
use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, Utc};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const FRED_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const WORLD_BANK_URL: &str = "https://api.worldbank.org/v2/country";

/// Federal Reserve Economic Data.
pub struct FredClient {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl FredClient {
    pub fn new(client: Client, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            timeout,
        }
    }
}

/// FRED series id for a friendly indicator name; unknown names pass through.
fn fred_series_id(indicator: &str) -> String {
    match indicator.to_ascii_uppercase().as_str() {
        "GDP" => "A191RL1Q225SBEA".to_string(),
        "INFLATION" => "FPCPITOTLZGUSA".to_string(),
        "UNEMPLOYMENT" => "UNRATE".to_string(),
        other => other.to_string(),
    }
}

/// FRED marks missing observations with ".".
pub(crate) fn parse_fred(value: &Value) -> Vec<SeriesPoint> {
    value
        .get("observations")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let date = item.get("date")?.as_str()?;
                    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
                    let value = item.get("value")?.as_str()?.parse::<f64>().ok()?;
                    Some(SeriesPoint { date, value })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ProviderClient for FredClient {
    fn name(&self) -> &str {
        "FRED"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::HistoricalData]
    }

    async fn fetch_series(
        &self,
        indicator: &str,
        years: u32,
    ) -> Result<HistoricalSeries, ProviderError> {
        let start = Utc::now().date_naive() - ChronoDuration::days(i64::from(years) * 365);
        let start = start.format("%Y-%m-%d").to_string();
        let series_id = fred_series_id(indicator);
        let req = self.client.get(FRED_URL).query(&[
            ("series_id", series_id.as_str()),
            ("api_key", self.api_key.as_str()),
            ("file_type", "json"),
            ("observation_start", start.as_str()),
        ]);
        let value = send_json("FRED", req, self.timeout).await?;
        let points = parse_fred(&value);
        if points.is_empty() {
            return Err(ProviderError::EmptyResponse(format!("FRED {}", series_id)));
        }
        Ok(HistoricalSeries::new(
            indicator,
            indicator_title(indicator),
            "FRED",
            years,
            points,
        ))
    }
}

/// World Bank open data for the United States.
pub struct WorldBankClient {
    client: Client,
    country: String,
    timeout: Duration,
}

impl WorldBankClient {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            country: "USA".to_string(),
            timeout,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }
}

fn world_bank_indicator(indicator: &str) -> Option<String> {
    match indicator.to_ascii_uppercase().as_str() {
        "GDP" => Some("NY.GDP.MKTP.KD.ZG".to_string()),
        "INFLATION" => Some("FP.CPI.TOTL.ZG".to_string()),
        "UNEMPLOYMENT" => Some("SL.UEM.TOTL.ZS".to_string()),
        // already a World Bank code
        _ if indicator.contains('.') => Some(indicator.to_string()),
        _ => None,
    }
}

/// The body is `[page_info, observations]`; yearly values are dated Dec 31.
pub(crate) fn parse_world_bank(value: &Value) -> Vec<SeriesPoint> {
    value
        .get(1)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let year: i32 = item.get("date")?.as_str()?.parse().ok()?;
                    let value = item.get("value")?.as_f64()?;
                    let date = NaiveDate::from_ymd_opt(year, 12, 31)?;
                    Some(SeriesPoint { date, value })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ProviderClient for WorldBankClient {
    fn name(&self) -> &str {
        "World Bank"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::HistoricalData]
    }

    async fn fetch_series(
        &self,
        indicator: &str,
        years: u32,
    ) -> Result<HistoricalSeries, ProviderError> {
        let code = world_bank_indicator(indicator).ok_or_else(|| {
            ProviderError::Unavailable(format!("World Bank has no mapping for {}", indicator))
        })?;
        let end = Utc::now().year();
        let range = format!("{}:{}", end - years as i32, end);
        let url = format!("{}/{}/indicator/{}", WORLD_BANK_URL, self.country, code);
        let req = self.client.get(url).query(&[
            ("format", "json"),
            ("date", range.as_str()),
            ("per_page", "100"),
        ]);
        let value = send_json("World Bank", req, self.timeout).await?;
        let points = parse_world_bank(&value);
        if points.is_empty() {
            return Err(ProviderError::EmptyResponse(format!("World Bank {}", code)));
        }
        Ok(HistoricalSeries::new(
            indicator,
            indicator_title(indicator),
            "World Bank",
            years,
            points,
        ))
    }
}

/// Local generator registered last so historical lookups always answer.
#[derive(Debug, Default)]
pub struct DemoDataClient;

#[async_trait]
impl ProviderClient for DemoDataClient {
    fn name(&self) -> &str {
        DEMO_SOURCE
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::HistoricalData]
    }

    async fn fetch_series(
        &self,
        indicator: &str,
        years: u32,
    ) -> Result<HistoricalSeries, ProviderError> {
        Ok(demo_series(indicator, years, Utc::now().date_naive()))
    }
}
