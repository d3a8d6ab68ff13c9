use crate::models::equity::{sort_by_date, Company, DailyRecord};
use crate::errors::{Result, DataHubError};
use crate::util::parse_iso_date;
use crate::scrapers::base::{ChartRange, MarketDataSource};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use chrono_tz::America::New_York;
use reqwest::{Client, Url};
use serde_json::Value;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use log::{debug, info};

/// IEX Trading 行情接口抓取器
pub struct IexScraper {
    client: Client,
    base_url: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl IexScraper {
    pub fn new(base_url: &str, request_interval_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            min_interval: Duration::from_millis(request_interval_ms),
            last_request: Mutex::new(None),
        })
    }

    /// 等待请求频率限制
    async fn wait_for_rate_limit(&self) {
        let now = Instant::now();
        let should_wait = {
            let mut last = self.last_request.lock().unwrap_or_else(|e| e.into_inner());
            let should_wait = (*last).and_then(|instant| self.min_interval.checked_sub(instant.elapsed()));
            *last = Some(now);
            should_wait
        };

        if let Some(wait_time) = should_wait {
            debug!("Waiting {:?} to respect the IEX rate limit", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }

    /// 拼接接口地址，每个路径段都会被转义
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DataHubError::ApiError(format!("Invalid base url {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| DataHubError::ApiError(format!("Base url {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        self.wait_for_rate_limit().await;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DataHubError::ApiError(format!("GET {} returned HTTP status {}", url, status)));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl MarketDataSource for IexScraper {
    fn source_name(&self) -> &'static str {
        "IEX"
    }

    async fn fetch_symbols(&self) -> Result<Vec<Company>> {
        info!("Fetching symbol list from IEX");
        let json = self.get_json(self.endpoint(&["ref-data", "symbols"])?).await?;
        let today = Utc::now().with_timezone(&New_York).date_naive();
        let companies = parse_symbols(&json, today)?;
        info!("Fetched {} symbols", companies.len());
        Ok(companies)
    }

    async fn fetch_chart(&self, symbol: &str, range: ChartRange) -> Result<Vec<DailyRecord>> {
        debug!("Fetching {} chart for {}", range.as_str(), symbol);
        let url = self.endpoint(&["stock", symbol, "chart", range.as_str()])?;
        let json = self.get_json(url).await?;
        let records = parse_chart(symbol, &json)?;
        debug!("Fetched {} daily records for {}", records.len(), symbol);
        Ok(records)
    }
}

/// Parses the `/ref-data/symbols` payload. A missing `date` falls back to
/// `today`, the current trading day in New York.
pub fn parse_symbols(json: &Value, today: NaiveDate) -> Result<Vec<Company>> {
    let list = json
        .as_array()
        .ok_or_else(|| DataHubError::ApiError("symbol list is not a JSON array".to_string()))?;

    let mut companies = Vec::with_capacity(list.len());
    for item in list {
        let symbol = match item.get("symbol").and_then(|s| s.as_str()) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => {
                debug!("Skipping symbol entry without a symbol: {}", item);
                continue;
            }
        };

        companies.push(Company {
            symbol,
            name: str_field(item, "name"),
            date: item
                .get("date")
                .and_then(|d| d.as_str())
                .map(|d| d.to_string())
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
            is_enabled: item.get("isEnabled").and_then(|e| e.as_bool()).unwrap_or(true),
            kind: str_field(item, "type"),
            iex_id: iex_id_field(item),
        });
    }

    Ok(companies)
}

/// Parses a `/stock/{symbol}/chart/{range}` payload into records sorted ascending by date.
pub fn parse_chart(symbol: &str, json: &Value) -> Result<Vec<DailyRecord>> {
    let list = json
        .as_array()
        .ok_or_else(|| DataHubError::ApiError(format!("chart for {} is not a JSON array", symbol)))?;

    let mut records = Vec::with_capacity(list.len());
    for item in list {
        let date = match item.get("date").and_then(|d| d.as_str()) {
            Some(d) => parse_iso_date(d)?,
            None => {
                debug!("Skipping chart entry without a date for {}", symbol);
                continue;
            }
        };

        records.push(DailyRecord {
            symbol: symbol.to_string(),
            date: date.format("%Y-%m-%d").to_string(),
            open: item.get("open").and_then(|v| v.as_f64()).unwrap_or_default() as f32,
            high: item.get("high").and_then(|v| v.as_f64()).unwrap_or_default() as f32,
            low: item.get("low").and_then(|v| v.as_f64()).unwrap_or_default() as f32,
            close: item.get("close").and_then(|v| v.as_f64()).unwrap_or_default() as f32,
            volume: item.get("volume").and_then(|v| v.as_u64()).unwrap_or_default(),
        });
    }

    sort_by_date(&mut records);
    Ok(records)
}

fn str_field(item: &Value, key: &str) -> String {
    item.get(key).and_then(|v| v.as_str()).unwrap_or_default().to_string()
}

// iexId 有时是数字有时是字符串
fn iex_id_field(item: &Value) -> String {
    match item.get("iexId") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_symbols() {
        let payload = json!([
            {"symbol": "A", "name": "Agilent Technologies Inc.", "date": "2018-04-19",
             "isEnabled": true, "type": "cs", "iexId": "2"},
            {"symbol": "AA", "name": "Alcoa Corp.", "isEnabled": false, "type": "cs", "iexId": 12042},
            {"name": "no symbol"}
        ]);
        let today = NaiveDate::from_ymd_opt(2018, 4, 20).unwrap();
        let companies = parse_symbols(&payload, today).unwrap();

        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].symbol, "A");
        assert_eq!(companies[0].date, "2018-04-19");
        assert_eq!(companies[0].kind, "cs");
        assert_eq!(companies[0].iex_id, "2");
        assert!(!companies[1].is_enabled);
        assert_eq!(companies[1].date, "2018-04-20");
        assert_eq!(companies[1].iex_id, "12042");
    }

    #[test]
    fn test_parse_chart_sorts_ascending() {
        let payload = json!([
            {"date": "2018-04-20", "open": 172.5, "high": 173.1, "low": 170.4, "close": 172.8, "volume": 31_000_000u64},
            {"date": "2018-04-19", "open": 174.0, "high": 174.9, "low": 172.1, "close": 172.8, "volume": 28_000_000u64},
            {"open": 1.0}
        ]);
        let records = parse_chart("AAPL", &payload).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, "2018-04-19");
        assert_eq!(records[1].date, "2018-04-20");
        assert_eq!(records[1].symbol, "AAPL");
        assert_eq!(records[1].volume, 31_000_000);
        assert!((records[0].high - 174.9).abs() < 1e-4);
    }

    #[test]
    fn test_parse_chart_rejects_bad_date() {
        let payload = json!([{"date": "04/19/2018", "high": 1.0}]);
        assert!(matches!(parse_chart("AAPL", &payload), Err(DataHubError::DateError(_))));
    }

    #[test]
    fn test_endpoint_escapes_symbol() {
        let scraper = IexScraper::new("https://api.iextrading.com/1.0/", 0).unwrap();
        let url = scraper.endpoint(&["stock", "BRK/A", "chart", ChartRange::OneMonth.as_str()]).unwrap();
        assert_eq!(url.as_str(), "https://api.iextrading.com/1.0/stock/BRK%2FA/chart/1m");

        let url = scraper.endpoint(&["stock", "A?B#C", "chart", "1y"]).unwrap();
        assert_eq!(url.path_segments().unwrap().nth(2), Some("A%3FB%23C"));

        let url = scraper.endpoint(&["ref-data", "symbols"]).unwrap();
        assert_eq!(url.as_str(), "https://api.iextrading.com/1.0/ref-data/symbols");
    }

    #[test]
    fn test_parse_chart_requires_array() {
        let payload = json!({"error": "Unknown symbol"});
        assert!(matches!(parse_chart("ZZZZ", &payload), Err(DataHubError::ApiError(_))));
    }
}
