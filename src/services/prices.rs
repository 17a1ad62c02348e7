use crate::error::{AppError, Result};
use crate::models::PriceRecord;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info, warn};

const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Daily close downloader (Yahoo Finance chart endpoint)
pub struct PriceClient {
    base_url: String,
    client: reqwest::Client,
}

impl PriceClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(CHART_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "Invalid base_url: must start with http:// or https://, got: '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; wsb-mentions)")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// Closes and 1-day returns for the last `days_back` calendar days.
    ///
    /// Tickers are de-duplicated and fetched in sorted order. A ticker that
    /// fails (delisted, misrecognised, network) is logged and contributes no rows.
    pub async fn fetch_price_table(&self, tickers: &[String], days_back: u32) -> Vec<PriceRecord> {
        let unique: BTreeSet<&str> = tickers.iter().map(String::as_str).collect();
        if unique.is_empty() {
            return Vec::new();
        }

        let mut table = Vec::new();
        let mut failed = 0usize;

        for ticker in &unique {
            match self.fetch_ticker(ticker, days_back).await {
                Ok(rows) => {
                    debug!(ticker = %ticker, rows = rows.len(), "Fetched daily closes");
                    table.extend(rows);
                }
                Err(e) => {
                    failed += 1;
                    warn!(ticker = %ticker, error = %e, "Price fetch failed");
                }
            }
        }

        info!(
            tickers = unique.len(),
            failed,
            rows = table.len(),
            "Price table fetched"
        );
        table
    }

    /// Daily bars for one ticker
    pub async fn fetch_ticker(&self, ticker: &str, days_back: u32) -> Result<Vec<PriceRecord>> {
        let url = format!(
            "{}/{}?range={}d&interval=1d&includeAdjustedClose=true",
            self.base_url, ticker, days_back
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Request failed: {} (url: {})", e, url)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::Network(format!("API error {} for {}", status, ticker)));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("Failed to parse chart JSON: {}", e)))?;

        parse_chart(ticker, &json)
    }
}

/// Convert a chart response into price records.
///
/// - adjusted closes are used when present, raw closes otherwise
/// - the trading day is the bar timestamp shifted by the exchange `gmtoffset`
/// - bars with a null close are dropped, and the bar after one has no return
pub fn parse_chart(ticker: &str, json: &Value) -> Result<Vec<PriceRecord>> {
    let chart = &json["chart"];
    if let Some(err) = chart["error"].as_object() {
        let description = err
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(AppError::NotFound(format!("{}: {}", ticker, description)));
    }

    let result = &chart["result"][0];
    if result.is_null() {
        return Err(AppError::NotFound(format!("{}: empty chart result", ticker)));
    }

    let timestamps = match result["timestamp"].as_array() {
        Some(ts) => ts,
        // No trading in the window
        None => return Ok(Vec::new()),
    };

    let gmtoffset = result["meta"]["gmtoffset"].as_i64().unwrap_or(0);

    let closes = result["indicators"]["adjclose"][0]["adjclose"]
        .as_array()
        .or_else(|| result["indicators"]["quote"][0]["close"].as_array())
        .ok_or_else(|| AppError::Parse(format!("{}: missing close series", ticker)))?;

    let mut records = Vec::with_capacity(timestamps.len());
    let mut prev_close: Option<f64> = None;

    for (ts, close) in timestamps.iter().zip(closes.iter()) {
        let close = close.as_f64();
        let Some(ts) = ts.as_i64() else {
            prev_close = None;
            continue;
        };

        if let Some(close) = close {
            let date = DateTime::<Utc>::from_timestamp(ts + gmtoffset, 0)
                .ok_or_else(|| AppError::Parse(format!("{}: bad timestamp {}", ticker, ts)))?
                .format("%Y-%m-%d")
                .to_string();

            records.push(PriceRecord {
                date,
                ticker: ticker.to_string(),
                close,
                ret1d: prev_close.and_then(|prev| PriceRecord::calculate_return(prev, close)),
            });
        }
        prev_close = close;
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_chart_prefers_adjclose() {
        let json = json!({
            "chart": {
                "result": [{
                    "meta": {"symbol": "AAPL", "gmtoffset": -14400},
                    "timestamp": [1714570200, 1714656600, 1714743000],
                    "indicators": {
                        "quote": [{"close": [169.3, 173.03, 183.38]}],
                        "adjclose": [{"adjclose": [100.0, 102.0, 96.9]}]
                    }
                }],
                "error": null
            }
        });

        let rows = parse_chart("AAPL", &json).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, "2024-05-01");
        assert_eq!(rows[0].ret1d, None);
        assert_eq!(rows[1].close, 102.0);
        assert_eq!(rows[1].ret1d, Some(2.0));
        assert_eq!(rows[2].ret1d, Some(-5.0));
        assert_eq!(rows[2].date, "2024-05-03");
    }

    #[test]
    fn test_parse_chart_null_close_breaks_return() {
        let json = json!({
            "chart": {
                "result": [{
                    "meta": {"gmtoffset": 0},
                    "timestamp": [1714521600, 1714608000, 1714694400],
                    "indicators": {"quote": [{"close": [10.0, null, 11.0]}]}
                }],
                "error": null
            }
        });

        let rows = parse_chart("XYZ", &json).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2024-05-01");
        assert_eq!(rows[1].date, "2024-05-03");
        assert_eq!(rows[1].ret1d, None);
    }

    #[test]
    fn test_parse_chart_error() {
        let json = json!({
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        });

        let err = parse_chart("ZZZZ", &json).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_parse_chart_no_bars() {
        let json = json!({"chart": {"result": [{"meta": {}, "indicators": {"quote": [{}]}}], "error": null}});
        assert!(parse_chart("NEW", &json).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(PriceClient::with_base_url("ftp://example.com").is_err());
    }

    #[tokio::test]
    async fn test_empty_ticker_list_makes_no_request() {
        // unroutable base URL: any request would fail and log, not panic
        let client = PriceClient::with_base_url("http://127.0.0.1:9").unwrap();
        assert!(client.fetch_price_table(&[], 7).await.is_empty());
    }
}
