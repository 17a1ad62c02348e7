use serde::{Deserialize, Serialize};

/// Daily close for one ticker on one trading day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Trading day (YYYY-MM-DD, exchange calendar)
    pub date: String,

    pub ticker: String,

    /// Adjusted close price
    pub close: f64,

    /// Close-to-close return in percent, rounded to 2 decimals.
    /// Absent on the first bar of the fetched window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ret1d: Option<f64>,
}

impl PriceRecord {
    /// Percent return between two closes: ((curr - prev) / prev) * 100, rounded to 2 decimals
    pub fn calculate_return(prev_close: f64, close: f64) -> Option<f64> {
        if prev_close == 0.0 || !prev_close.is_finite() || !close.is_finite() {
            return None;
        }
        let pct = (close / prev_close - 1.0) * 100.0;
        Some((pct * 100.0).round() / 100.0)
    }
}
