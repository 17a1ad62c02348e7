use super::{MentionRecord, PriceRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mention row left-joined with the price row of the same `(date, ticker)`
///
/// Price fields stay empty when no trading data exists for that day
/// (weekend label, delisted or misrecognised symbol).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRow {
    pub date: String,
    pub ticker: String,
    pub mentions: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub ret1d: Option<f64>,
}

/// Left join mentions to prices on `(date, ticker)`, keeping mention order
pub fn join_mentions_prices(mentions: &[MentionRecord], prices: &[PriceRecord]) -> Vec<JoinedRow> {
    let by_key: HashMap<(&str, &str), &PriceRecord> = prices
        .iter()
        .map(|p| ((p.date.as_str(), p.ticker.as_str()), p))
        .collect();

    mentions
        .iter()
        .map(|m| {
            let price = by_key.get(&m.key());
            JoinedRow {
                date: m.date.clone(),
                ticker: m.ticker.clone(),
                mentions: m.mentions,
                title: m.title.clone(),
                close: price.map(|p| p.close),
                ret1d: price.and_then(|p| p.ret1d),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_join_keeps_unpriced_rows() {
        let mentions = vec![
            MentionRecord::new("2024-05-02", "NVDA", 12),
            MentionRecord::new("2024-05-02", "ZZZZ", 1),
        ];
        let prices = vec![
            PriceRecord { date: "2024-05-02".into(), ticker: "NVDA".into(), close: 858.2, ret1d: Some(3.1) },
            PriceRecord { date: "2024-05-01".into(), ticker: "NVDA".into(), close: 832.4, ret1d: None },
        ];

        let rows = join_mentions_prices(&mentions, &prices);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].close, Some(858.2));
        assert_eq!(rows[0].ret1d, Some(3.1));
        assert_eq!(rows[1].ticker, "ZZZZ");
        assert_eq!(rows[1].close, None);
        assert_eq!(rows[1].ret1d, None);
    }
}
