use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Mention count for one ticker on one day label
///
/// Identity key is `(date, ticker)`: persistence, API and dashboard all key on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionRecord {
    /// UTC day label (YYYY-MM-DD)
    pub date: String,

    /// Ticker symbol, always a member of the valid ticker set
    pub ticker: String,

    /// Recognised occurrences across all scanned text
    pub mentions: u64,

    /// Company title from the reference file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl MentionRecord {
    pub fn new(date: impl Into<String>, ticker: impl Into<String>, mentions: u64) -> Self {
        Self {
            date: date.into(),
            ticker: ticker.into(),
            mentions,
            title: None,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title.filter(|t| !t.is_empty());
        self
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.date, &self.ticker)
    }
}

/// Sort by mentions descending, ticker ascending on ties
pub fn sort_by_mentions(records: &mut [MentionRecord]) {
    records.sort_by(|a, b| match b.mentions.cmp(&a.mentions) {
        Ordering::Equal => a.ticker.cmp(&b.ticker),
        other => other,
    });
}
