//! Valid Ticker Set
//!
//! Whitelist of real ticker symbols loaded from a company reference file
//! (SEC `company_tickers.json` layout):
//!
//! ```json
//! { "0": { "cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc." }, ... }
//! ```
//!
//! A bare JSON array of the same records is accepted too. Symbols are
//! upper-cased on load; lookups are case-sensitive.

use crate::error::{AppError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One company record; unknown fields are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyRecord {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReferenceFile {
    Keyed(HashMap<String, CompanyRecord>),
    List(Vec<CompanyRecord>),
}

/// Immutable ticker -> company title mapping
#[derive(Debug, Clone, Default)]
pub struct ValidTickerSet {
    titles: HashMap<String, String>,
}

impl ValidTickerSet {
    /// Load the reference file. Missing or malformed files are fatal.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::ReferenceData(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content).map_err(|e| match e {
            AppError::ReferenceData(msg) => {
                AppError::ReferenceData(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse reference JSON
    pub fn from_json(content: &str) -> Result<Self> {
        let file: ReferenceFile = serde_json::from_str(content)
            .map_err(|e| AppError::ReferenceData(format!("malformed reference data: {}", e)))?;

        let records: Vec<CompanyRecord> = match file {
            ReferenceFile::Keyed(map) => map.into_values().collect(),
            ReferenceFile::List(list) => list,
        };

        Ok(Self::from_records(records))
    }

    /// Build from records; entries without a ticker are skipped
    pub fn from_records<I: IntoIterator<Item = CompanyRecord>>(records: I) -> Self {
        let titles = records
            .into_iter()
            .filter_map(|rec| {
                let ticker = rec.ticker?.trim().to_uppercase();
                if ticker.is_empty() {
                    return None;
                }
                Some((ticker, rec.title.unwrap_or_default()))
            })
            .collect();
        Self { titles }
    }

    /// Case-sensitive membership test
    pub fn is_valid(&self, symbol: &str) -> bool {
        self.titles.contains_key(symbol)
    }

    /// Company title for a symbol
    pub fn title_of(&self, symbol: &str) -> Option<&str> {
        self.titles.get(symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl<S: Into<String>, T: Into<String>> FromIterator<(S, T)> for ValidTickerSet {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        Self::from_records(iter.into_iter().map(|(ticker, title)| CompanyRecord {
            ticker: Some(ticker.into()),
            title: Some(title.into()),
        }))
    }
}
