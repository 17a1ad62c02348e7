//! Merged history file
//!
//! `mentions_history.csv` accumulates every run's joined rows:
//!
//! ```csv
//! date,ticker,mentions,title,close,ret1d
//! 2024-05-02,NVDA,41,NVIDIA CORP,858.17,3.33
//! 2024-05-02,ZZZZ,1,,,
//! ```
//!
//! Appending de-duplicates on `(date, ticker)` and keeps the latest row.

use crate::error::Result;
use crate::models::JoinedRow;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// Read the history file; a missing file is an empty history
pub fn read_history(path: &Path) -> Result<Vec<JoinedRow>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Merge `rows` into the history file and return the total row count
pub fn append_history(path: &Path, rows: &[JoinedRow]) -> Result<usize> {
    let mut all = read_history(path)?;
    all.extend_from_slice(rows);
    let merged = dedupe_keep_last(all);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for row in &merged {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = merged.len(), "History file written");
    Ok(merged.len())
}

/// Keep the last row of every `(date, ticker)`, in order of those last rows
fn dedupe_keep_last(rows: Vec<JoinedRow>) -> Vec<JoinedRow> {
    let mut seen = HashSet::new();
    let mut kept: Vec<JoinedRow> = rows
        .into_iter()
        .rev()
        .filter(|row| seen.insert((row.date.clone(), row.ticker.clone())))
        .collect();
    kept.reverse();
    kept
}
