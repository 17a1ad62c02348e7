use crate::constants::HISTORY_FILE_NAME;
use crate::error::Result;
use crate::models::{join_mentions_prices, sort_by_mentions, MentionRecord, ScanConfig, ValidTickerSet};
use crate::services::{append_history, MentionAggregator, MentionStore, PriceClient, RedditClient};
use chrono::Utc;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Paths used by one daily run
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub company_tickers: PathBuf,
    pub database: PathBuf,
    pub data_dir: PathBuf,
}

impl RunPaths {
    pub fn from_env() -> Self {
        Self {
            company_tickers: crate::utils::get_company_tickers_path(),
            database: crate::utils::get_database_path(),
            data_dir: crate::utils::get_data_dir(),
        }
    }

    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE_NAME)
    }
}

/// What one daily run produced
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Mention rows, most mentioned first
    pub mentions: Vec<MentionRecord>,
    pub items_scanned: usize,
    pub items_skipped: usize,
    /// The feed failed part-way and counts are partial
    pub partial: bool,
    pub price_rows: usize,
    pub priced_tickers: usize,
    pub history_rows: usize,
}

impl RunSummary {
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }
}

/// Run the daily batch: scan, count, persist, price, join, append history.
///
/// An invalid window and a missing reference file both abort before any fetch.
/// An empty mention set ends the run early with an empty summary.
#[instrument(skip_all, fields(subreddit = %config.subreddit))]
pub async fn run_daily(config: &ScanConfig, paths: &RunPaths) -> Result<RunSummary> {
    config.cutoff(Utc::now())?;

    let tickers = ValidTickerSet::from_file(&paths.company_tickers)?;
    info!(valid_tickers = tickers.len(), "Loaded ticker reference");

    let feed = RedditClient::connect(config).await?;
    let batch = feed.collect(config).await;
    if let Some(e) = &batch.error {
        warn!(error = %e, items = batch.items.len(), "Feed ended early");
    }

    let aggregator = MentionAggregator::new(&tickers, config);
    let outcome = aggregator.aggregate(batch.into_results())?;

    let mut summary = RunSummary {
        items_scanned: outcome.items_scanned,
        items_skipped: outcome.items_skipped,
        partial: outcome.partial,
        ..RunSummary::default()
    };

    if outcome.records.is_empty() {
        info!("No mentions found");
        return Ok(summary);
    }

    let mut mentions = outcome.records;
    sort_by_mentions(&mut mentions);

    let store = MentionStore::new(paths.database.clone()).await?;
    store.upsert_mentions(&mentions).await?;

    let mut symbols: Vec<String> = mentions.iter().map(|m| m.ticker.clone()).collect();
    symbols.sort();
    symbols.dedup();

    let prices = PriceClient::new()?
        .fetch_price_table(&symbols, config.price_days_back)
        .await;
    store.upsert_prices(&prices).await?;
    store.close().await;

    let joined = join_mentions_prices(&mentions, &prices);
    summary.priced_tickers = joined.iter().filter(|r| r.close.is_some()).count();
    summary.price_rows = prices.len();
    summary.history_rows = append_history(&paths.history_file(), &joined)?;
    summary.mentions = mentions;

    info!(
        tickers = summary.mentions.len(),
        priced = summary.priced_tickers,
        history_rows = summary.history_rows,
        partial = summary.partial,
        "Daily run completed"
    );

    Ok(summary)
}
