use crate::error::Result;
use crate::models::ScanConfig;
use chrono::Utc;
use crate::services::{run_daily, RunPaths};

/// Flag overrides for `wsb-mentions run`
#[derive(Debug, Default)]
pub struct RunOptions {
    pub limit: Option<usize>,
    pub hours: Option<i64>,
    pub no_comments: bool,
    pub subreddit: Option<String>,
}

impl RunOptions {
    /// Override `config` with the given flags; `--hours` must give a valid window
    fn apply(self, mut config: ScanConfig) -> Result<ScanConfig> {
        if let Some(limit) = self.limit {
            config.submission_limit = limit;
        }
        if let Some(hours) = self.hours {
            config.window_hours = hours;
            config.cutoff(Utc::now())?;
        }
        if self.no_comments {
            config.count_comments = false;
        }
        if let Some(subreddit) = self.subreddit {
            config.subreddit = subreddit;
        }
        Ok(config)
    }
}

pub async fn run(options: RunOptions) {
    let config = match options.apply(ScanConfig::from_env()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("   --hours must be a positive number of hours");
            std::process::exit(1);
        }
    };
    let paths = RunPaths::from_env();

    println!("🔎 Scanning r/{} ({} posts, last {}h)", config.subreddit, config.submission_limit, config.window_hours);
    println!(
        "   Replies: {} | Short symbols need $: {} (≤{} letters) | Day label: {}",
        if config.count_comments { "on" } else { "off" },
        config.extractor.require_dollar_for_short,
        config.extractor.short_symbol_max_len,
        config.day_label.as_str()
    );
    if !config.has_credentials() {
        println!("   ℹ️  No REDDIT_CLIENT_ID/SECRET set, using the public listing");
    }
    println!("📁 Reference: {}", paths.company_tickers.display());
    println!("💾 Database:  {}", paths.database.display());

    let summary = match run_daily(&config, &paths).await {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("❌ Daily run failed: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("📊 Items scanned: {} (skipped: {})", summary.items_scanned, summary.items_skipped);
    if summary.partial {
        println!("⚠️  The feed failed part-way, counts are partial");
    }

    if summary.is_empty() {
        println!("ℹ️  No mentions found");
        return;
    }

    println!("✅ {} tickers mentioned, {} with prices", summary.mentions.len(), summary.priced_tickers);
    println!("   📈 Price rows stored: {}", summary.price_rows);
    println!("   🗂️  History rows:      {} ({})", summary.history_rows, paths.history_file().display());
    println!();

    for record in summary.mentions.iter().take(10) {
        println!("   {:<6} {:>5}  {}", record.ticker, record.mentions, record.title.as_deref().unwrap_or(""));
    }
    if summary.mentions.len() > 10 {
        println!("   ... and {} more", summary.mentions.len() - 10);
    }
}
