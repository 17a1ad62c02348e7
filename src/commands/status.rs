use crate::server::dashboard::format_return;
use crate::services::MentionStore;
use crate::utils::get_database_path;

const STATUS_TOP: usize = 10;

pub async fn run() {
    println!("📊 WSB Mentions Status\n");

    if let Err(e) = show_status().await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn show_status() -> Result<(), Box<dyn std::error::Error>> {
    let database_path = get_database_path();
    if !database_path.exists() {
        println!("⚠️  No database found at {}. Run 'wsb-mentions run' first.", database_path.display());
        return Ok(());
    }

    let store = MentionStore::new(database_path).await?;
    let stats = store.stats().await?;

    println!("💾 Database:       {}", store.path().display());
    println!("🗣️  Mention rows:   {}", stats.mention_rows);
    println!("💵 Price rows:     {}", stats.price_rows);
    println!("📈 Unique tickers: {}", stats.unique_tickers);

    let Some((first, last)) = stats.date_range else {
        println!("\n⚠️  No mentions stored yet.");
        store.close().await;
        return Ok(());
    };
    println!("📅 Date range:     {} → {}", first, last);

    println!("\n═══════════════════════════════════════════════════════════\n");
    println!("🔹 Top tickers on {}\n", last);
    println!("   {:<6} {:>8} {:>10} {:>9}", "Ticker", "Mentions", "Close", "Return");

    for row in store.read_join(&last).await?.iter().take(STATUS_TOP) {
        let close = row.close.map(|c| format!("{:.2}", c)).unwrap_or_else(|| "-".to_string());
        let ret = match format_return(row.ret1d) {
            r if r.is_empty() => "-".to_string(),
            r => r,
        };
        println!("   {:<6} {:>8} {:>10} {:>9}", row.ticker, row.mentions, close, ret);
    }

    store.close().await;
    Ok(())
}
