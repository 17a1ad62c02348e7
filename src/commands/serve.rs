use crate::server;
use crate::services::MentionStore;
use crate::utils::get_database_path;

pub async fn run(port: u16) {
    println!("🚀 Starting wsb-mentions server on port {}", port);

    let database_path = get_database_path();
    println!("💾 Database: {}", database_path.display());

    let store = match MentionStore::new(database_path).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    match store.stats().await {
        Ok(stats) => {
            println!("✅ Database ready:");
            println!("   📈 Tickers:       {}", stats.unique_tickers);
            println!("   🗣️  Mention rows:  {}", stats.mention_rows);
            println!("   💵 Price rows:    {}", stats.price_rows);
            if stats.mention_rows == 0 {
                println!("   ℹ️  No mentions yet. Run 'wsb-mentions run' to collect a day.");
            }
        }
        Err(e) => eprintln!("⚠️  Warning: Could not read database stats: {}", e),
    }

    println!("🌐 Dashboard: http://localhost:{}/", port);
    println!();

    if let Err(e) = server::serve(store, port).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
