use crate::models::{ScanConfig, ValidTickerSet};
use crate::services::{scan_candidates, TickerExtractor};
use crate::utils::get_company_tickers_path;
use std::collections::BTreeSet;

/// Print the tickers recognised in `text`
pub fn run(text: String) {
    let path = get_company_tickers_path();
    let tickers = match ValidTickerSet::from_file(&path) {
        Ok(tickers) => tickers,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let config = ScanConfig::from_env();
    let extractor = TickerExtractor::new(&tickers, config.extractor);

    let candidates = scan_candidates(&text);
    println!("🔤 Candidates: {}", candidates.len());
    for candidate in &candidates {
        let marker = if candidate.has_dollar { "$" } else { "" };
        let verdict = if tickers.is_valid(&candidate.symbol) { "known" } else { "unknown" };
        println!("   {}{:<5} {}", marker, candidate.symbol, verdict);
    }

    let found = extractor.extract(text.as_str());
    if found.is_empty() {
        println!("ℹ️  No tickers recognised");
        return;
    }

    println!("✅ Recognised: {}", found.join(", "));
    let unique: BTreeSet<&String> = found.iter().collect();
    for symbol in unique {
        if let Some(title) = tickers.title_of(symbol) {
            println!("   {:<5} {}", symbol, title);
        }
    }
}
