pub mod aggregator;
pub mod database;
pub mod extractor;
pub mod history;
pub mod pipeline;
pub mod prices;
pub mod reddit;

pub use aggregator::{AggregationOutcome, MentionAggregator, MentionTally};
pub use database::{DatabaseStats, MentionStore};
pub use extractor::{scan_candidates, Candidate, TickerExtractor};
pub use history::{append_history, read_history};
pub use pipeline::{run_daily, RunPaths, RunSummary};
pub use prices::{parse_chart, PriceClient};
pub use reddit::{flatten_replies, parse_listing, FeedBatch, RedditClient};
