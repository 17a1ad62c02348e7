mod joined;
mod mention;
mod price;
mod scan_config;
mod text_item;
mod ticker_set;

pub use joined::{join_mentions_prices, JoinedRow};
pub use mention::{sort_by_mentions, MentionRecord};
pub use price::PriceRecord;
pub use scan_config::{window_cutoff, DayLabelPolicy, ExtractorPolicy, ScanConfig};
pub use text_item::TextItem;
pub use ticker_set::{CompanyRecord, ValidTickerSet};
