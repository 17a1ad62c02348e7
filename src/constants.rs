//! Default values for the daily scan
//!
//! Every value here can be overridden through the environment, see
//! [`crate::models::ScanConfig::from_env`] and [`crate::utils`].

/// Forum community scanned when `SUBREDDIT` is unset
pub const DEFAULT_SUBREDDIT: &str = "wallstreetbets";

/// Maximum number of newest posts scanned per run
pub const DEFAULT_SUBMISSION_LIMIT: usize = 300;

/// Trailing window, in hours, over which mentions are collected
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Symbols this long or shorter need a `$` marker to count
pub const DEFAULT_SHORT_SYMBOL_MAX_LEN: usize = 2;

/// Calendar days of daily bars requested per ticker
pub const DEFAULT_PRICE_DAYS_BACK: u32 = 7;

/// Page size of the forum listing API (hard maximum on the server side)
pub const LISTING_PAGE_SIZE: usize = 100;

/// Default HTTP port for `serve`
pub const DEFAULT_PORT: u16 = 8000;

/// Default user agent sent to the forum API
pub const DEFAULT_USER_AGENT: &str = "wsb-mentions/0.1";

/// Ticker pattern bounds
///
/// | Form        | Letters |
/// |-------------|---------|
/// | `$` + token | 1 - 5   |
/// | bare token  | 2 - 5   |
pub const MIN_BARE_SYMBOL_LEN: usize = 2;
pub const MIN_DOLLAR_SYMBOL_LEN: usize = 1;
pub const MAX_SYMBOL_LEN: usize = 5;

/// File name of the merged history written next to the database
pub const HISTORY_FILE_NAME: &str = "mentions_history.csv";

/// Dashboard top-N bounds
pub const DASHBOARD_TOP_MIN: usize = 5;
pub const DASHBOARD_TOP_MAX: usize = 50;
pub const DASHBOARD_TOP_DEFAULT: usize = 20;
