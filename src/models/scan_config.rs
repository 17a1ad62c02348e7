use crate::constants::{
    DEFAULT_PRICE_DAYS_BACK, DEFAULT_SHORT_SYMBOL_MAX_LEN, DEFAULT_SUBMISSION_LIMIT,
    DEFAULT_SUBREDDIT, DEFAULT_USER_AGENT, DEFAULT_WINDOW_HOURS,
};
use crate::error::{AppError, Result};
use crate::utils::{env_flag, env_or};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// How mentions are assigned a day label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayLabelPolicy {
    /// Every mention of a run gets the UTC day at which aggregation completes
    #[default]
    #[serde(alias = "batch")]
    BatchCompletion,

    /// Each mention gets the UTC day its item was created
    #[serde(alias = "item")]
    ItemTimestamp,
}

impl DayLabelPolicy {
    pub fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "batch" | "batch_completion" | "completion" => Ok(DayLabelPolicy::BatchCompletion),
            "item" | "item_timestamp" | "timestamp" => Ok(DayLabelPolicy::ItemTimestamp),
            _ => Err(format!("Invalid day label policy: '{}'. Valid values: batch, item", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayLabelPolicy::BatchCompletion => "batch",
            DayLabelPolicy::ItemTimestamp => "item",
        }
    }
}

/// Short-symbol disambiguation policy for the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorPolicy {
    /// Require a `$` marker for symbols of `short_symbol_max_len` letters or fewer
    pub require_dollar_for_short: bool,
    pub short_symbol_max_len: usize,
}

impl Default for ExtractorPolicy {
    fn default() -> Self {
        Self {
            require_dollar_for_short: true,
            short_symbol_max_len: DEFAULT_SHORT_SYMBOL_MAX_LEN,
        }
    }
}

/// Configuration for one daily scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Community scanned (e.g. "wallstreetbets")
    pub subreddit: String,

    /// Maximum number of newest posts scanned
    pub submission_limit: usize,

    /// Trailing window length in hours
    pub window_hours: i64,

    /// Also scan replies of each post
    pub count_comments: bool,

    pub extractor: ExtractorPolicy,

    pub day_label: DayLabelPolicy,

    /// Calendar days of daily bars requested per ticker
    pub price_days_back: u32,

    /// OAuth app credentials; public listing is used when absent
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub user_agent: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            subreddit: DEFAULT_SUBREDDIT.to_string(),
            submission_limit: DEFAULT_SUBMISSION_LIMIT,
            window_hours: DEFAULT_WINDOW_HOURS,
            count_comments: true,
            extractor: ExtractorPolicy::default(),
            day_label: DayLabelPolicy::default(),
            price_days_back: DEFAULT_PRICE_DAYS_BACK,
            client_id: None,
            client_secret: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `SUBREDDIT` (default: wallstreetbets)
    /// - `SUBMISSION_LIMIT` (default: 300)
    /// - `TIME_WINDOW_HOURS` (default: 24)
    /// - `COUNT_COMMENTS` (default: true)
    /// - `REQUIRE_DOLLAR_FOR_SHORT` (default: true)
    /// - `SHORT_SYMBOL_MAX_LEN` (default: 2)
    /// - `DAY_LABEL_POLICY` (default: batch)
    /// - `PRICE_DAYS_BACK` (default: 7)
    /// - `REDDIT_CLIENT_ID`, `REDDIT_CLIENT_SECRET`, `REDDIT_USER_AGENT`
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let day_label = std::env::var("DAY_LABEL_POLICY")
            .ok()
            .and_then(|s| DayLabelPolicy::from_str(&s).ok())
            .unwrap_or(defaults.day_label);

        Self {
            subreddit: std::env::var("SUBREDDIT")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.subreddit),
            submission_limit: env_or("SUBMISSION_LIMIT", defaults.submission_limit),
            window_hours: Some(env_or("TIME_WINDOW_HOURS", defaults.window_hours))
                .filter(|hours| window_cutoff(*hours, Utc::now()).is_ok())
                .unwrap_or(defaults.window_hours),
            count_comments: env_flag("COUNT_COMMENTS", defaults.count_comments),
            extractor: ExtractorPolicy {
                require_dollar_for_short: env_flag(
                    "REQUIRE_DOLLAR_FOR_SHORT",
                    defaults.extractor.require_dollar_for_short,
                ),
                short_symbol_max_len: env_or(
                    "SHORT_SYMBOL_MAX_LEN",
                    defaults.extractor.short_symbol_max_len,
                ),
            },
            day_label,
            price_days_back: env_or("PRICE_DAYS_BACK", defaults.price_days_back),
            client_id: non_empty_env("REDDIT_CLIENT_ID"),
            client_secret: non_empty_env("REDDIT_CLIENT_SECRET"),
            user_agent: non_empty_env("REDDIT_USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }

    /// Oldest creation time inside the window ending at `now`
    pub fn cutoff(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        window_cutoff(self.window_hours, now)
    }

    pub fn has_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

/// `now - window_hours`; the window must be positive and representable
pub fn window_cutoff(window_hours: i64, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if window_hours <= 0 {
        return Err(AppError::Config(format!(
            "window hours must be positive, got {}",
            window_hours
        )));
    }

    TimeDelta::try_hours(window_hours)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| AppError::Config(format!("window hours out of range: {}", window_hours)))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
