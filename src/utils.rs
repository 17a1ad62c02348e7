use chrono::{DateTime, NaiveDate, Utc};
use std::path::PathBuf;

/// Get data directory (history CSV, reference file) from environment variable or use default
pub fn get_data_dir() -> PathBuf {
    std::env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Get path of the company ticker reference file
pub fn get_company_tickers_path() -> PathBuf {
    std::env::var("COMPANY_TICKERS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| get_data_dir().join("company_tickers.json"))
}

/// Get SQLite database path
pub fn get_database_path() -> PathBuf {
    std::env::var("WSB_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("wsb_mentions.sqlite"))
}

/// Read an env var and parse it, falling back to `default` when unset or invalid
pub fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Boolean env var accepting true/false, 1/0, yes/no, on/off
pub fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => parse_flag(&value).unwrap_or(default),
        Err(_) => default,
    }
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Format a UTC day label (YYYY-MM-DD)
pub fn format_date(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d").to_string()
}

/// Today's UTC day label
pub fn today_label() -> String {
    format_date(&Utc::now())
}

/// Validate a YYYY-MM-DD label
pub fn parse_date_label(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" no "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_format_date() {
        let time = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
        assert_eq!(format_date(&time), "2024-03-09");
    }

    #[test]
    fn test_parse_date_label() {
        assert!(parse_date_label("2024-02-29").is_some());
        assert!(parse_date_label("2024-13-01").is_none());
        assert!(parse_date_label("yesterday").is_none());
    }
}
