use crate::constants::{DATE_LABEL_FORMAT, DEFAULT_PRICE_SOURCE_BASE_URL};
use chrono::NaiveDate;
use std::path::PathBuf;

/// Default HTTP port when neither the CLI nor PORT sets one
pub const DEFAULT_PORT: u16 = 3000;

/// Get static files directory from environment variable or use default
pub fn get_public_dir() -> PathBuf {
    std::env::var("PUBLIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("public"))
}

/// Get server port from PORT or use default
pub fn get_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Get the price source base URL (no trailing slash)
pub fn get_price_source_base_url() -> String {
    std::env::var("PRICE_SOURCE_BASE_URL")
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_PRICE_SOURCE_BASE_URL.to_string())
}

/// Maximum overview cache entries; None keeps every entry for the process lifetime
pub fn get_cache_max_entries() -> Option<usize> {
    std::env::var("OVERVIEW_CACHE_MAX_ENTRIES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0)
}

/// Format a date as a wide-table column label, e.g. "05 March 2025"
pub fn format_date_label(date: &NaiveDate) -> String {
    date.format(DATE_LABEL_FORMAT).to_string()
}

/// Format a date as YYYY-MM-DD
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
