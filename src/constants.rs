//! Dashboard Constants
//!
//! Static configuration for the dashboard: the company table, widget ranges
//! and the display labels shared by the API and the page.
//!
//! ## Company Table
//!
//! | Company    | Ticker  |
//! |------------|---------|
//! | TOYOTA     | 7203.T  |
//! | HONDA      | 7267.T  |
//! | Mazda      | 7261.T  |
//! | NISSAN     | 7201.T  |
//! | MITSUBISHI | 7211.T  |
//! | SUZUKI     | 7269.T  |
//! | YAMAHA     | 7272.T  |
//!
//! All tickers trade on the Tokyo Stock Exchange (`.T` suffix), prices in JPY.

/// Company display name -> exchange ticker, in display order
pub const AUTOMAKER_TICKERS: &[(&str, &str)] = &[
    ("TOYOTA", "7203.T"),
    ("HONDA", "7267.T"),
    ("Mazda", "7261.T"),
    ("NISSAN", "7201.T"),
    ("MITSUBISHI", "7211.T"),
    ("SUZUKI", "7269.T"),
    ("YAMAHA", "7272.T"),
];

/// Lookback slider bounds (days)
pub const MIN_LOOKBACK_DAYS: u16 = 1;
pub const MAX_LOOKBACK_DAYS: u16 = 365;
pub const DEFAULT_LOOKBACK_DAYS: u16 = 180;

/// Price range slider bounds (JPY)
pub const PRICE_RANGE_MIN: f64 = 0.0;
pub const PRICE_RANGE_MAX: f64 = 6000.0;

/// Company shown in the detail section when none is chosen
pub const DEFAULT_DETAIL_COMPANY: &str = "TOYOTA";

/// Detail view history: 6 months of daily bars
pub const DETAIL_PERIOD_MONTHS: u8 = 6;

/// Simple moving average window used by the detail view
pub const DEFAULT_SMA_WINDOW: usize = 5;

/// Column labels of a tidy table
pub mod tidy_column {
    pub const DATE: &str = "Date";
    pub const NAME: &str = "Name";
    pub const VALUE: &str = "Stock Prices(円)";
}

/// Series labels of the detail chart
pub const DETAIL_CLOSE_LABEL: &str = "終始値";
pub const DETAIL_SMA_LABEL: &str = "平均値";

/// Heading of the overview price table
pub const OVERVIEW_TABLE_TITLE: &str = "株価 (円)";

/// Human-readable date label used for wide-table columns (e.g. "05 March 2025")
pub const DATE_LABEL_FORMAT: &str = "%d %B %Y";

/// Shown instead of the overview when no company is selected
pub const EMPTY_SELECTION_MESSAGE: &str = "少なくとも一社は選んでください。";

/// Generic banner shown for any fetch or transform failure
pub const GENERIC_ERROR_MESSAGE: &str = "おっと！なにかエラーが起きているようです。";

/// Timeout applied by the HTTP client of the price source
pub const PRICE_SOURCE_TIMEOUT_SECS: u64 = 30;

/// Default price source endpoint
pub const DEFAULT_PRICE_SOURCE_BASE_URL: &str = "https://query2.finance.yahoo.com";
