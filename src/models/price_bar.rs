use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One bar of price history as returned by the price source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date in the exchange's time zone
    pub date: NaiveDate,

    /// Opening price
    pub open: f64,

    /// Highest price
    pub high: f64,

    /// Lowest price
    pub low: f64,

    /// Closing price
    pub close: f64,

    /// Trading volume
    pub volume: u64,
}

impl PriceBar {
    /// Create a new bar
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Bar carrying only a close (open/high/low set to the close, no volume)
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self::new(date, close, close, close, close, 0)
    }
}

/// Sort bars by date and keep one bar per trading date.
///
/// When two bars fall on the same exchange-local date (e.g. a settled bar and
/// the live bar of an unsettled session), the later one in input order wins.
pub fn dedup_by_date(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    // stable: equal dates keep input order
    bars.sort_by_key(|bar| bar.date);

    let mut unique: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match unique.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => unique.push(bar),
        }
    }
    unique
}
