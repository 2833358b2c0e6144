use crate::constants::{MAX_LOOKBACK_DAYS, MIN_LOOKBACK_DAYS};
use crate::error::TransformError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bar interval requested from the price source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// One bar per trading day
    Daily,
    /// One bar per week
    Weekly,
    /// One bar per month
    Monthly,
}

impl Interval {
    /// Interval code understood by the chart endpoint
    pub fn as_query_value(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::Daily
    }
}

/// Named history span, e.g. "6 months"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Months(u8),
    Years(u8),
}

impl Period {
    /// Range code understood by the chart endpoint ("6mo", "1y")
    pub fn as_query_value(&self) -> String {
        match self {
            Period::Months(n) => format!("{}mo", n),
            Period::Years(n) => format!("{}y", n),
        }
    }
}

/// How much history to fetch.
///
/// The overview addresses history by a trailing day count, the detail view by
/// a named period plus bar interval. Both go through this one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceWindow {
    /// Trailing calendar days, daily bars
    Days(u16),
    /// Named period with an explicit interval
    Period { period: Period, interval: Interval },
}

impl PriceWindow {
    /// Trailing day-count window; `days` must be within 1..=365
    pub fn days(days: u16) -> Result<Self, TransformError> {
        if !(MIN_LOOKBACK_DAYS..=MAX_LOOKBACK_DAYS).contains(&days) {
            return Err(TransformError::InvalidArgument(format!(
                "days must be between {} and {}, got {}",
                MIN_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS, days
            )));
        }
        Ok(PriceWindow::Days(days))
    }

    /// Named period window
    pub fn period(period: Period, interval: Interval) -> Self {
        PriceWindow::Period { period, interval }
    }

    pub fn interval(&self) -> Interval {
        match self {
            PriceWindow::Days(_) => Interval::Daily,
            PriceWindow::Period { interval, .. } => *interval,
        }
    }
}

impl fmt::Display for PriceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceWindow::Days(days) => write!(f, "{}d", days),
            PriceWindow::Period { period, interval } => {
                write!(f, "{}/{}", period.as_query_value(), interval.as_query_value())
            }
        }
    }
}
