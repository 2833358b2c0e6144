mod price_bar;
mod price_range;
mod price_window;
mod ticker_map;
mod tidy;
mod wide_table;
pub mod indicators;

pub use price_bar::{dedup_by_date, PriceBar};
pub use price_range::PriceRange;
pub use price_window::{Interval, Period, PriceWindow};
pub use ticker_map::TickerMap;
pub use tidy::{TidyRow, TidyTable};
pub use wide_table::{SeriesRow, WideSeriesTable};

/// Price history for a single ticker, oldest first
pub type PriceHistory = Vec<PriceBar>;
