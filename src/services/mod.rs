pub mod chart;
pub mod dashboard;
pub mod export;
pub mod fetch_cache;
pub mod overview_fetcher;
pub mod price_source;
pub mod reshape;
pub mod yahoo;

#[cfg(test)]
pub(crate) mod test_support;

pub use chart::line_chart;
pub use dashboard::{
    Dashboard, DashboardPage, DashboardRequest, DetailBar, DetailSection, OverviewSection, WideTableView,
};
pub use export::tidy_to_csv;
pub use fetch_cache::{EvictionPolicy, MemoCache};
pub use overview_fetcher::{OverviewCache, OverviewFetcher, OverviewKey, SharedOverviewCache};
pub use price_source::PriceSource;
pub use reshape::reshape;
pub use yahoo::YahooClient;
