pub mod detail;
pub mod overview;
pub mod serve;

use crate::error::Result;
use crate::models::TickerMap;
use crate::services::{Dashboard, EvictionPolicy, OverviewCache, YahooClient};
use crate::utils::{get_cache_max_entries, get_price_source_base_url};
use std::sync::Arc;

/// Dashboard over the live price source with the configured cache policy
pub fn build_dashboard() -> Result<Dashboard> {
    let base_url = get_price_source_base_url();
    let source = YahooClient::new(base_url)?;
    let policy = EvictionPolicy::from_max_entries(get_cache_max_entries());
    tracing::info!(source = %source.base_url(), ?policy, "Price source configured");

    let cache = Arc::new(OverviewCache::new(policy));
    Ok(Dashboard::new(TickerMap::automakers(), Arc::new(source), cache))
}
