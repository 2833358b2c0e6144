use crate::error::RenderFailure;
use crate::models::{dedup_by_date, PriceWindow, TickerMap, WideSeriesTable};
use crate::services::fetch_cache::MemoCache;
use crate::services::price_source::PriceSource;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Memo key of an overview fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverviewKey {
    pub days: u16,
    pub tickers: TickerMap,
}

pub type OverviewCache = MemoCache<OverviewKey, Arc<WideSeriesTable>>;
pub type SharedOverviewCache = Arc<OverviewCache>;

/// Builds the company x date table of closing prices.
///
/// Results are memoized by `(days, tickers)`: a repeated call with identical
/// inputs is answered from the cache without touching the price source.
pub struct OverviewFetcher {
    source: Arc<dyn PriceSource>,
    cache: SharedOverviewCache,
}

impl OverviewFetcher {
    pub fn new(source: Arc<dyn PriceSource>, cache: SharedOverviewCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &SharedOverviewCache {
        &self.cache
    }

    /// Fetch closes of the last `days` days for every company in `tickers`.
    ///
    /// Companies are requested one after another in map order. The first
    /// failure aborts the fetch; nothing partial is returned or cached.
    #[instrument(skip(self, tickers), fields(companies = tickers.len()))]
    pub async fn fetch(&self, days: u16, tickers: &TickerMap) -> Result<Arc<WideSeriesTable>, RenderFailure> {
        let window = PriceWindow::days(days)?;
        let key = OverviewKey {
            days,
            tickers: tickers.clone(),
        };

        if let Some(table) = self.cache.get(&key).await {
            debug!(days, "Overview cache hit");
            return Ok(table);
        }

        info!(days, source = self.source.name(), "Overview cache miss, fetching");

        let mut table = WideSeriesTable::new();
        for (name, symbol) in tickers.iter() {
            let history = dedup_by_date(self.source.history(symbol, &window).await?);
            debug!(company = name, symbol, bars = history.len(), "Fetched closes");
            table.push_series(name, history.into_iter().map(|bar| (bar.date, bar.close)))?;
        }

        let table = Arc::new(table);
        self.cache.insert(key, table.clone()).await;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fetch_cache::EvictionPolicy;
    use crate::services::test_support::{date, StaticPriceSource};

    fn two_company_source() -> Arc<StaticPriceSource> {
        let dates = [date(2025, 1, 6), date(2025, 1, 7)];
        Arc::new(
            StaticPriceSource::new()
                .with_closes("AAA", &dates, &[100.0, 110.0])
                .with_closes("BBB", &dates, &[200.0, 210.0]),
        )
    }

    fn fetcher(source: Arc<StaticPriceSource>) -> OverviewFetcher {
        OverviewFetcher::new(source, Arc::new(OverviewCache::new(EvictionPolicy::Never)))
    }

    #[tokio::test]
    async fn test_fetch_builds_wide_table() {
        let source = two_company_source();
        let tickers = TickerMap::new([("A", "AAA"), ("B", "BBB")]).unwrap();

        let table = fetcher(source.clone()).fetch(2, &tickers).await.unwrap();

        assert_eq!(table.series_names(), vec!["A", "B"]);
        assert_eq!(table.dates(), &[date(2025, 1, 6), date(2025, 1, 7)]);
        assert_eq!(table.row("A").unwrap().values, vec![Some(100.0), Some(110.0)]);
        assert_eq!(table.row("B").unwrap().values, vec![Some(200.0), Some(210.0)]);

        let requested = source.requested();
        assert_eq!(requested[0], ("AAA".to_string(), PriceWindow::Days(2)));
        assert_eq!(requested[1], ("BBB".to_string(), PriceWindow::Days(2)));
    }

    #[tokio::test]
    async fn test_fetch_is_memoized() {
        let source = two_company_source();
        let tickers = TickerMap::new([("A", "AAA"), ("B", "BBB")]).unwrap();
        let fetcher = fetcher(source.clone());

        let first = fetcher.fetch(2, &tickers).await.unwrap();
        let calls_after_first = source.calls();
        let second = fetcher.fetch(2, &tickers).await.unwrap();

        assert_eq!(calls_after_first, 2); // one per company
        assert_eq!(source.calls(), calls_after_first);
        assert!(Arc::ptr_eq(&first, &second));

        fetcher.fetch(3, &tickers).await.unwrap();
        assert_eq!(source.calls(), 4);
        assert_eq!(fetcher.cache().len().await, 2);
    }

    #[tokio::test]
    async fn test_different_ticker_map_is_a_new_key() {
        let source = two_company_source();
        let fetcher = fetcher(source.clone());

        let ab = TickerMap::new([("A", "AAA"), ("B", "BBB")]).unwrap();
        let a = TickerMap::new([("A", "AAA")]).unwrap();

        fetcher.fetch(2, &ab).await.unwrap();
        fetcher.fetch(2, &a).await.unwrap();
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_failure_aborts_and_is_not_cached() {
        let dates = [date(2025, 1, 6)];
        let source = Arc::new(
            StaticPriceSource::new()
                .with_closes("AAA", &dates, &[100.0])
                .failing("BBB"),
        );
        let tickers = TickerMap::new([("A", "AAA"), ("B", "BBB")]).unwrap();
        let fetcher = fetcher(source.clone());

        let err = fetcher.fetch(2, &tickers).await.unwrap_err();
        assert!(matches!(err, RenderFailure::Fetch(_)));
        assert!(fetcher.cache().is_empty().await);

        // A retry goes back to the source
        assert!(fetcher.fetch(2, &tickers).await.is_err());
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn test_same_day_bars_keep_last_close() {
        let source = Arc::new(StaticPriceSource::new().with_closes(
            "AAA",
            &[date(2025, 1, 6), date(2025, 1, 6), date(2025, 1, 7)],
            &[100.0, 105.0, 110.0],
        ));
        let tickers = TickerMap::new([("A", "AAA")]).unwrap();

        let table = fetcher(source).fetch(2, &tickers).await.unwrap();

        assert_eq!(table.dates(), &[date(2025, 1, 6), date(2025, 1, 7)]);
        assert_eq!(table.row("A").unwrap().values, vec![Some(105.0), Some(110.0)]);
    }

    #[tokio::test]
    async fn test_days_out_of_range() {
        let source = two_company_source();
        let tickers = TickerMap::new([("A", "AAA")]).unwrap();
        let fetcher = fetcher(source.clone());

        assert!(matches!(fetcher.fetch(0, &tickers).await, Err(RenderFailure::Transform(_))));
        assert!(matches!(fetcher.fetch(366, &tickers).await, Err(RenderFailure::Transform(_))));
        assert_eq!(source.calls(), 0);
    }
}
