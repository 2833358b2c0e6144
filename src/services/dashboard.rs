//! Render pipeline
//!
//! One render pass recomputes the whole page top to bottom from the widget
//! values: overview section (memoized fetch, company filter, reshape, chart)
//! then detail section (6-month daily fetch, SMA, reshape, chart).
//!
//! The outcome is typed. An empty company selection is a normal overview state
//! ([`OverviewSection::SelectionEmpty`]); fetch and transform problems surface
//! as [`RenderFailure`] and abort the pass.

use crate::constants::{
    DEFAULT_DETAIL_COMPANY, DEFAULT_LOOKBACK_DAYS, DEFAULT_SMA_WINDOW, DETAIL_CLOSE_LABEL,
    DETAIL_PERIOD_MONTHS, DETAIL_SMA_LABEL, EMPTY_SELECTION_MESSAGE, OVERVIEW_TABLE_TITLE,
};
use crate::error::{RenderFailure, TransformError};
use crate::models::indicators::calculate_sma;
use crate::models::{
    dedup_by_date, Interval, Period, PriceRange, PriceWindow, SeriesRow, TickerMap, TidyTable, WideSeriesTable,
};
use crate::services::chart::line_chart;
use crate::services::overview_fetcher::{OverviewFetcher, SharedOverviewCache};
use crate::services::price_source::PriceSource;
use crate::services::reshape::reshape;
use crate::utils::format_date_label;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Widget values of one render pass
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    pub days: u16,
    /// Companies shown in the overview, in selection order
    pub companies: Vec<String>,
    pub range: PriceRange,
    /// Company of the detail section
    pub firm: String,
}

impl DashboardRequest {
    /// Initial widget state: 180 days, every company, full price range, TOYOTA
    pub fn defaults(tickers: &TickerMap) -> Self {
        Self {
            days: DEFAULT_LOOKBACK_DAYS,
            companies: tickers.names(),
            range: PriceRange::default(),
            firm: DEFAULT_DETAIL_COMPANY.to_string(),
        }
    }
}

/// Wide table as displayed: human-readable date labels, rows sorted by name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideTableView {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<SeriesRow>,
}

impl WideTableView {
    fn sorted(title: &str, table: &WideSeriesTable) -> Self {
        let sorted = table.sorted_by_name();
        Self {
            title: title.to_string(),
            columns: sorted.dates().iter().map(format_date_label).collect(),
            rows: sorted.rows().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OverviewSection {
    Ready {
        table: WideTableView,
        tidy: TidyTable,
        chart: Value,
    },
    SelectionEmpty {
        message: String,
    },
}

impl OverviewSection {
    pub fn is_ready(&self) -> bool {
        matches!(self, OverviewSection::Ready { .. })
    }
}

/// One row of the detail data table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub sma05: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailSection {
    pub company: String,
    pub title: String,
    pub bars: Vec<DetailBar>,
    pub tidy: TidyTable,
    pub chart: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPage {
    pub days: u16,
    pub heading: String,
    pub overview: OverviewSection,
    pub detail: DetailSection,
}

pub struct Dashboard {
    tickers: TickerMap,
    source: Arc<dyn PriceSource>,
    overview: OverviewFetcher,
    sma_window: usize,
}

impl Dashboard {
    pub fn new(tickers: TickerMap, source: Arc<dyn PriceSource>, cache: SharedOverviewCache) -> Self {
        let overview = OverviewFetcher::new(source.clone(), cache);
        Self {
            tickers,
            source,
            overview,
            sma_window: DEFAULT_SMA_WINDOW,
        }
    }

    pub fn with_sma_window(mut self, window: usize) -> Self {
        self.sma_window = window;
        self
    }

    pub fn tickers(&self) -> &TickerMap {
        &self.tickers
    }

    pub fn sma_window(&self) -> usize {
        self.sma_window
    }

    pub fn overview_fetcher(&self) -> &OverviewFetcher {
        &self.overview
    }

    /// Render the full page. The overview is computed first; a failure there
    /// aborts the pass before the detail fetch.
    #[instrument(skip(self, request), fields(days = request.days, firm = %request.firm))]
    pub async fn render(&self, request: &DashboardRequest) -> Result<DashboardPage, RenderFailure> {
        let overview = self
            .render_overview(request.days, &request.companies, &request.range)
            .await?;
        let detail = self.render_detail(&request.firm, &request.range).await?;

        Ok(DashboardPage {
            days: request.days,
            heading: page_heading(request.days),
            overview,
            detail,
        })
    }

    /// Overview section for the selected companies.
    ///
    /// The whole ticker map is fetched (and memoized) and then filtered, so
    /// changing the selection never triggers a new fetch. An empty selection
    /// short-circuits before anything is fetched.
    pub async fn render_overview(
        &self,
        days: u16,
        companies: &[String],
        range: &PriceRange,
    ) -> Result<OverviewSection, RenderFailure> {
        if companies.is_empty() {
            debug!("No company selected, skipping overview");
            return Ok(OverviewSection::SelectionEmpty {
                message: EMPTY_SELECTION_MESSAGE.to_string(),
            });
        }

        let table = self.overview.fetch(days, &self.tickers).await?;
        let selected = table.select(companies)?;
        let tidy = reshape(&selected)?;
        let chart = line_chart(&tidy, range);

        Ok(OverviewSection::Ready {
            table: WideTableView::sorted(OVERVIEW_TABLE_TITLE, &selected),
            tidy,
            chart,
        })
    }

    /// Detail section: 6 months of daily bars for one company plus its SMA
    pub async fn render_detail(&self, company: &str, range: &PriceRange) -> Result<DetailSection, RenderFailure> {
        let symbol = self
            .tickers
            .symbol(company)
            .ok_or_else(|| TransformError::UnknownSeries(company.to_string()))?;

        let window = PriceWindow::period(Period::Months(DETAIL_PERIOD_MONTHS), Interval::Daily);
        let history = dedup_by_date(self.source.history(symbol, &window).await?);
        info!(company, symbol, bars = history.len(), "Fetched detail history");

        // A symbol with no trades in the window renders an empty chart
        let closes: Vec<f64> = history.iter().map(|bar| bar.close).collect();
        let sma = if closes.is_empty() {
            Vec::new()
        } else {
            calculate_sma(&closes, self.sma_window)?
        };

        let bars: Vec<DetailBar> = history
            .iter()
            .zip(&sma)
            .map(|(bar, &sma05)| DetailBar {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                sma05,
            })
            .collect();

        let mut wide = WideSeriesTable::new();
        wide.push_series(DETAIL_CLOSE_LABEL, bars.iter().map(|b| (b.date, b.close)))?;
        wide.push_series(DETAIL_SMA_LABEL, bars.iter().map(|b| (b.date, b.sma05)))?;
        let tidy = reshape(&wide)?;
        let chart = line_chart(&tidy, range);

        Ok(DetailSection {
            company: company.to_string(),
            title: format!("{}の株価グラフ", company),
            bars,
            tidy,
            chart,
        })
    }
}

pub fn page_heading(days: u16) -> String {
    format!("過去 {}日間 の日本自動車メーカー株価", days)
}
