//! In-memory price source for tests

use crate::error::SourceError;
use crate::models::{PriceBar, PriceHistory, PriceWindow};
use crate::services::price_source::PriceSource;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Serves fixed histories and counts every call
#[derive(Default)]
pub struct StaticPriceSource {
    histories: HashMap<String, PriceHistory>,
    failing: HashSet<String>,
    calls: AtomicUsize,
    windows: Mutex<Vec<(String, PriceWindow)>>,
}

impl StaticPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register closes for `symbol` on consecutive entries of `dates`
    pub fn with_closes(mut self, symbol: &str, dates: &[NaiveDate], closes: &[f64]) -> Self {
        let bars = dates
            .iter()
            .zip(closes)
            .map(|(d, c)| PriceBar::from_close(*d, *c))
            .collect();
        self.histories.insert(symbol.to_string(), bars);
        self
    }

    /// Make every request for `symbol` fail
    pub fn failing(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// (symbol, window) of every call, in call order
    pub fn requested(&self) -> Vec<(String, PriceWindow)> {
        self.windows.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn history(&self, symbol: &str, window: &PriceWindow) -> Result<PriceHistory, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut windows) = self.windows.lock() {
            windows.push((symbol.to_string(), *window));
        }

        if self.failing.contains(symbol) {
            return Err(SourceError::Status {
                symbol: symbol.to_string(),
                status: 503,
            });
        }

        self.histories
            .get(symbol)
            .cloned()
            .ok_or_else(|| SourceError::Symbol {
                symbol: symbol.to_string(),
                message: "No data found, symbol may be delisted".to_string(),
            })
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
