//! Wide series table: one row per series, one column per date.
//!
//! Rows are appended independently. The date axis is the union of every
//! appended series' dates in order of first appearance, so a ticker that did
//! not trade on some other ticker's trading day simply has an empty cell there.
//! Nothing is forward-filled or reindexed.

use crate::error::TransformError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// One named row of a wide table, one optional value per date column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideSeriesTable {
    dates: Vec<NaiveDate>,
    date_index: HashMap<NaiveDate, usize>,
    rows: Vec<SeriesRow>,
}

impl WideSeriesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a table from a date axis and rows without checking row lengths.
    ///
    /// Ragged input is accepted here and rejected by the reshaper.
    pub fn from_parts(dates: Vec<NaiveDate>, rows: Vec<SeriesRow>) -> Self {
        let date_index = dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();
        Self {
            dates,
            date_index,
            rows,
        }
    }

    /// Append one series as a new row.
    ///
    /// Dates not yet on the axis are appended to it; existing rows get an empty
    /// cell for them. A repeated date within the series keeps the last value.
    pub fn push_series<I>(&mut self, name: impl Into<String>, points: I) -> Result<(), TransformError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let name = name.into();
        if self.row(&name).is_some() {
            return Err(TransformError::DuplicateSeries(name));
        }

        let mut values = vec![None; self.dates.len()];
        for (date, value) in points {
            let idx = match self.date_index.get(&date) {
                Some(&idx) => idx,
                None => {
                    let idx = self.dates.len();
                    self.dates.push(date);
                    self.date_index.insert(date, idx);
                    for row in &mut self.rows {
                        row.values.push(None);
                    }
                    values.push(None);
                    idx
                }
            };
            values[idx] = Some(value);
        }

        self.rows.push(SeriesRow { name, values });
        Ok(())
    }

    /// Keep only the named rows, in the requested order
    pub fn select(&self, names: &[String]) -> Result<WideSeriesTable, TransformError> {
        let mut rows = Vec::with_capacity(names.len());
        for name in names {
            let row = self
                .row(name)
                .ok_or_else(|| TransformError::UnknownSeries(name.clone()))?;
            if rows.iter().any(|r: &SeriesRow| &r.name == name) {
                return Err(TransformError::DuplicateSeries(name.clone()));
            }
            rows.push(row.clone());
        }
        Ok(Self::from_parts(self.dates.clone(), rows))
    }

    /// Copy of the table with rows sorted by series name
    pub fn sorted_by_name(&self) -> WideSeriesTable {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Self::from_parts(self.dates.clone(), rows)
    }

    pub fn row(&self, name: &str) -> Option<&SeriesRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    pub fn series_names(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.name.clone()).collect()
    }

    /// Number of rows (series)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of date columns
    pub fn date_count(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
