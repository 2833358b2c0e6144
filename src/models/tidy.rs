use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One (date, series, value) observation of a long table.
///
/// Field names serialize as the chart's column labels. An empty wide-table
/// cell stays `None` and serializes as `null`, so the row count always equals
/// rows × dates of the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Stock Prices(円)")]
    pub value: Option<f64>,
}

impl TidyRow {
    pub fn new(date: NaiveDate, name: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            date,
            name: name.into(),
            value,
        }
    }
}

/// Long table in reshape order (not necessarily sorted by date)
pub type TidyTable = Vec<TidyRow>;
