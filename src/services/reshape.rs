//! Wide-to-long reshaping for charts
//!
//! A wide table (one row per series, one column per date) is transposed so
//! dates become rows, then melted with the date as identifier: every
//! (date, series) cell becomes one tidy row. Output order is row-major over
//! the transposed table:
//!
//! ```text
//!         d1   d2                 Date Name value
//!   A    100  110       ->        d1   A    100
//!   B    200  210                 d1   B    200
//!                                 d2   A    110
//!                                 d2   B    210
//! ```

use crate::error::TransformError;
use crate::models::{TidyRow, TidyTable, WideSeriesTable};

/// Melt a wide table into a tidy table of `rows x dates` observations
pub fn reshape(wide: &WideSeriesTable) -> Result<TidyTable, TransformError> {
    let dates = wide.dates();

    for row in wide.rows() {
        if row.values.len() != dates.len() {
            return Err(TransformError::RaggedRow {
                name: row.name.clone(),
                expected: dates.len(),
                found: row.values.len(),
            });
        }
    }

    let mut tidy = Vec::with_capacity(dates.len() * wide.row_count());
    for (col, date) in dates.iter().enumerate() {
        for row in wide.rows() {
            tidy.push(TidyRow::new(*date, row.name.clone(), row.values[col]));
        }
    }

    Ok(tidy)
}
