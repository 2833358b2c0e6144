use crate::error::{AppError, Result};
use crate::models::TidyTable;

/// Write a tidy table as CSV with the chart's column labels as header.
///
/// Missing values become empty fields.
pub fn tidy_to_csv(rows: &TidyTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Io(format!("CSV flush error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Io(format!("CSV encoding error: {}", e)))
}
