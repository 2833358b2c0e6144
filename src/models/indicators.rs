//! Technical indicators for price series
//!
//! # Warm-up Convention
//! **IMPORTANT**: moving averages here never leave warm-up entries empty.
//!
//! The first `window - 1` outputs average whatever prefix is available
//! (1 value, then 2, ...). From index `window - 1` on, every output is the
//! full trailing-window mean. The output always has the input's length.
//!
//! | Index | Window 5 over [10, 20, 30, 40, 50] | Mean |
//! |-------|-------------------------------------|------|
//! | 0     | [10]                                | 10   |
//! | 1     | [10, 20]                            | 15   |
//! | 2     | [10, 20, 30]                        | 20   |
//! | 3     | [10, 20, 30, 40]                    | 25   |
//! | 4     | [10, 20, 30, 40, 50]                | 30   |

use crate::error::TransformError;

/// Calculate a Simple Moving Average with partial warm-up windows
///
/// # Arguments
/// * `closes` - Closing prices in chronological order
/// * `window` - Trailing window size (e.g. 5)
///
/// # Returns
/// * Vector of the same length as `closes`; entry `i` is the mean of
///   `closes[max(0, i + 1 - window)..=i]`
///
/// # Errors
/// * `InvalidArgument` if `window` is 0 or `closes` is empty
pub fn calculate_sma(closes: &[f64], window: usize) -> Result<Vec<f64>, TransformError> {
    if window == 0 {
        return Err(TransformError::InvalidArgument(
            "moving average window must be positive".to_string(),
        ));
    }
    if closes.is_empty() {
        return Err(TransformError::InvalidArgument(
            "moving average input is empty".to_string(),
        ));
    }

    let mut ma_values = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        let start = (i + 1).saturating_sub(window);
        let slice = &closes[start..=i];
        let sum: f64 = slice.iter().sum();
        ma_values.push(sum / slice.len() as f64);
    }

    Ok(ma_values)
}
