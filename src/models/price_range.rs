use crate::constants::{PRICE_RANGE_MAX, PRICE_RANGE_MIN};
use crate::error::TransformError;
use serde::Serialize;

/// Visible y-axis bounds of the price charts (JPY).
///
/// Only clamps what the chart shows; tidy tables are never filtered by it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub ymin: f64,
    pub ymax: f64,
}

impl PriceRange {
    /// Bounds must lie within the slider range and satisfy ymin <= ymax
    pub fn new(ymin: f64, ymax: f64) -> Result<Self, TransformError> {
        let in_slider = |v: f64| v.is_finite() && (PRICE_RANGE_MIN..=PRICE_RANGE_MAX).contains(&v);
        if !in_slider(ymin) || !in_slider(ymax) {
            return Err(TransformError::InvalidArgument(format!(
                "price range must lie within {}..={}, got {}..={}",
                PRICE_RANGE_MIN, PRICE_RANGE_MAX, ymin, ymax
            )));
        }
        if ymin > ymax {
            return Err(TransformError::InvalidArgument(format!(
                "ymin {} is above ymax {}",
                ymin, ymax
            )));
        }
        Ok(Self { ymin, ymax })
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            ymin: PRICE_RANGE_MIN,
            ymax: PRICE_RANGE_MAX,
        }
    }
}
