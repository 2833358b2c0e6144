use crate::error::SourceError;
use crate::models::{PriceHistory, PriceWindow};
use async_trait::async_trait;

/// Remote provider of daily price history.
///
/// Implementations fail on network errors and unknown symbols. A valid symbol
/// without trades in the window yields `Ok` with an empty history.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Name of this provider, for logs
    fn name(&self) -> &str;

    /// Fetch the bars of `symbol` covering `window`, oldest first
    async fn history(&self, symbol: &str, window: &PriceWindow) -> Result<PriceHistory, SourceError>;
}
