pub mod fundamentals;
pub mod indicators;
pub mod movements;
pub mod types;
pub mod yahoo;

use crate::domain::stock::{MarketIndexSummary, StockData, TickerMatch};
use crate::error::ProviderError;

/// Source of prices, indicators, index levels and ticker lookups.
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn stock_data(&self, ticker: &str) -> Result<StockData, ProviderError>;

    async fn market_summary(&self) -> Result<Vec<MarketIndexSummary>, ProviderError>;

    async fn search(&self, query: &str) -> Result<Vec<TickerMatch>, ProviderError>;
}
