//! Port Interfaces
//!
//! Define how the poller obtains prices.

use async_trait::async_trait;

use crate::domain::PriceQuote;

/// Why a single symbol produced no price this cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// Transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The proxy reported a throttled lookup.
    #[error("rate limited")]
    Limited,

    /// The response carried no usable price.
    #[error("no usable price")]
    NoPrice,
}

/// Source of the latest price for one symbol.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetch the latest price for `symbol`.
    async fn latest_price(&self, symbol: &str) -> Result<PriceQuote, FeedError>;
}
