#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening
    )
)]

//! Portfolio Client - Price poller and advisor client
//!
//! Consumer side of the market proxy: keeps a continuously updated price
//! map for a portfolio and requests AI analysis.
//!
//! # Layers
//!
//! - **Domain**: symbol normalization, batch cursor, trading window, JSON
//!   extraction
//! - **Application**: `PricePoller` and the `PriceFeed` port
//! - **Infrastructure**: HTTP price feed, advisor client, configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Domain layer - Pure polling and parsing rules.
pub mod domain;

/// Application layer - Polling service and ports.
pub mod application;

/// Infrastructure layer - HTTP adapters and configuration.
pub mod infrastructure;

pub use application::{CycleOutcome, FeedError, PollerConfig, PriceFeed, PricePoller};
pub use domain::{Extraction, PriceQuote, SymbolSet, TradingWindow, extract_json};
pub use infrastructure::{Advice, AdviceError, AdvisorClient, ClientConfig, HttpPriceFeed};
