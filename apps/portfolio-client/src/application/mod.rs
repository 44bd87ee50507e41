//! Application Layer - Polling service and its ports.

/// Batched price poller.
pub mod poller;

/// Port interfaces.
pub mod ports;

pub use poller::{CycleOutcome, DEFAULT_POLL_INTERVAL, PollerConfig, PricePoller};
pub use ports::{FeedError, PriceFeed};
