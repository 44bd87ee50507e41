//! Infrastructure Layer - HTTP adapters and process plumbing.

/// Advisor client with structured extraction.
pub mod advisor;

/// Configuration from environment variables.
pub mod config;

/// HTTP price feed.
pub mod price_feed;

/// Log subscriber setup.
pub mod telemetry;

pub use advisor::{Advice, AdviceError, AdvisorClient};
pub use config::{ClientConfig, ConfigError, DEFAULT_PROXY_URL};
pub use price_feed::HttpPriceFeed;
