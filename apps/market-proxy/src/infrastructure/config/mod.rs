//! Configuration Module
//!
//! Environment-driven configuration for the proxy service.

mod settings;

pub use settings::{
    AiProvider, AiSettings, ApiKey, ConfigError, DEFAULT_FINNHUB_BASE_URL, DEFAULT_FOREX_URL,
    DEFAULT_SYSTEM_PROMPT, MarketDataSettings, ProxyConfig, ServerSettings,
};
