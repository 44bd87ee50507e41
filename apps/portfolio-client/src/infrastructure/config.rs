//! Client configuration from environment variables.

use std::time::Duration;

use crate::application::{DEFAULT_POLL_INTERVAL, PollerConfig};
use crate::domain::{SymbolSet, TradingWindow};

/// Default proxy address.
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3000";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Market proxy base URL, without trailing slash.
    pub proxy_url: String,
    /// Symbols to poll.
    pub symbols: SymbolSet,
    /// Poller tuning.
    pub poller: PollerConfig,
    /// HTTP request timeout.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            symbols: SymbolSet::default(),
            poller: PollerConfig {
                trading_window: Some(TradingWindow::default()),
                ..PollerConfig::default()
            },
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let proxy_url = match lookup("MARKET_PROXY_URL").filter(|v| !v.trim().is_empty()) {
            Some(url) => parse_url("MARKET_PROXY_URL", &url)?,
            None => defaults.proxy_url,
        };

        let symbols = lookup("PORTFOLIO_SYMBOLS")
            .map(|raw| SymbolSet::new(raw.split(',')))
            .unwrap_or_default();

        let interval_secs: u64 = parse_or(&lookup, "POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL.as_secs())?;
        if interval_secs == 0 {
            return Err(ConfigError::invalid("POLL_INTERVAL_SECS", "0"));
        }

        let trading_window = match lookup("POLL_TRADING_HOURS") {
            None => defaults.poller.trading_window,
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(
                raw.parse::<TradingWindow>()
                    .map_err(|_| ConfigError::invalid("POLL_TRADING_HOURS", &raw))?,
            ),
        };

        Ok(Self {
            proxy_url,
            symbols,
            poller: PollerConfig {
                interval: Duration::from_secs(interval_secs),
                batch_size: parse_or(&lookup, "POLL_BATCH_SIZE", defaults.poller.batch_size)?,
                trading_window,
            },
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(key, &raw)),
        _ => Ok(default),
    }
}

fn parse_url(key: &'static str, raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Err(ConfigError::invalid(key, raw))
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable holds a value that cannot be used.
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.poller.interval, Duration::from_secs(60));
        assert_eq!(config.poller.batch_size, 0);
        assert_eq!(config.poller.trading_window, Some(TradingWindow::default()));
    }

    #[test]
    fn full_environment() {
        let config = load(&[
            ("MARKET_PROXY_URL", "https://proxy.example.com/"),
            ("PORTFOLIO_SYMBOLS", "msft, aapl,,AAPL"),
            ("POLL_INTERVAL_SECS", "30"),
            ("POLL_BATCH_SIZE", "15"),
            ("POLL_TRADING_HOURS", "08:00-22:00"),
        ])
        .unwrap();

        assert_eq!(config.proxy_url, "https://proxy.example.com");
        assert_eq!(config.symbols.as_slice(), ["AAPL", "MSFT"]);
        assert_eq!(config.poller.interval, Duration::from_secs(30));
        assert_eq!(config.poller.batch_size, 15);
        assert_eq!(
            config.poller.trading_window.unwrap().to_string(),
            "08:00-22:00"
        );
    }

    #[test]
    fn empty_trading_hours_means_always() {
        let config = load(&[("POLL_TRADING_HOURS", "")]).unwrap();
        assert_eq!(config.poller.trading_window, None);
    }

    #[test]
    fn invalid_values_are_reported() {
        assert!(load(&[("POLL_INTERVAL_SECS", "0")]).is_err());
        assert!(load(&[("POLL_BATCH_SIZE", "many")]).is_err());
        assert!(load(&[("POLL_TRADING_HOURS", "always")]).is_err());
        assert!(load(&[("MARKET_PROXY_URL", "localhost:3000")]).is_err());
    }
}
