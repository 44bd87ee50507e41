//! Symbol value object for quote lookups.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Aliases accepted for the single supported forex pair (EUR/USD).
const EUR_USD_ALIASES: &[&str] = &[
    "EURUSD",
    "EUR/USD",
    "EUR-USD",
    "EUR_USD",
    "FX:EURUSD",
    "OANDA:EUR_USD",
];

/// Prefixes marking a forex instrument on the quote provider.
const FOREX_PREFIXES: &[&str] = &["FX:", "OANDA:"];

/// A quote symbol (ticker or provider-prefixed forex instrument).
///
/// Examples:
/// - Equity: "AAPL", "MC.PA"
/// - Forex: "OANDA:EUR_USD", "FX:EURUSD"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Parse a raw symbol, trimming whitespace and upper-casing it.
    ///
    /// Returns `None` if nothing is left after trimming.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_uppercase()))
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the symbol carries a forex provider prefix.
    #[must_use]
    pub fn has_forex_prefix(&self) -> bool {
        FOREX_PREFIXES.iter().any(|p| self.0.starts_with(p))
    }

    /// Check if the symbol names the supported EUR/USD pair.
    #[must_use]
    pub fn is_eur_usd(&self) -> bool {
        EUR_USD_ALIASES.contains(&self.0.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
