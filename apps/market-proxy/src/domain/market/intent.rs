//! Lookup intents and the cache keys they map to.

use super::Symbol;

/// Cache key prefix for company profiles.
pub const PROFILE_KEY_PREFIX: &str = "profile_";

/// Cache key prefix for synthesized forex quotes.
pub const FOREX_KEY_PREFIX: &str = "forex_";

/// What the caller wants to know about a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteIntent {
    /// Latest price quote.
    Quote,
    /// Company metadata.
    Profile,
    /// Exchange rate for the supported forex pair.
    Forex,
}

impl QuoteIntent {
    /// Resolve the intent from the optional `type` query value.
    ///
    /// An omitted type on a EUR/USD alias selects [`QuoteIntent::Forex`].
    /// Unknown values fall back to a plain quote.
    #[must_use]
    pub fn resolve(kind: Option<&str>, symbol: &Symbol) -> Self {
        match kind.map(|k| k.trim().to_lowercase()).as_deref() {
            Some("profile") => Self::Profile,
            Some("forex") => Self::Forex,
            None | Some("") if symbol.is_eur_usd() => Self::Forex,
            _ => Self::Quote,
        }
    }

    /// Get the intent name for logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Profile => "profile",
            Self::Forex => "forex",
        }
    }
}

/// Cache key for a plain quote.
#[must_use]
pub fn quote_key(symbol: &Symbol) -> String {
    symbol.as_str().to_string()
}

/// Cache key for a company profile.
#[must_use]
pub fn profile_key(symbol: &Symbol) -> String {
    format!("{PROFILE_KEY_PREFIX}{symbol}")
}

/// Cache key for a synthesized forex quote.
#[must_use]
pub fn forex_key(symbol: &Symbol) -> String {
    format!("{FOREX_KEY_PREFIX}{symbol}")
}
