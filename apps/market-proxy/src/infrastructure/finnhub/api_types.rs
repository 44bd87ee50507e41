//! Finnhub REST response types.
//!
//! Quote and profile bodies map straight onto the domain payloads; only the
//! search envelope and error body need their own shapes.

use serde::Deserialize;

use crate::domain::market::SymbolMatch;

/// Marker phrase Finnhub uses when the key's quota is spent.
pub const API_LIMIT_PHRASE: &str = "API limit reached";

/// Header carrying the remaining per-minute quota.
pub const QUOTA_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// `/search` response envelope. The provider's `count` is ignored; the
/// proxy reports the size of its filtered list instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    /// Matches.
    #[serde(default)]
    pub result: Vec<SymbolMatch>,
}

/// Error body (`{"error": "..."}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// Provider message.
    pub error: String,
}

/// Whether a provider message signals an exhausted quota.
#[must_use]
pub fn is_limit_message(message: &str) -> bool {
    message.contains(API_LIMIT_PHRASE)
}
