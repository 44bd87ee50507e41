//! Symbol search results.

use serde::{Deserialize, Serialize};

/// Instrument type kept by the search endpoint.
pub const COMMON_STOCK: &str = "Common Stock";

/// Maximum number of matches returned to callers.
pub const MAX_SEARCH_RESULTS: usize = 10;

/// One instrument matching a search query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolMatch {
    /// Provider symbol.
    pub symbol: String,
    /// Company or instrument name.
    #[serde(default)]
    pub description: String,
    /// Symbol as displayed by the provider.
    #[serde(default)]
    pub display_symbol: String,
    /// Instrument type (e.g. "Common Stock", "ETP").
    #[serde(rename = "type", default, skip_serializing)]
    pub kind: Option<String>,
}

/// Keep common stocks only, capped at [`MAX_SEARCH_RESULTS`].
#[must_use]
pub fn filter_common_stocks(matches: Vec<SymbolMatch>) -> Vec<SymbolMatch> {
    matches
        .into_iter()
        .filter(|m| m.kind.as_deref() == Some(COMMON_STOCK))
        .take(MAX_SEARCH_RESULTS)
        .collect()
}
