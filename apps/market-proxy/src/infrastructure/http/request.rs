//! HTTP request DTOs.

use serde::Deserialize;

/// Query string of `GET /market`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketQuery {
    /// Symbol to look up.
    pub symbol: Option<String>,
    /// Intent: `profile`, `forex`, or omitted for a quote.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Query string of `GET /stock-search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    /// Free-text query.
    pub q: Option<String>,
}

/// Body of `POST /ai`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeRequest {
    /// Prompt forwarded to the model.
    pub prompt: Option<String>,
}
