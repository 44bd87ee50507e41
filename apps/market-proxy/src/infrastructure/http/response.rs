//! HTTP response DTOs.

use serde::Serialize;

use crate::domain::market::{QuotePayload, Symbol, SymbolMatch};
use crate::domain::rate_limit::LimitOrigin;

/// Quote body: provider fields plus a cache marker.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    /// Quote fields.
    #[serde(flatten)]
    pub payload: QuotePayload,
    /// Present (and `true`) only when served from cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

impl QuoteResponse {
    /// Wrap a payload.
    #[must_use]
    pub fn new(payload: QuotePayload, cached: bool) -> Self {
        Self {
            payload,
            cached: cached.then_some(true),
        }
    }
}

/// Throttled-quote body, shaped so clients can keep their previous price.
#[derive(Debug, Clone, Serialize)]
pub struct LimitedResponse {
    /// Human-readable reason.
    pub error: String,
    /// Normalized symbol.
    pub symbol: Symbol,
    /// Fallback price.
    pub c: f64,
    /// Always `true`.
    pub limited: bool,
}

impl LimitedResponse {
    /// Build the body for a throttled symbol.
    #[must_use]
    pub fn new(symbol: Symbol, origin: LimitOrigin) -> Self {
        let error = match origin {
            LimitOrigin::Local => "Limite de requêtes atteinte, réessayez dans une minute",
            LimitOrigin::Upstream => "Limite de l'API de marché atteinte",
        };
        Self {
            error: error.to_string(),
            symbol,
            c: 0.0,
            limited: true,
        }
    }
}

/// Body of a successful `POST /ai`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    /// Raw model text.
    pub analysis: String,
}

/// Body of a successful `GET /stock-search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    /// Matches.
    pub results: Vec<SymbolMatch>,
    /// Number of matches returned.
    pub count: usize,
}

impl From<Vec<SymbolMatch>> for SearchResponse {
    fn from(results: Vec<SymbolMatch>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

/// Error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Error summary.
    pub error: String,
    /// Underlying cause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
