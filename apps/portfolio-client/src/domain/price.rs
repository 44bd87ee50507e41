//! Latest known price per symbol.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A successfully fetched price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    /// Last traded price.
    pub price: f64,
    /// Absolute change since previous close.
    pub change: Option<f64>,
    /// Percent change since previous close.
    pub change_percent: Option<f64>,
    /// Previous close.
    pub previous_close: Option<f64>,
    /// Whether the proxy answered from its cache.
    pub cached: bool,
    /// When the client received it.
    pub fetched_at: DateTime<Utc>,
}
