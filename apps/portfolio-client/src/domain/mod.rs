//! Domain Layer - Pure polling and parsing rules.

/// JSON extraction from model output.
pub mod extract;

/// Price values.
pub mod price;

/// Batch cursor and trading window.
pub mod schedule;

/// Normalized symbol lists.
pub mod symbols;

pub use extract::{Extraction, extract_json};
pub use price::PriceQuote;
pub use schedule::{BatchCursor, DEFAULT_BATCH_SIZE, TradingWindow, TradingWindowParseError};
pub use symbols::SymbolSet;
