//! Market Data Types
//!
//! Symbols, lookup intents and the payloads returned by the quote
//! provider. These types are transport-agnostic.

mod intent;
mod payload;
mod search;
mod symbol;

pub use intent::{
    FOREX_KEY_PREFIX, PROFILE_KEY_PREFIX, QuoteIntent, forex_key, profile_key, quote_key,
};
pub use payload::{CompanyProfile, MarketPayload, QuotePayload};
pub use search::{COMMON_STOCK, MAX_SEARCH_RESULTS, SymbolMatch, filter_common_stocks};
pub use symbol::Symbol;
