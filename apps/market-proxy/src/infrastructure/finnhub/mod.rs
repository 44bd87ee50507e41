//! Finnhub Quote Provider
//!
//! REST adapter for quotes (`/quote`), company profiles
//! (`/stock/profile2`) and symbol search (`/search`).

mod api_types;
mod client;

pub use api_types::{API_LIMIT_PHRASE, QUOTA_REMAINING_HEADER};
pub use client::FinnhubClient;
