//! HTTP API
//!
//! Public endpoints: `/market`, `/ai` and `/stock-search`, each also served
//! under `/api`.

mod controller;
mod error;
mod request;
mod response;

pub use controller::{AppState, create_router};
pub use error::ApiError;
pub use request::{AnalyzeRequest, MarketQuery, SearchQuery};
pub use response::{AnalysisResponse, ErrorBody, LimitedResponse, QuoteResponse, SearchResponse};
