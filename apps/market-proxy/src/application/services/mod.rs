//! Application Services
//!
//! Services that orchestrate domain logic and coordinate between ports.
//!
//! - `QuoteService`: cached, budgeted quote/profile/forex lookups and search
//! - `AdvisorService`: LLM completions

mod advisor_service;
mod quote_service;

pub use advisor_service::{AdvisorError, AdvisorService};
pub use quote_service::{QuoteError, QuoteOutcome, QuoteService};
