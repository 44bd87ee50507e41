//! Port Interfaces
//!
//! Contracts for the upstream systems the proxy talks to. Infrastructure
//! adapters implement these; services depend only on the traits.
//!
//! ## Driven Ports (Outbound)
//!
//! - `MarketDataPort`: quote, profile and symbol search provider
//! - `ForexRatePort`: secondary exchange-rate source for EUR/USD
//! - `CompletionPort`: LLM text generation
//!
//! Cache and budget ports live in the domain layer
//! ([`crate::domain::cache::QuoteStore`], [`crate::domain::rate_limit::RequestBudget`]).

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::market::{CompanyProfile, QuotePayload, Symbol, SymbolMatch};

/// Errors from an upstream provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Provider is throttling us (status 429 or a limit message).
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Provider message or status text.
        message: String,
    },

    /// Provider returned a non-success status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Provider message or status text.
        message: String,
    },

    /// Request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Format(String),

    /// No credential configured for this provider.
    #[error("Missing credential for {0}")]
    MissingCredential(&'static str),
}

impl UpstreamError {
    /// Whether another attempt may succeed (throttling, 5xx, network).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Network(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Format(_) | Self::MissingCredential(_) => false,
        }
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Quote provider (quotes, company profiles, symbol search).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Whether an API key is configured.
    fn is_configured(&self) -> bool;

    /// Fetch the latest quote for a symbol.
    ///
    /// # Errors
    ///
    /// Returns `RateLimited` when the provider throttles, `Status` for other
    /// non-success responses.
    async fn quote(&self, symbol: &Symbol) -> Result<QuotePayload, UpstreamError>;

    /// Fetch company metadata for a symbol.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a profile.
    async fn profile(&self, symbol: &Symbol) -> Result<CompanyProfile, UpstreamError>;

    /// Search instruments matching a free-text query.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>, UpstreamError>;
}

/// Exchange-rate source for the EUR/USD pair.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForexRatePort: Send + Sync {
    /// Current EUR to USD rate.
    ///
    /// # Errors
    ///
    /// Returns error if the source is unreachable or has no USD rate.
    async fn eur_usd_rate(&self) -> Result<f64, UpstreamError>;
}

/// LLM text generation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Provider name for logs and metrics.
    fn provider(&self) -> &'static str;

    /// Whether an API key is configured.
    fn is_configured(&self) -> bool;

    /// Generate text for a prompt. `Ok(None)` means the model answered
    /// without any text.
    ///
    /// # Errors
    ///
    /// Returns the last upstream error once retries are exhausted.
    async fn complete(&self, prompt: &str) -> Result<Option<String>, UpstreamError>;
}
