//! Quote Service
//!
//! Resolves a symbol lookup through the cache, the request budget and the
//! upstream providers:
//!
//! 1. `profile`: cached for 24 h; upstream failures degrade to an empty
//!    profile.
//! 2. `forex` on a EUR/USD alias: synthesized from the exchange-rate
//!    source; any failure falls through to a plain quote.
//! 3. Plain quote: cached (10 min, 2 min for forex instruments), gated by
//!    the request budget. Throttling, local or upstream, is reported as a
//!    [`QuoteOutcome::Limited`] value rather than an error.

use std::sync::Arc;

use thiserror::Error;

use crate::application::ports::{ForexRatePort, MarketDataPort, UpstreamError};
use crate::domain::cache::QuoteStore;
use crate::domain::clock::Clock;
use crate::domain::market::{
    CompanyProfile, MarketPayload, QuoteIntent, QuotePayload, Symbol, SymbolMatch,
    filter_common_stocks, forex_key, profile_key, quote_key,
};
use crate::domain::rate_limit::{LimitOrigin, RateWindowSnapshot, RequestBudget};
use crate::infrastructure::metrics;

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    /// Price quote, fresh from upstream or served from cache.
    Quote {
        /// Quote fields.
        payload: QuotePayload,
        /// Whether the payload came from the cache.
        cached: bool,
    },
    /// Company profile (empty when the provider failed).
    Profile(CompanyProfile),
    /// Request was throttled; the caller should retry later.
    Limited {
        /// Normalized symbol.
        symbol: Symbol,
        /// Who throttled the request.
        origin: LimitOrigin,
    },
}

/// Quote lookup errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuoteError {
    /// Quote provider key is not configured.
    #[error("Clé API manquante")]
    MissingApiKey,

    /// Symbol was missing or blank.
    #[error("Symbole requis")]
    InvalidSymbol,

    /// Search query was missing or blank.
    #[error("Requête de recherche requise")]
    EmptyQuery,

    /// Search refused by a rate limit.
    #[error("Limite de requêtes atteinte")]
    Throttled(LimitOrigin),

    /// Upstream failure other than throttling.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Quote retrieval with caching and a request budget.
///
/// One instance per process; the cache and budget live as long as it does.
pub struct QuoteService {
    market: Arc<dyn MarketDataPort>,
    forex: Arc<dyn ForexRatePort>,
    cache: Arc<dyn QuoteStore>,
    budget: Arc<dyn RequestBudget>,
    clock: Arc<dyn Clock>,
}

impl QuoteService {
    /// Create a new quote service.
    #[must_use]
    pub fn new(
        market: Arc<dyn MarketDataPort>,
        forex: Arc<dyn ForexRatePort>,
        cache: Arc<dyn QuoteStore>,
        budget: Arc<dyn RequestBudget>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            market,
            forex,
            cache,
            budget,
            clock,
        }
    }

    /// Look up `raw_symbol` for the intent named by `kind`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSymbol` for a blank symbol, then `MissingApiKey` when
    /// the provider key is absent, and `Upstream` for provider failures on
    /// the plain quote path.
    pub async fn fetch(
        &self,
        raw_symbol: &str,
        kind: Option<&str>,
    ) -> Result<QuoteOutcome, QuoteError> {
        let symbol = Symbol::parse(raw_symbol).ok_or(QuoteError::InvalidSymbol)?;
        if !self.market.is_configured() {
            return Err(QuoteError::MissingApiKey);
        }
        let intent = QuoteIntent::resolve(kind, &symbol);

        let outcome = match intent {
            QuoteIntent::Profile => Ok(QuoteOutcome::Profile(self.fetch_profile(&symbol).await)),
            QuoteIntent::Forex if symbol.is_eur_usd() => match self.fetch_forex(&symbol).await {
                Some(outcome) => Ok(outcome),
                None => self.fetch_quote(symbol).await,
            },
            QuoteIntent::Forex | QuoteIntent::Quote => self.fetch_quote(symbol).await,
        };

        metrics::set_cache_entries(self.cache.len());
        outcome
    }

    /// Search common stocks matching `query`.
    ///
    /// Shares the request budget with quote lookups.
    ///
    /// # Errors
    ///
    /// Returns `EmptyQuery`, `MissingApiKey`, `Throttled` or `Upstream`.
    pub async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>, QuoteError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QuoteError::EmptyQuery);
        }
        if !self.market.is_configured() {
            return Err(QuoteError::MissingApiKey);
        }
        if !self.budget.try_acquire() {
            metrics::record_rate_limited(LimitOrigin::Local);
            return Err(QuoteError::Throttled(LimitOrigin::Local));
        }

        match self.market.search(query).await {
            Ok(matches) => Ok(filter_common_stocks(matches)),
            Err(UpstreamError::RateLimited { .. }) => {
                metrics::record_rate_limited(LimitOrigin::Upstream);
                Err(QuoteError::Throttled(LimitOrigin::Upstream))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Entries currently held by the cache.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Current request-budget usage.
    #[must_use]
    pub fn budget_snapshot(&self) -> RateWindowSnapshot {
        self.budget.snapshot()
    }

    /// Whether the quote provider key is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.market.is_configured()
    }

    async fn fetch_profile(&self, symbol: &Symbol) -> CompanyProfile {
        let key = profile_key(symbol);
        if let Some(MarketPayload::Profile(profile)) = self.cache.get(&key) {
            metrics::record_cache_hit(QuoteIntent::Profile.as_str());
            tracing::debug!(symbol = %symbol, "Profile served from cache");
            return profile;
        }
        metrics::record_cache_miss(QuoteIntent::Profile.as_str());

        match self.market.profile(symbol).await {
            Ok(profile) => {
                if profile.has_usable_name() {
                    self.cache.set(&key, MarketPayload::Profile(profile.clone()));
                }
                profile
            }
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "Profile lookup failed");
                CompanyProfile::default()
            }
        }
    }

    async fn fetch_forex(&self, symbol: &Symbol) -> Option<QuoteOutcome> {
        let key = forex_key(symbol);
        if let Some(MarketPayload::Quote(payload)) = self.cache.get(&key) {
            metrics::record_cache_hit(QuoteIntent::Forex.as_str());
            return Some(QuoteOutcome::Quote {
                payload,
                cached: true,
            });
        }
        metrics::record_cache_miss(QuoteIntent::Forex.as_str());

        match self.forex.eur_usd_rate().await {
            Ok(rate) if rate.is_finite() && rate > 0.0 => {
                let now_secs = self.clock.now_millis() / 1000;
                let payload = QuotePayload::from_rate(rate, now_secs);
                self.cache.set(&key, MarketPayload::Quote(payload.clone()));
                tracing::debug!(symbol = %symbol, rate, "Forex rate fetched");
                Some(QuoteOutcome::Quote {
                    payload,
                    cached: false,
                })
            }
            Ok(rate) => {
                tracing::warn!(symbol = %symbol, rate, "Unusable forex rate, falling back to quote");
                None
            }
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "Forex source failed, falling back to quote");
                None
            }
        }
    }

    async fn fetch_quote(&self, symbol: Symbol) -> Result<QuoteOutcome, QuoteError> {
        let key = quote_key(&symbol);
        if let Some(MarketPayload::Quote(payload)) = self.cache.get(&key) {
            metrics::record_cache_hit(QuoteIntent::Quote.as_str());
            return Ok(QuoteOutcome::Quote {
                payload,
                cached: true,
            });
        }
        metrics::record_cache_miss(QuoteIntent::Quote.as_str());

        if !self.budget.try_acquire() {
            tracing::info!(symbol = %symbol, "Local request budget exhausted");
            metrics::record_rate_limited(LimitOrigin::Local);
            return Ok(QuoteOutcome::Limited {
                symbol,
                origin: LimitOrigin::Local,
            });
        }

        match self.market.quote(&symbol).await {
            Ok(payload) => {
                if payload.usable_price().is_some() {
                    self.cache.set(&key, MarketPayload::Quote(payload.clone()));
                } else {
                    tracing::debug!(symbol = %symbol, "Quote without usable price, not cached");
                }
                Ok(QuoteOutcome::Quote {
                    payload,
                    cached: false,
                })
            }
            Err(UpstreamError::RateLimited { message }) => {
                tracing::warn!(symbol = %symbol, detail = %message, "Quote provider throttled request");
                metrics::record_rate_limited(LimitOrigin::Upstream);
                Ok(QuoteOutcome::Limited {
                    symbol,
                    origin: LimitOrigin::Upstream,
                })
            }
            Err(e) => {
                tracing::error!(symbol = %symbol, error = %e, "Quote lookup failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockForexRatePort, MockMarketDataPort};
    use crate::domain::cache::QuoteCache;
    use crate::domain::clock::ManualClock;
    use crate::domain::rate_limit::FixedWindowRateLimiter;

    const T0: i64 = 1_700_000_000_000;

    struct Harness {
        clock: Arc<ManualClock>,
        service: QuoteService,
    }

    fn harness(market: MockMarketDataPort, forex: MockForexRatePort, budget: u32) -> Harness {
        let clock = Arc::new(ManualClock::new(T0));
        let service = QuoteService::new(
            Arc::new(market),
            Arc::new(forex),
            Arc::new(QuoteCache::new(clock.clone())),
            Arc::new(FixedWindowRateLimiter::new(budget, clock.clone())),
            clock.clone(),
        );
        Harness { clock, service }
    }

    fn configured_market() -> MockMarketDataPort {
        let mut market = MockMarketDataPort::new();
        market.expect_is_configured().return_const(true);
        market
    }

    fn priced(c: f64) -> QuotePayload {
        QuotePayload {
            c: Some(c),
            d: Some(1.0),
            dp: Some(0.5),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn missing_key_is_checked_after_input() {
        let mut market = MockMarketDataPort::new();
        market.expect_is_configured().return_const(false);
        market.expect_quote().never();
        market.expect_search().never();
        let h = harness(market, MockForexRatePort::new(), 30);

        assert_eq!(
            h.service.fetch("", None).await,
            Err(QuoteError::InvalidSymbol)
        );
        assert_eq!(h.service.search(" ").await, Err(QuoteError::EmptyQuery));
        assert_eq!(
            h.service.fetch("AAPL", None).await,
            Err(QuoteError::MissingApiKey)
        );
        assert_eq!(
            h.service.search("apple").await,
            Err(QuoteError::MissingApiKey)
        );
    }

    #[tokio::test]
    async fn blank_symbol_is_rejected() {
        let h = harness(configured_market(), MockForexRatePort::new(), 30);
        assert_eq!(
            h.service.fetch("   ", None).await,
            Err(QuoteError::InvalidSymbol)
        );
    }

    #[tokio::test]
    async fn second_quote_is_served_from_cache() {
        let mut market = configured_market();
        market
            .expect_quote()
            .times(1)
            .returning(|_| Ok(priced(150.0)));
        let h = harness(market, MockForexRatePort::new(), 30);

        let first = h.service.fetch("aapl", None).await.unwrap();
        assert_eq!(
            first,
            QuoteOutcome::Quote {
                payload: priced(150.0),
                cached: false
            }
        );
        let second = h.service.fetch("AAPL", None).await.unwrap();
        assert_eq!(
            second,
            QuoteOutcome::Quote {
                payload: priced(150.0),
                cached: true
            }
        );
    }

    #[tokio::test]
    async fn quote_without_price_is_not_cached() {
        let mut market = configured_market();
        market
            .expect_quote()
            .times(2)
            .returning(|_| Ok(QuotePayload::default()));
        let h = harness(market, MockForexRatePort::new(), 30);

        for _ in 0..2 {
            let outcome = h.service.fetch("ZZZZ", None).await.unwrap();
            assert!(matches!(outcome, QuoteOutcome::Quote { cached: false, .. }));
        }
        assert_eq!(h.service.cache_len(), 0);
    }

    #[tokio::test]
    async fn exhausted_budget_yields_local_limit() {
        let mut market = configured_market();
        market.expect_quote().times(2).returning(|_| Ok(priced(1.0)));
        let h = harness(market, MockForexRatePort::new(), 2);

        h.service.fetch("A", None).await.unwrap();
        h.service.fetch("B", None).await.unwrap();
        let third = h.service.fetch("C", None).await.unwrap();
        assert_eq!(
            third,
            QuoteOutcome::Limited {
                symbol: Symbol::parse("C").unwrap(),
                origin: LimitOrigin::Local
            }
        );

        // Cached symbols do not need the budget.
        assert!(matches!(
            h.service.fetch("A", None).await.unwrap(),
            QuoteOutcome::Quote { cached: true, .. }
        ));
    }

    #[tokio::test]
    async fn upstream_throttle_is_a_limited_outcome() {
        let mut market = configured_market();
        market.expect_quote().returning(|_| {
            Err(UpstreamError::RateLimited {
                message: "API limit reached".into(),
            })
        });
        let h = harness(market, MockForexRatePort::new(), 30);

        let outcome = h.service.fetch("MSFT", None).await.unwrap();
        assert!(matches!(
            outcome,
            QuoteOutcome::Limited {
                origin: LimitOrigin::Upstream,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn upstream_server_error_is_returned() {
        let mut market = configured_market();
        market.expect_quote().returning(|_| {
            Err(UpstreamError::Status {
                status: 502,
                message: "Bad Gateway".into(),
            })
        });
        let h = harness(market, MockForexRatePort::new(), 30);

        let err = h.service.fetch("MSFT", None).await.unwrap_err();
        assert_eq!(err.to_string(), "Bad Gateway");
    }

    #[tokio::test]
    async fn profile_hits_upstream_once_per_day() {
        let mut market = configured_market();
        market.expect_profile().times(1).returning(|_| {
            Ok(CompanyProfile {
                name: Some("Apple Inc".into()),
                ticker: Some("AAPL".into()),
                ..Default::default()
            })
        });
        let h = harness(market, MockForexRatePort::new(), 30);

        let first = h.service.fetch("AAPL", Some("profile")).await.unwrap();
        h.clock.advance(23 * 3_600_000);
        let second = h.service.fetch("AAPL", Some("profile")).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn profile_failure_degrades_to_empty() {
        let mut market = configured_market();
        market
            .expect_profile()
            .times(2)
            .returning(|_| Err(UpstreamError::Network("refused".into())));
        let h = harness(market, MockForexRatePort::new(), 30);

        for _ in 0..2 {
            let outcome = h.service.fetch("AAPL", Some("profile")).await.unwrap();
            assert_eq!(outcome, QuoteOutcome::Profile(CompanyProfile::default()));
        }
    }

    #[tokio::test]
    async fn nameless_profile_is_not_cached() {
        let mut market = configured_market();
        market
            .expect_profile()
            .times(2)
            .returning(|_| Ok(CompanyProfile::default()));
        let h = harness(market, MockForexRatePort::new(), 30);

        h.service.fetch("XXXX", Some("profile")).await.unwrap();
        h.service.fetch("XXXX", Some("profile")).await.unwrap();
    }

    #[tokio::test]
    async fn forex_alias_uses_rate_source() {
        let mut market = configured_market();
        market.expect_quote().never();
        let mut forex = MockForexRatePort::new();
        forex.expect_eur_usd_rate().times(1).returning(|| Ok(1.0842));
        let h = harness(market, forex, 30);

        let first = h.service.fetch("EURUSD", None).await.unwrap();
        assert_eq!(
            first,
            QuoteOutcome::Quote {
                payload: QuotePayload::from_rate(1.0842, T0 / 1000),
                cached: false
            }
        );
        let second = h.service.fetch("EURUSD", Some("forex")).await.unwrap();
        assert!(matches!(second, QuoteOutcome::Quote { cached: true, .. }));
    }

    #[tokio::test]
    async fn forex_failure_falls_back_to_quote() {
        let mut market = configured_market();
        market
            .expect_quote()
            .times(1)
            .returning(|_| Ok(priced(1.08)));
        let mut forex = MockForexRatePort::new();
        forex
            .expect_eur_usd_rate()
            .returning(|| Err(UpstreamError::Network("timeout".into())));
        let h = harness(market, forex, 30);

        let outcome = h.service.fetch("OANDA:EUR_USD", Some("forex")).await.unwrap();
        assert_eq!(
            outcome,
            QuoteOutcome::Quote {
                payload: priced(1.08),
                cached: false
            }
        );
    }

    #[tokio::test]
    async fn forex_intent_on_other_pair_is_a_quote() {
        let mut market = configured_market();
        market
            .expect_quote()
            .times(1)
            .returning(|_| Ok(priced(1.27)));
        let mut forex = MockForexRatePort::new();
        forex.expect_eur_usd_rate().never();
        let h = harness(market, forex, 30);

        h.service.fetch("OANDA:GBP_USD", Some("forex")).await.unwrap();
    }

    #[tokio::test]
    async fn search_filters_and_spends_budget() {
        let mut market = configured_market();
        market.expect_search().times(1).returning(|_| {
            Ok(vec![
                SymbolMatch {
                    symbol: "AAPL".into(),
                    description: "APPLE INC".into(),
                    display_symbol: "AAPL".into(),
                    kind: Some("Common Stock".into()),
                },
                SymbolMatch {
                    symbol: "AAPL.SW".into(),
                    description: "APPLE INC".into(),
                    display_symbol: "AAPL.SW".into(),
                    kind: Some("ETP".into()),
                },
            ])
        });
        let h = harness(market, MockForexRatePort::new(), 1);

        let results = h.service.search(" apple ").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            h.service.search("apple").await,
            Err(QuoteError::Throttled(LimitOrigin::Local))
        );
    }

    #[tokio::test]
    async fn blank_search_is_rejected() {
        let h = harness(configured_market(), MockForexRatePort::new(), 30);
        assert_eq!(h.service.search("  ").await, Err(QuoteError::EmptyQuery));
    }
}
