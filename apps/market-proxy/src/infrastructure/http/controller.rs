//! HTTP Controller (Driver Adapter)
//!
//! Axum-based API that delegates to the quote and advisor services. Every
//! route is mounted both at the root and under `/api`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::error::{ApiError, search_error};
use super::request::{AnalyzeRequest, MarketQuery, SearchQuery};
use super::response::{AnalysisResponse, LimitedResponse, QuoteResponse, SearchResponse};
use crate::application::ports::UpstreamError;
use crate::application::services::{AdvisorService, QuoteOutcome, QuoteService};
use crate::domain::cache::QuoteCache;
use crate::domain::clock::Clock;
use crate::domain::rate_limit::FixedWindowRateLimiter;
use crate::infrastructure::config::ProxyConfig;
use crate::infrastructure::finnhub::FinnhubClient;
use crate::infrastructure::forex::FrankfurterClient;
use crate::infrastructure::llm::{LlmClient, Sleeper};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Quote lookups and search.
    pub quotes: Arc<QuoteService>,
    /// LLM completions.
    pub advisor: Arc<AdvisorService>,
}

impl AppState {
    /// Wire the services onto the HTTP adapters described by `config`.
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be built.
    pub fn from_config(
        config: &ProxyConfig,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, UpstreamError> {
        let market = Arc::new(FinnhubClient::new(&config.market)?);
        let forex = Arc::new(FrankfurterClient::new(&config.market)?);
        let cache = Arc::new(QuoteCache::new(Arc::clone(&clock)));
        let budget = Arc::new(FixedWindowRateLimiter::new(
            config.market.rate_limit_per_minute,
            Arc::clone(&clock),
        ));
        let completion = Arc::new(LlmClient::with_sleeper(&config.ai, sleeper)?);

        Ok(Self {
            quotes: Arc::new(QuoteService::new(market, forex, cache, budget, clock)),
            advisor: Arc::new(AdvisorService::new(
                completion,
                config.ai.provider.key_env_var(),
            )),
        })
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/market", get(market))
        .route("/ai", post(analyze))
        .route("/stock-search", get(stock_search));

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .with_state(state)
}

/// `GET /market?symbol=&type=`
async fn market(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Response, ApiError> {
    let symbol = query.symbol.as_deref().unwrap_or_default();
    let outcome = state.quotes.fetch(symbol, query.kind.as_deref()).await?;

    Ok(match outcome {
        QuoteOutcome::Quote { payload, cached } => {
            Json(QuoteResponse::new(payload, cached)).into_response()
        }
        QuoteOutcome::Profile(profile) => Json(profile).into_response(),
        QuoteOutcome::Limited { symbol, origin } => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(LimitedResponse::new(symbol, origin)),
        )
            .into_response(),
    })
}

/// `POST /ai` with `{prompt}`.
///
/// A body that is not JSON is treated like a missing prompt, after the key
/// check.
async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let prompt = body.ok().and_then(|Json(req)| req.prompt);
    let analysis = state.advisor.analyze(prompt.as_deref()).await?;
    Ok(Json(AnalysisResponse { analysis }))
}

/// `GET /stock-search?q=`
async fn stock_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let q = query.q.as_deref().unwrap_or_default();
    let results = state.quotes.search(q).await.map_err(search_error)?;
    Ok(Json(results.into()))
}
