//! [`PriceFeed`] over the market proxy's `/market` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::application::{FeedError, PriceFeed};
use crate::domain::PriceQuote;

#[derive(Debug, Deserialize)]
struct MarketBody {
    c: Option<f64>,
    d: Option<f64>,
    dp: Option<f64>,
    pc: Option<f64>,
    #[serde(default)]
    limited: bool,
    #[serde(default)]
    cached: bool,
}

/// HTTP price feed.
#[derive(Debug, Clone)]
pub struct HttpPriceFeed {
    client: Client,
    base_url: String,
}

impl HttpPriceFeed {
    /// Create a feed against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl PriceFeed for HttpPriceFeed {
    async fn latest_price(&self, symbol: &str) -> Result<PriceQuote, FeedError> {
        let response = self
            .client
            .get(format!("{}/market", self.base_url))
            .query(&[("symbol", symbol)])
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FeedError::Limited);
        }
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body: MarketBody = response.json().await.map_err(|_| FeedError::NoPrice)?;
        if body.limited {
            return Err(FeedError::Limited);
        }
        let price = body
            .c
            .filter(|c| c.is_finite() && *c > 0.0)
            .ok_or(FeedError::NoPrice)?;

        Ok(PriceQuote {
            price,
            change: body.d,
            change_percent: body.dp,
            previous_close: body.pc,
            cached: body.cached,
            fetched_at: Utc::now(),
        })
    }
}
