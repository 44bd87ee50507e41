//! Exchange-Rate Source
//!
//! Keyless EUR to USD rate from a Frankfurter-style endpoint
//! (`{"base":"EUR","rates":{"USD":1.08}}`).

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::{ForexRatePort, UpstreamError};
use crate::infrastructure::config::MarketDataSettings;
use crate::infrastructure::metrics::{self, UpstreamOutcome};

const PROVIDER: &str = "frankfurter";

#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// HTTP adapter for [`ForexRatePort`].
#[derive(Debug, Clone)]
pub struct FrankfurterClient {
    client: Client,
    url: String,
}

impl FrankfurterClient {
    /// Create a new client from settings.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(settings: &MarketDataSettings) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| UpstreamError::Network(e.to_string()))?;
        Ok(Self {
            client,
            url: settings.forex_url.clone(),
        })
    }

    async fn fetch_usd(&self) -> Result<f64, UpstreamError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown status").to_string(),
            });
        }

        let body: RatesResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Format(e.to_string()))?;
        body.rates
            .get("USD")
            .copied()
            .ok_or_else(|| UpstreamError::Format("no USD rate in response".to_string()))
    }
}

#[async_trait]
impl ForexRatePort for FrankfurterClient {
    async fn eur_usd_rate(&self) -> Result<f64, UpstreamError> {
        let started = Instant::now();
        let result = self.fetch_usd().await;
        let outcome = if result.is_ok() {
            UpstreamOutcome::Success
        } else {
            UpstreamOutcome::Error
        };
        metrics::record_upstream_request(PROVIDER, outcome, started.elapsed());
        result
    }
}
