//! Finnhub HTTP client.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::api_types::{ErrorResponse, QUOTA_REMAINING_HEADER, SearchResponse, is_limit_message};
use crate::application::ports::{MarketDataPort, UpstreamError};
use crate::domain::market::{CompanyProfile, QuotePayload, Symbol, SymbolMatch};
use crate::infrastructure::config::{ApiKey, MarketDataSettings};
use crate::infrastructure::metrics::{self, UpstreamOutcome};

const PROVIDER: &str = "finnhub";

/// Finnhub REST adapter for [`MarketDataPort`].
///
/// Makes exactly one request per call; throttling is reported, never
/// retried here.
#[derive(Debug, Clone)]
pub struct FinnhubClient {
    client: Client,
    api_key: Option<ApiKey>,
    base_url: String,
}

impl FinnhubClient {
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
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.clone(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let key = self
            .api_key
            .as_ref()
            .ok_or(UpstreamError::MissingCredential(PROVIDER))?;
        let url = format!("{}{path}", self.base_url);

        let started = Instant::now();
        let result = match self
            .client
            .get(&url)
            .query(query)
            .query(&[("token", key.expose())])
            .send()
            .await
        {
            Ok(response) => read_response(response).await,
            Err(e) => Err(UpstreamError::Network(e.without_url().to_string())),
        };

        let outcome = match &result {
            Ok(_) => UpstreamOutcome::Success,
            Err(UpstreamError::RateLimited { .. }) => UpstreamOutcome::RateLimited,
            Err(_) => UpstreamOutcome::Error,
        };
        metrics::record_upstream_request(PROVIDER, outcome, started.elapsed());

        result
    }
}

async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, UpstreamError> {
    let status = response.status();
    observe_quota(&response);

    let body = response
        .text()
        .await
        .map_err(|e| UpstreamError::Network(e.without_url().to_string()))?;

    if !status.is_success() {
        return Err(classify_failure(status, &body));
    }

    // Finnhub sometimes reports errors in a 200 body.
    if let Ok(err) = serde_json::from_str::<ErrorResponse>(&body) {
        if is_limit_message(&err.error) {
            return Err(UpstreamError::RateLimited { message: err.error });
        }
        return Err(UpstreamError::Format(err.error));
    }

    serde_json::from_str(&body).map_err(|e| UpstreamError::Format(e.to_string()))
}

fn classify_failure(status: StatusCode, body: &str) -> UpstreamError {
    let provider_message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|e| e.error);
    let message = provider_message
        .clone()
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown status").to_string());

    if status == StatusCode::TOO_MANY_REQUESTS
        || provider_message.as_deref().is_some_and(is_limit_message)
    {
        return UpstreamError::RateLimited { message };
    }
    UpstreamError::Status {
        status: status.as_u16(),
        message,
    }
}

fn observe_quota(response: &Response) {
    let remaining = response
        .headers()
        .get(QUOTA_REMAINING_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok());
    if let Some(remaining) = remaining {
        tracing::debug!(remaining, "Finnhub quota remaining");
        metrics::set_upstream_quota_remaining(PROVIDER, remaining);
    }
}

#[async_trait]
impl MarketDataPort for FinnhubClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn quote(&self, symbol: &Symbol) -> Result<QuotePayload, UpstreamError> {
        self.get("/quote", &[("symbol", symbol.as_str())]).await
    }

    async fn profile(&self, symbol: &Symbol) -> Result<CompanyProfile, UpstreamError> {
        self.get("/stock/profile2", &[("symbol", symbol.as_str())])
            .await
    }

    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>, UpstreamError> {
        let response: SearchResponse = self.get("/search", &[("q", query)]).await?;
        Ok(response.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_429() {
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, "");
        assert_eq!(
            err,
            UpstreamError::RateLimited {
                message: "Too Many Requests".into()
            }
        );
    }

    #[test]
    fn classify_limit_message_on_other_status() {
        let err = classify_failure(
            StatusCode::FORBIDDEN,
            r#"{"error":"API limit reached. Please try again later."}"#,
        );
        assert!(matches!(err, UpstreamError::RateLimited { .. }));
    }

    #[test]
    fn classify_server_error_uses_status_text() {
        let err = classify_failure(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(
            err,
            UpstreamError::Status {
                status: 502,
                message: "Bad Gateway".into()
            }
        );
    }

    #[test]
    fn classify_keeps_provider_message() {
        let err = classify_failure(
            StatusCode::FORBIDDEN,
            r#"{"error":"You don't have access to this resource."}"#,
        );
        assert_eq!(err.to_string(), "You don't have access to this resource.");
    }

    #[tokio::test]
    async fn missing_key_is_reported_without_request() {
        let client = FinnhubClient::new(&MarketDataSettings {
            base_url: "http://127.0.0.1:9".into(),
            ..MarketDataSettings::default()
        })
        .unwrap();
        assert!(!client.is_configured());
        let err = client.quote(&Symbol::parse("AAPL").unwrap()).await.unwrap_err();
        assert_eq!(err, UpstreamError::MissingCredential("finnhub"));
    }
}
