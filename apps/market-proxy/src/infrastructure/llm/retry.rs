//! Retrying HTTP caller.
//!
//! Issues a JSON POST and retries on 429, 5xx and network errors following a
//! [`BackoffSchedule`]. Other 4xx responses fail immediately. Sleeping goes
//! through a [`Sleeper`] so the schedule can be observed without waiting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use crate::application::ports::UpstreamError;
use crate::domain::backoff::{BackoffConfig, BackoffSchedule};
use crate::infrastructure::metrics::{self, UpstreamOutcome};

/// Something that can wait.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// One JSON POST request, replayable across attempts.
#[derive(Clone)]
pub struct RequestSpec {
    /// Target URL.
    pub url: String,
    /// Extra headers (name, value).
    pub headers: Vec<(&'static str, String)>,
    /// JSON body.
    pub body: Value,
}

impl std::fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.headers.iter().map(|(name, _)| *name).collect();
        f.debug_struct("RequestSpec")
            .field("url", &self.url)
            .field("headers", &names)
            .finish_non_exhaustive()
    }
}

/// POST caller with exponential backoff.
#[derive(Clone)]
pub struct RetryingCaller {
    client: Client,
    sleeper: Arc<dyn Sleeper>,
    provider: &'static str,
}

impl RetryingCaller {
    /// Create a caller. `provider` labels logs and metrics.
    #[must_use]
    pub fn new(client: Client, sleeper: Arc<dyn Sleeper>, provider: &'static str) -> Self {
        Self {
            client,
            sleeper,
            provider,
        }
    }

    /// Send `spec`, retrying per `backoff`, and return the parsed body.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted, or the first
    /// non-retryable error.
    pub async fn call(&self, spec: &RequestSpec, backoff: BackoffConfig) -> Result<Value, UpstreamError> {
        let mut schedule = BackoffSchedule::new(backoff);
        let mut attempt = 1u32;

        loop {
            let err = match self.attempt(spec).await {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };

            if !err.is_retryable() {
                tracing::warn!(provider = self.provider, error = %err, attempt, "Non-retryable upstream error");
                return Err(err);
            }
            let Some(delay) = schedule.next_delay() else {
                tracing::warn!(provider = self.provider, error = %err, attempt, "Retries exhausted");
                return Err(err);
            };

            tracing::warn!(
                provider = self.provider,
                error = %err,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Retryable upstream error, backing off"
            );
            metrics::record_upstream_retry(self.provider);
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, spec: &RequestSpec) -> Result<Value, UpstreamError> {
        let mut request = self.client.post(&spec.url).json(&spec.body);
        for (name, value) in &spec.headers {
            request = request.header(*name, value);
        }

        let started = Instant::now();
        let result = match request.send().await {
            Ok(response) => read_body(response).await,
            Err(e) => Err(UpstreamError::Network(e.without_url().to_string())),
        };

        let outcome = match &result {
            Ok(_) => UpstreamOutcome::Success,
            Err(UpstreamError::RateLimited { .. }) => UpstreamOutcome::RateLimited,
            Err(_) => UpstreamOutcome::Error,
        };
        metrics::record_upstream_request(self.provider, outcome, started.elapsed());
        result
    }
}

async fn read_body(response: Response) -> Result<Value, UpstreamError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| UpstreamError::Network(e.without_url().to_string()))?;

    if status.is_success() {
        return serde_json::from_str(&text).map_err(|e| UpstreamError::Format(e.to_string()));
    }

    let message = error_message(&text)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown status").to_string());
    if status == StatusCode::TOO_MANY_REQUESTS {
        Err(UpstreamError::RateLimited { message })
    } else {
        Err(UpstreamError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

/// Pull a human-readable message out of a provider error body.
///
/// Understands `{"error":{"message":..}}`, `{"error":".."}` and
/// `{"message":".."}`.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = value
        .pointer("/error/message")
        .or_else(|| value.get("error").filter(|e| e.is_string()))
        .or_else(|| value.get("message"))?
        .as_str()?;
    Some(message.to_string())
}
