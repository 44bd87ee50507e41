//! Prometheus Metrics Module
//!
//! Exposes proxy metrics in Prometheus format.
//!
//! # Metrics Categories
//!
//! - **Cache**: hits, misses and entry count
//! - **Throttling**: requests refused locally or by the provider
//! - **Upstream**: calls per provider and outcome, retries, latency,
//!   provider-reported quota
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the health server port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::domain::rate_limit::LimitOrigin;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Returns `None` if a different recorder is already installed. Calling it
/// again after a successful install returns the same handle.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Some(handle.clone());
    }

    let handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            return None;
        }
    };
    register_metrics();
    Some(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    // Cache
    describe_counter!(
        "market_proxy_cache_hits_total",
        "Lookups served from the quote cache"
    );
    describe_counter!(
        "market_proxy_cache_misses_total",
        "Lookups that missed the quote cache"
    );
    describe_gauge!(
        "market_proxy_cache_entries",
        "Entries currently held by the quote cache"
    );

    // Throttling
    describe_counter!(
        "market_proxy_rate_limited_total",
        "Requests answered with a limited result, by origin"
    );

    // Upstream
    describe_counter!(
        "market_proxy_upstream_requests_total",
        "Upstream calls by provider and outcome"
    );
    describe_counter!(
        "market_proxy_upstream_retries_total",
        "Upstream retries scheduled by the backoff loop"
    );
    describe_gauge!(
        "market_proxy_upstream_quota_remaining",
        "Remaining calls reported by the quote provider"
    );
    describe_histogram!(
        "market_proxy_upstream_request_seconds",
        "Upstream call latency"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Outcome of one upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamOutcome {
    /// 2xx response.
    Success,
    /// Provider throttled the call.
    RateLimited,
    /// Any other failure.
    Error,
}

impl UpstreamOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::RateLimited => "rate_limited",
            Self::Error => "error",
        }
    }
}

/// Record a cache hit.
pub fn record_cache_hit(intent: &'static str) {
    counter!("market_proxy_cache_hits_total", "intent" => intent).increment(1);
}

/// Record a cache miss.
pub fn record_cache_miss(intent: &'static str) {
    counter!("market_proxy_cache_misses_total", "intent" => intent).increment(1);
}

/// Update the cache entry count.
#[allow(clippy::cast_precision_loss)]
pub fn set_cache_entries(count: usize) {
    gauge!("market_proxy_cache_entries").set(count as f64);
}

/// Record a limited result.
pub fn record_rate_limited(origin: LimitOrigin) {
    counter!("market_proxy_rate_limited_total", "origin" => origin.as_str()).increment(1);
}

/// Record an upstream call and its latency.
pub fn record_upstream_request(provider: &'static str, outcome: UpstreamOutcome, elapsed: Duration) {
    counter!(
        "market_proxy_upstream_requests_total",
        "provider" => provider,
        "outcome" => outcome.as_str()
    )
    .increment(1);
    histogram!(
        "market_proxy_upstream_request_seconds",
        "provider" => provider
    )
    .record(elapsed.as_secs_f64());
}

/// Record a scheduled retry.
pub fn record_upstream_retry(provider: &'static str) {
    counter!("market_proxy_upstream_retries_total", "provider" => provider).increment(1);
}

/// Update the provider-reported remaining quota.
pub fn set_upstream_quota_remaining(provider: &'static str, remaining: f64) {
    gauge!("market_proxy_upstream_quota_remaining", "provider" => provider).set(remaining);
}

// =============================================================================
// Tests
// =============================================================================
