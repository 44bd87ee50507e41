#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Market Proxy - Quote caching and upstream shielding
//!
//! An HTTP service that sits between a browser dashboard and its upstream
//! providers. It keeps API keys server-side, caches quotes and company
//! profiles with per-type TTLs, holds quote traffic under a fixed-window
//! budget, and retries LLM completions with exponential backoff.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Caching, throttling and retry rules
//!   - `cache`: TTL cache keyed by intent
//!   - `rate_limit`: Fixed-window request budget
//!   - `backoff`: Retry delay schedule
//!   - `market`: Symbols, intents and payloads
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Market data, forex and completion providers
//!   - `services`: Quote lookups and AI analysis
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `finnhub`, `forex`, `llm`: Upstream HTTP clients
//!   - `http`: Public API
//!   - `health`: Health, readiness and metrics endpoint
//!   - `config`, `metrics`, `telemetry`: Process plumbing
//!
//! # Request Flow
//!
//! ```text
//! GET /market ──► QuoteService ──► QuoteCache ──hit──► response (cached: true)
//!                       │
//!                       └─miss─► RateLimiter ──► Finnhub / Frankfurter
//! POST /ai ─────► AdvisorService ──► RetryingCaller ──► Gemini / OpenAI / Anthropic
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Caching and throttling rules with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::cache::QuoteCache;
pub use domain::clock::{Clock, ManualClock, SystemClock};
pub use domain::market::Symbol;
pub use domain::rate_limit::{FixedWindowRateLimiter, LimitOrigin};

// Services
pub use application::services::{AdvisorService, QuoteService};

// Infrastructure config
pub use infrastructure::config::{AiProvider, ConfigError, ProxyConfig};

// HTTP surfaces
pub use infrastructure::health::{HealthServer, HealthServerError, HealthServerState};
pub use infrastructure::http::{AppState, create_router};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
