//! Infrastructure Layer - Adapters and external integrations.
//!
//! Concrete implementations of the ports defined in the application layer,
//! plus the HTTP surfaces and process-level plumbing.

/// Configuration loaded from the environment.
pub mod config;

/// Finnhub quote, profile and search adapter.
pub mod finnhub;

/// EUR/USD reference rate adapter.
pub mod forex;

/// Health check HTTP endpoint.
pub mod health;

/// Public HTTP API.
pub mod http;

/// LLM completion adapters with retry.
pub mod llm;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Logging and OpenTelemetry tracing.
pub mod telemetry;
