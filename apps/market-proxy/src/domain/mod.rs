//! Domain Layer - Quote caching and throttling logic.
//!
//! Pure types and in-memory state with no I/O. Time is read through the
//! [`clock::Clock`] trait so every rule here can be exercised without
//! waiting.

/// Retry backoff schedule.
pub mod backoff;

/// TTL cache for upstream payloads.
pub mod cache;

/// Millisecond time source.
pub mod clock;

/// Symbols, intents and payloads.
pub mod market;

/// Fixed-window request budget.
pub mod rate_limit;
