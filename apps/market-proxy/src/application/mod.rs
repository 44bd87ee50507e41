//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the application services and the port interfaces
//! that define how the proxy talks to upstream providers.

/// Port interfaces for upstream providers.
pub mod ports;

/// Quote and advisor services.
pub mod services;
