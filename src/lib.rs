//! Library crate for time-service, exposing modules for binaries and integration tests.

/// Wall-clock abstraction.
pub mod clock;
/// Configuration file and environment loading.
pub mod config;
/// Response payloads.
pub mod dto;
/// HTTP-facing error type.
pub mod error;
/// Request counters, latency histograms and their exposition.
pub mod metrics;
/// Router composition and HTTP handlers.
pub mod routes;
/// Business logic behind the handlers.
pub mod services;
/// Shared application state.
pub mod state;
