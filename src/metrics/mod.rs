//! Request metrics: the sink handlers record into and the Prometheus registry behind it.
//!
//! Handlers only see [`MetricsSink`]. When metrics are disabled the state carries
//! [`NoopMetrics`], otherwise a [`MetricsRegistry`] that `/metrics` renders.

mod registry;

use std::time::Duration;

use axum::http::Method;

use crate::services::auth_service::AuthFailure;

pub use self::registry::{
    AUTH_FAILURES_TOTAL, CounterVec, EXPOSITION_CONTENT_TYPE, HistogramVec, MetricsRegistry,
    REQUEST_DURATION_SECONDS, REQUESTS_TOTAL,
};

/// Label recorded for every method outside [`STANDARD_METHODS`].
pub const OTHER_METHOD: &str = "OTHER";

/// Methods recorded under their own name. Bounds the `method` label's cardinality.
const STANDARD_METHODS: [&str; 9] = [
    "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
];

/// Value of the `method` label for `method`.
pub fn method_label(method: &Method) -> &'static str {
    STANDARD_METHODS
        .into_iter()
        .find(|standard| *standard == method.as_str())
        .unwrap_or(OTHER_METHOD)
}

/// Destination for per-request measurements.
///
/// Implementations must tolerate concurrent calls from every request task.
pub trait MetricsSink: Send + Sync {
    /// Count one finished request with its final status code.
    fn record_request(&self, endpoint: &str, method: &str, status: u16);
    /// Record how long one request spent inside the handler.
    fn observe_duration(&self, endpoint: &str, method: &str, elapsed: Duration);
    /// Count one rejected API-key check.
    fn record_auth_failure(&self, endpoint: &str, failure: AuthFailure);
}

/// Sink that drops every measurement.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_request(&self, _endpoint: &str, _method: &str, _status: u16) {}

    fn observe_duration(&self, _endpoint: &str, _method: &str, _elapsed: Duration) {}

    fn record_auth_failure(&self, _endpoint: &str, _failure: AuthFailure) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_methods_keep_their_name() {
        assert_eq!(method_label(&Method::GET), "GET");
        assert_eq!(method_label(&Method::PATCH), "PATCH");
    }

    #[test]
    fn extension_methods_collapse() {
        for token in ["X0", "PURGE", "get"] {
            let method = Method::from_bytes(token.as_bytes()).unwrap();
            assert_eq!(method_label(&method), OTHER_METHOD);
        }
    }
}
