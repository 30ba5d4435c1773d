//! Application state shared by every handler.

use std::sync::Arc;

use crate::{
    clock::Clock,
    config::AppConfig,
    metrics::{MetricsRegistry, MetricsSink, NoopMetrics},
};

/// Cheaply clonable handle handed to every handler.
pub type SharedState = Arc<AppState>;

/// State shared by every handler: configuration, clock and metrics sink.
///
/// Built once at startup and never mutated afterwards; only the metrics
/// accumulators behind the sink change, and they are atomic.
pub struct AppState {
    config: AppConfig,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn MetricsSink>,
    registry: Option<Arc<MetricsRegistry>>,
}

impl AppState {
    /// Construct the state, creating a fresh [`MetricsRegistry`] when metrics are enabled.
    pub fn new(config: AppConfig, clock: Arc<dyn Clock>) -> SharedState {
        let registry = config
            .metrics_enabled()
            .then(|| Arc::new(MetricsRegistry::new()));
        let metrics: Arc<dyn MetricsSink> = match &registry {
            Some(registry) => registry.clone(),
            None => Arc::new(NoopMetrics),
        };

        Arc::new(Self {
            config,
            clock,
            metrics,
            registry,
        })
    }

    /// Construct the state around a caller-supplied sink.
    ///
    /// Nothing is exported on `/metrics` in this mode; the sink owns the data.
    pub fn with_metrics_sink(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        metrics: Arc<dyn MetricsSink>,
    ) -> SharedState {
        Arc::new(Self {
            config,
            clock,
            metrics,
            registry: None,
        })
    }

    /// Immutable configuration loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Clock the time endpoint reads.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Sink handlers record measurements into.
    pub fn metrics(&self) -> &dyn MetricsSink {
        self.metrics.as_ref()
    }

    /// Registry rendered by `/metrics`, present only when metrics are enabled.
    pub fn metrics_registry(&self) -> Option<&Arc<MetricsRegistry>> {
        self.registry.as_ref()
    }
}
