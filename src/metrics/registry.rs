//! Counter and histogram vectors with dynamic labels, rendered in Prometheus text format.
//!
//! Label sets are flattened into sorted key vectors and stored in `DashMap`
//! shards next to atomics, so concurrent updates never contend on a global
//! lock. Durations are accumulated in nanoseconds and converted to seconds
//! only when rendering.

use std::{
    fmt::Write,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use dashmap::DashMap;

use super::MetricsSink;
use crate::services::auth_service::AuthFailure;

/// Total requests served by the time endpoint, by endpoint, method and status.
pub const REQUESTS_TOTAL: &str = "time_service_http_requests_total";
/// Request latency histogram, by endpoint and method.
pub const REQUEST_DURATION_SECONDS: &str = "time_service_http_request_duration_seconds";
/// Rejected API-key checks, by endpoint and reason.
pub const AUTH_FAILURES_TOTAL: &str = "time_service_auth_failures_total";
/// Content type of the text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Prometheus default buckets (5ms .. 10s), in nanoseconds.
const BUCKET_BOUNDS_NANOS: [u64; 11] = [
    5_000_000,
    10_000_000,
    25_000_000,
    50_000_000,
    100_000_000,
    250_000_000,
    500_000_000,
    1_000_000_000,
    2_500_000_000,
    5_000_000_000,
    10_000_000_000,
];

type LabelSet = Vec<(String, String)>;

fn label_set(labels: &[(&str, &str)]) -> LabelSet {
    let mut key: LabelSet = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Render `{k="v",...}` with an optional trailing label, or nothing for an empty set.
fn format_labels(labels: &LabelSet, extra: Option<(&str, &str)>) -> String {
    let rendered: Vec<String> = labels
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .chain(extra)
        .map(|(k, v)| format!("{k}=\"{}\"", escape_label(v)))
        .collect();
    if rendered.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", rendered.join(","))
    }
}

fn nanos_to_seconds(nanos: u64) -> f64 {
    nanos as f64 / 1_000_000_000.0
}

fn write_header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} {kind}");
}

/// Monotonic counters keyed by label set.
#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelSet, AtomicU64>,
}

impl CounterVec {
    /// Increment the series identified by `labels` by one.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.map
            .entry(label_set(labels))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Current value of a series; zero when it was never incremented.
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_set(labels))
            .map(|value| value.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "counter");
        let mut rows: Vec<(LabelSet, u64)> = self
            .map
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();
        for (labels, value) in rows {
            let _ = writeln!(out, "{name}{} {value}", format_labels(&labels, None));
        }
    }
}

struct AtomicHistogram {
    count: AtomicU64,
    sum_nanos: AtomicU64,
    buckets: [AtomicU64; BUCKET_BOUNDS_NANOS.len()],
}

impl Default for AtomicHistogram {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_nanos: AtomicU64::new(0),
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }
}

struct HistogramSnapshot {
    count: u64,
    sum_nanos: u64,
    buckets: [u64; BUCKET_BOUNDS_NANOS.len()],
}

impl AtomicHistogram {
    fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            count: self.count.load(Ordering::Relaxed),
            sum_nanos: self.sum_nanos.load(Ordering::Relaxed),
            buckets: std::array::from_fn(|i| self.buckets[i].load(Ordering::Relaxed)),
        }
    }
}

/// Latency histograms keyed by label set, with cumulative buckets.
#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelSet, AtomicHistogram>,
}

impl HistogramVec {
    /// Record one observation.
    pub fn observe(&self, labels: &[(&str, &str)], elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        let hist = self.map.entry(label_set(labels)).or_default();

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum_nanos.fetch_add(nanos, Ordering::Relaxed);
        for (bucket, &bound) in hist.buckets.iter().zip(BUCKET_BOUNDS_NANOS.iter()) {
            if nanos <= bound {
                bucket.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of observations recorded for a series.
    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_set(labels))
            .map(|hist| hist.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "histogram");
        let mut rows: Vec<(LabelSet, HistogramSnapshot)> = self
            .map
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().snapshot()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        for (labels, snapshot) in rows {
            for (&bound, &count) in BUCKET_BOUNDS_NANOS.iter().zip(snapshot.buckets.iter()) {
                let le = nanos_to_seconds(bound).to_string();
                let _ = writeln!(
                    out,
                    "{name}_bucket{} {count}",
                    format_labels(&labels, Some(("le", le.as_str())))
                );
            }
            let _ = writeln!(
                out,
                "{name}_bucket{} {}",
                format_labels(&labels, Some(("le", "+Inf"))),
                snapshot.count
            );
            let plain = format_labels(&labels, None);
            let _ = writeln!(
                out,
                "{name}_sum{plain} {}",
                nanos_to_seconds(snapshot.sum_nanos)
            );
            let _ = writeln!(out, "{name}_count{plain} {}", snapshot.count);
        }
    }
}

/// Explicitly constructed registry holding every series the service exports.
#[derive(Default)]
pub struct MetricsRegistry {
    requests: CounterVec,
    durations: HistogramVec,
    auth_failures: CounterVec,
}

impl MetricsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the request counter for one (endpoint, method, status) series.
    pub fn request_count(&self, endpoint: &str, method: &str, status: u16) -> u64 {
        let status = status.to_string();
        self.requests.get(&[
            ("endpoint", endpoint),
            ("method", method),
            ("status", status.as_str()),
        ])
    }

    /// Number of latency observations for one (endpoint, method) series.
    pub fn duration_count(&self, endpoint: &str, method: &str) -> u64 {
        self.durations
            .count(&[("endpoint", endpoint), ("method", method)])
    }

    /// Value of the auth failure counter for one (endpoint, reason) series.
    pub fn auth_failure_count(&self, endpoint: &str, failure: AuthFailure) -> u64 {
        self.auth_failures
            .get(&[("endpoint", endpoint), ("reason", failure.label())])
    }

    /// Render every family in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.requests
            .render(REQUESTS_TOTAL, "Total number of HTTP requests", &mut out);
        self.durations.render(
            REQUEST_DURATION_SECONDS,
            "HTTP request latency in seconds",
            &mut out,
        );
        self.auth_failures.render(
            AUTH_FAILURES_TOTAL,
            "Total number of rejected API key checks",
            &mut out,
        );
        out
    }
}

impl MetricsSink for MetricsRegistry {
    fn record_request(&self, endpoint: &str, method: &str, status: u16) {
        let status = status.to_string();
        self.requests.inc(&[
            ("endpoint", endpoint),
            ("method", method),
            ("status", status.as_str()),
        ]);
    }

    fn observe_duration(&self, endpoint: &str, method: &str, elapsed: Duration) {
        self.durations
            .observe(&[("endpoint", endpoint), ("method", method)], elapsed);
    }

    fn record_auth_failure(&self, endpoint: &str, failure: AuthFailure) {
        self.auth_failures
            .inc(&[("endpoint", endpoint), ("reason", failure.label())]);
    }
}
