//! Instrumentation of `/api/time` and the `/metrics` export endpoint.

mod common;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::http::{Method, StatusCode};
use common::{FIXED_NOW, FixedClock, TEST_API_KEY, TestApp, assert_status};
use time_service::{
    config::AppConfig,
    metrics::MetricsSink,
    services::auth_service::AuthFailure,
    state::AppState,
};

#[tokio::test]
async fn successful_requests_are_counted_once() {
    let app = TestApp::instrumented();

    for _ in 0..5 {
        let response = app.get("/api/time").await;
        assert_status(&response, StatusCode::OK);
    }

    assert_eq!(app.registry().request_count("/api/time", "GET", 200), 5);
    assert_eq!(app.registry().duration_count("/api/time", "GET"), 5);
}

#[tokio::test]
async fn rejected_methods_are_counted_with_405() {
    let app = TestApp::instrumented();

    app.send(Method::POST, "/api/time", &[]).await;
    app.send(Method::POST, "/api/time", &[]).await;
    app.send(Method::DELETE, "/api/time", &[]).await;

    let registry = app.registry();
    assert_eq!(registry.request_count("/api/time", "POST", 405), 2);
    assert_eq!(registry.request_count("/api/time", "DELETE", 405), 1);
    assert_eq!(registry.duration_count("/api/time", "POST"), 2);
    assert_eq!(registry.duration_count("/api/time", "DELETE"), 1);
    assert_eq!(registry.request_count("/api/time", "POST", 200), 0);
}

#[tokio::test]
async fn auth_rejections_are_counted_with_401_and_reason() {
    let app = TestApp::instrumented_hardened();

    app.get("/api/time").await;
    app.get_with_headers("/api/time", &[("X-API-Key", "wrong")])
        .await;
    app.get_with_headers("/api/time", &[("X-API-Key", TEST_API_KEY)])
        .await;

    let registry = app.registry();
    assert_eq!(registry.request_count("/api/time", "GET", 401), 2);
    assert_eq!(registry.request_count("/api/time", "GET", 200), 1);
    assert_eq!(registry.duration_count("/api/time", "GET"), 3);
    assert_eq!(
        registry.auth_failure_count("/api/time", AuthFailure::Missing),
        1
    );
    assert_eq!(
        registry.auth_failure_count("/api/time", AuthFailure::Invalid),
        1
    );
}

#[tokio::test]
async fn extension_methods_share_one_series() {
    let app = TestApp::instrumented();

    for i in 0..50 {
        let method = Method::from_bytes(format!("X{i}").as_bytes()).unwrap();
        let response = app.send(method, "/api/time", &[]).await;
        assert_status(&response, StatusCode::METHOD_NOT_ALLOWED);
    }

    let registry = app.registry();
    assert_eq!(registry.request_count("/api/time", "OTHER", 405), 50);
    assert_eq!(registry.duration_count("/api/time", "OTHER"), 50);
    assert_eq!(registry.request_count("/api/time", "X7", 405), 0);

    let body = app.get("/metrics").await.text();
    assert!(!body.contains(r#"method="X"#));
    assert_eq!(
        body.matches("time_service_http_requests_total{").count(),
        1
    );
}

#[tokio::test]
async fn export_renders_prometheus_text() {
    let app = TestApp::instrumented();
    app.get("/api/time").await;
    app.get("/api/time").await;

    let response = app.get("/metrics").await;

    assert_status(&response, StatusCode::OK);
    assert_eq!(
        response.header("content-type"),
        Some("text/plain; version=0.0.4; charset=utf-8")
    );
    let body = response.text();
    assert!(body.contains("# TYPE time_service_http_requests_total counter"));
    assert!(body.contains(
        r#"time_service_http_requests_total{endpoint="/api/time",method="GET",status="200"} 2"#
    ));
    assert!(body.contains(
        r#"time_service_http_request_duration_seconds_count{endpoint="/api/time",method="GET"} 2"#
    ));
    assert!(body.contains(
        r#"time_service_http_request_duration_seconds_bucket{endpoint="/api/time",method="GET",le="+Inf"} 2"#
    ));
}

#[tokio::test]
async fn export_does_not_count_itself() {
    let app = TestApp::instrumented();

    app.get("/metrics").await;
    let body = app.get("/metrics").await.text();

    assert!(!body.contains(r#"endpoint="/metrics""#));
}

#[tokio::test]
async fn export_is_open_when_hardened() {
    let app = TestApp::instrumented_hardened();

    let response = app.get("/metrics").await;

    assert_status(&response, StatusCode::OK);
}

#[tokio::test]
async fn export_is_absent_without_metrics() {
    for app in [TestApp::basic(), TestApp::hardened()] {
        let response = app.get("/metrics").await;
        assert_status(&response, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn export_rejects_other_methods() {
    let app = TestApp::instrumented();

    let response = app.send(Method::POST, "/metrics", &[]).await;

    assert_status(&response, StatusCode::METHOD_NOT_ALLOWED);
}

#[derive(Default)]
struct RecordingSink {
    requests: Mutex<Vec<(String, String, u16)>>,
    durations: Mutex<Vec<(String, String)>>,
    auth_failures: Mutex<Vec<AuthFailure>>,
}

impl MetricsSink for RecordingSink {
    fn record_request(&self, endpoint: &str, method: &str, status: u16) {
        self.requests
            .lock()
            .unwrap()
            .push((endpoint.into(), method.into(), status));
    }

    fn observe_duration(&self, endpoint: &str, method: &str, _elapsed: Duration) {
        self.durations
            .lock()
            .unwrap()
            .push((endpoint.into(), method.into()));
    }

    fn record_auth_failure(&self, _endpoint: &str, failure: AuthFailure) {
        self.auth_failures.lock().unwrap().push(failure);
    }
}

#[tokio::test]
async fn injected_sink_receives_measurements() {
    let sink = Arc::new(RecordingSink::default());
    let state = AppState::with_metrics_sink(
        AppConfig::default().with_api_key(TEST_API_KEY),
        Arc::new(FixedClock(FIXED_NOW)),
        sink.clone(),
    );
    let app = TestApp::with_state(state);

    app.get("/api/time").await;
    app.get_with_headers("/api/time", &[("X-API-Key", TEST_API_KEY)])
        .await;
    app.get("/health").await;

    assert_eq!(
        *sink.requests.lock().unwrap(),
        vec![
            ("/api/time".to_string(), "GET".to_string(), 401),
            ("/api/time".to_string(), "GET".to_string(), 200),
        ]
    );
    assert_eq!(sink.durations.lock().unwrap().len(), 2);
    assert_eq!(*sink.auth_failures.lock().unwrap(), vec![AuthFailure::Missing]);

    // The injected sink owns the data, so nothing is exported.
    assert_status(&app.get("/metrics").await, StatusCode::NOT_FOUND);
}
