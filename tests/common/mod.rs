//! Common test infrastructure for time-service integration tests.
//!
//! Each test file compiles its own copy of this module, so items may appear
//! unused from the perspective of a single test file even though they're
//! used elsewhere.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use time::{OffsetDateTime, macros::datetime};
use tower::ServiceExt;

use time_service::{
    clock::Clock,
    config::AppConfig,
    metrics::MetricsRegistry,
    routes,
    state::{AppState, SharedState},
};

/// Key configured for hardened test apps.
pub const TEST_API_KEY: &str = "secret";
/// Instant every test app reports.
pub const FIXED_NOW: OffsetDateTime = datetime!(2024-05-01 13:37:05 +2);

/// Clock frozen at a single instant.
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Test application with router and direct access to its state
pub struct TestApp {
    router: axum::Router,
    pub state: SharedState,
}

impl TestApp {
    /// Build an app around `config`, frozen at [`FIXED_NOW`]
    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::new(config, Arc::new(FixedClock(FIXED_NOW)));
        Self::with_state(state)
    }

    /// Build an app around an already constructed state
    pub fn with_state(state: SharedState) -> Self {
        Self {
            router: routes::router(state.clone()),
            state,
        }
    }

    /// Metrics off, auth off
    pub fn basic() -> Self {
        Self::with_config(AppConfig::default().with_metrics(false))
    }

    /// Metrics on, auth off
    pub fn instrumented() -> Self {
        Self::with_config(AppConfig::default().with_metrics(true))
    }

    /// Metrics on, auth on with [`TEST_API_KEY`]
    pub fn instrumented_hardened() -> Self {
        Self::with_config(
            AppConfig::default()
                .with_metrics(true)
                .with_api_key(TEST_API_KEY),
        )
    }

    /// Metrics off, auth on with [`TEST_API_KEY`]
    pub fn hardened() -> Self {
        Self::with_config(
            AppConfig::default()
                .with_metrics(false)
                .with_api_key(TEST_API_KEY),
        )
    }

    /// Registry behind `/metrics`; panics when metrics are disabled
    pub fn registry(&self) -> &MetricsRegistry {
        self.state
            .metrics_registry()
            .expect("metrics are disabled for this app")
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Method::GET, path, &[]).await
    }

    /// Make a GET request with custom headers
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.send(Method::GET, path, headers).await
    }

    /// Make a request with an arbitrary method and headers
    pub async fn send(&self, method: Method, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Value of a header as a string, if present
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Assert response has expected status code
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status,
        expected,
        "Expected status {}, got {}. Body: {}",
        expected,
        response.status,
        response.text()
    );
}

/// Whether `value` has the `YYYY-MM-DD HH:MM:SS` shape
pub fn is_timestamp(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 19
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b' ',
            13 | 16 => *b == b':',
            _ => b.is_ascii_digit(),
        })
}

/// Methods other than GET, used to exercise 405 handling
pub fn non_get_methods() -> Vec<Method> {
    vec![
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
        Method::HEAD,
    ]
}
