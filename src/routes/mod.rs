use axum::{
    Router,
    http::{
        HeaderName, HeaderValue, Method,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
            X_XSS_PROTECTION,
        },
    },
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::{error::AppError, state::SharedState};

/// OpenAPI document endpoint.
pub mod docs;
/// Health check endpoint.
pub mod health;
/// Prometheus exposition endpoint.
pub mod metrics;
/// Current time endpoint and its request instrumentation.
pub mod time;

/// Static headers attached to every response of the hardened variant.
pub const SECURITY_HEADERS: [(HeaderName, &str); 5] = [
    (X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (X_FRAME_OPTIONS, "DENY"),
    (X_XSS_PROTECTION, "1; mode=block"),
    (REFERRER_POLICY, "same-origin"),
    (CONTENT_SECURITY_POLICY, "default-src 'self'"),
];

/// Compose all route trees, wiring in shared state and the variant-specific layers.
///
/// `/metrics` is mounted only when the state carries a registry, and the
/// security headers only when the service runs hardened.
pub fn router(state: SharedState) -> Router<()> {
    let mut api_router = time::router(state.clone())
        .merge(health::router())
        .merge(docs::router());

    if state.metrics_registry().is_some() {
        api_router = api_router.merge(metrics::router());
    }

    let hardened = state.config().is_hardened();
    let router = api_router.with_state(state);

    if hardened {
        with_security_headers(router)
    } else {
        router
    }
}

fn with_security_headers(router: Router) -> Router {
    SECURITY_HEADERS
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::overriding(
                name,
                HeaderValue::from_static(value),
            ))
        })
}

/// Reject every method but GET.
fn require_get(method: &Method) -> Result<(), AppError> {
    if *method == Method::GET {
        Ok(())
    } else {
        Err(AppError::MethodNotAllowed)
    }
}
