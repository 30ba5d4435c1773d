use axum::{
    Router,
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{metrics::EXPOSITION_CONTENT_TYPE, state::SharedState};

/// Path of the Prometheus scrape endpoint.
pub const METRICS_PATH: &str = "/metrics";

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "metrics",
    responses((status = 200, description = "Prometheus text exposition", body = String, content_type = "text/plain"))
)]
/// Render the accumulated request counters and latency histograms.
pub async fn export_metrics(State(state): State<SharedState>) -> Response {
    let body = state
        .metrics_registry()
        .map(|registry| registry.render())
        .unwrap_or_default();

    (
        StatusCode::OK,
        [(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        body,
    )
        .into_response()
}

/// Configure the metrics export endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route(METRICS_PATH, get(export_metrics))
}
