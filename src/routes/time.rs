use std::{net::SocketAddr, time::Instant};

use axum::{
    Json, Router,
    extract::{ConnectInfo, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::any,
};

use crate::{
    dto::{error::ErrorResponse, time::TimeResponse},
    error::AppError,
    metrics::method_label,
    services::{auth_service, time_service},
    state::SharedState,
};

/// Path of the time endpoint, also used as the `endpoint` metrics label.
pub const TIME_PATH: &str = "/api/time";

/// Time endpoint, wrapped in request instrumentation.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route(TIME_PATH, any(get_time))
        .route_layer(middleware::from_fn_with_state(state, track_requests))
}

#[utoipa::path(
    get,
    path = "/api/time",
    tag = "time",
    params(("X-API-Key" = Option<String>, Header, description = "Shared API key, required when the service runs hardened")),
    responses(
        (status = 200, description = "Current server time", body = TimeResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 405, description = "Method other than GET")
    )
)]
/// Return the current server time.
///
/// The method is checked first, then the API key (hardened variant only);
/// the clock is read only once both checks passed.
pub async fn get_time(
    State(state): State<SharedState>,
    request: Request,
) -> Result<Json<TimeResponse>, AppError> {
    super::require_get(request.method())?;

    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    auth_service::authorize(&state, request.headers(), remote, TIME_PATH)?;

    Ok(Json(time_service::current_time(state.clock())))
}

/// Count every request with its final status and record its latency, whatever the outcome.
async fn track_requests(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = method_label(request.method());

    let response = next.run(request).await;

    let metrics = state.metrics();
    metrics.record_request(TIME_PATH, method, response.status().as_u16());
    metrics.observe_duration(TIME_PATH, method, started.elapsed());
    response
}
