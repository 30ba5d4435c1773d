use axum::{Json, Router, http::Method, routing::any};

use crate::{
    dto::health::HealthResponse, error::AppError, services::health_service, state::SharedState,
};

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 405, description = "Method other than GET")
    )
)]
/// Return the health status of the service. Never requires an API key.
pub async fn health(method: Method) -> Result<Json<HealthResponse>, AppError> {
    super::require_get(&method)?;
    Ok(Json(health_service::health_status()))
}

/// Configure the health routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route(HEALTH_PATH, any(health))
}
