use serde::Serialize;
use utoipa::ToSchema;

/// Value of [`HealthResponse::status`] for a live service.
pub const HEALTHY: &str = "healthy";

/// Simple health response returned by the `/health` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status, always `"healthy"` while the process serves requests.
    pub status: String,
}

impl HealthResponse {
    /// Create a health response indicating the service is operational.
    pub fn healthy() -> Self {
        Self {
            status: HEALTHY.to_string(),
        }
    }
}
