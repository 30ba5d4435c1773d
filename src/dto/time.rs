use serde::Serialize;
use utoipa::ToSchema;

/// Service name reported in every [`TimeResponse`].
pub const SERVICE_NAME: &str = "time-service";

/// Payload returned by `GET /api/time`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TimeResponse {
    /// Name of the microservice, always `"time-service"`.
    pub service: String,
    /// Current server time formatted as `YYYY-MM-DD HH:MM:SS` in the local zone.
    #[schema(example = "2024-05-01 13:37:00")]
    pub timestamp: String,
}

impl TimeResponse {
    /// Wrap an already formatted timestamp.
    pub fn new(timestamp: String) -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
            timestamp,
        }
    }
}
