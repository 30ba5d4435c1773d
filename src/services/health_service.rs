use crate::dto::health::HealthResponse;

/// Respond with the static health payload.
///
/// The service has no dependencies to check: answering at all means it is live.
pub fn health_status() -> HealthResponse {
    HealthResponse::healthy()
}
