use serde::Serialize;
use utoipa::ToSchema;

/// JSON body sent with authentication failures.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error category, e.g. `"Unauthorized"`.
    pub error: String,
    /// Human-readable explanation.
    pub message: String,
}
