use axum::{Json, Router, routing::get};
use utoipa::OpenApi;

use crate::{services::documentation::ApiDoc, state::SharedState};

/// Path the generated OpenAPI document is served from.
pub const OPENAPI_PATH: &str = "/api-doc/openapi.json";

/// Serve the generated OpenAPI document.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
}
