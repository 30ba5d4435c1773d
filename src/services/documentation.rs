use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the time service.
#[openapi(
    paths(
        crate::routes::time::get_time,
        crate::routes::health::health,
        crate::routes::metrics::export_metrics,
    ),
    components(
        schemas(
            crate::dto::time::TimeResponse,
            crate::dto::health::HealthResponse,
            crate::dto::error::ErrorResponse,
        )
    ),
    tags(
        (name = "time", description = "Current server time"),
        (name = "health", description = "Health check endpoints"),
        (name = "metrics", description = "Prometheus scrape endpoint"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/api/time", "/health", "/metrics"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
