/// API-key verification for the hardened variant.
pub mod auth_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Current time lookup and formatting.
pub mod time_service;
