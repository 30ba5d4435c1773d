//! Errors returned to HTTP callers and how they are rendered.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{dto::error::ErrorResponse, services::auth_service::AuthFailure};

/// Errors surfaced directly to the caller as HTTP responses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    /// The route exists but does not accept the request method.
    #[error("Method not allowed")]
    MethodNotAllowed,
    /// The API-key check rejected the request.
    #[error("{}", .0.message())]
    Unauthorized(AuthFailure),
}

impl AppError {
    /// Status code the error is rendered with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<AuthFailure> for AppError {
    fn from(failure: AuthFailure) -> Self {
        AppError::Unauthorized(failure)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::MethodNotAllowed => (status, self.to_string()).into_response(),
            AppError::Unauthorized(_) => {
                let payload = Json(ErrorResponse {
                    error: "Unauthorized".into(),
                    message: self.to_string(),
                });
                (status, payload).into_response()
            }
        }
    }
}
