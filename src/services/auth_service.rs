use std::net::SocketAddr;

use axum::http::HeaderMap;
use tracing::warn;

use crate::{config::ApiKey, state::SharedState};

/// Header carrying the caller-supplied API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Why an API-key check rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthFailure {
    /// No `X-API-Key` header was sent.
    Missing,
    /// The header did not match the configured key.
    Invalid,
}

impl AuthFailure {
    /// Value of the `reason` metrics label.
    pub fn label(self) -> &'static str {
        match self {
            AuthFailure::Missing => "missing",
            AuthFailure::Invalid => "invalid",
        }
    }

    /// Message returned to the caller.
    pub fn message(self) -> &'static str {
        match self {
            AuthFailure::Missing => "API key required",
            AuthFailure::Invalid => "Invalid API key",
        }
    }
}

/// Compare the `X-API-Key` header with `expected`.
///
/// A value that is not visible ASCII can never equal a configured key and
/// counts as invalid rather than missing.
pub fn verify_api_key(expected: &ApiKey, headers: &HeaderMap) -> Result<(), AuthFailure> {
    let provided = headers.get(API_KEY_HEADER).ok_or(AuthFailure::Missing)?;
    match provided.to_str() {
        Ok(provided) if expected.matches(provided) => Ok(()),
        _ => Err(AuthFailure::Invalid),
    }
}

/// Run the API-key check when the service is hardened, recording and logging rejections.
pub fn authorize(
    state: &SharedState,
    headers: &HeaderMap,
    remote: Option<SocketAddr>,
    endpoint: &str,
) -> Result<(), AuthFailure> {
    let Some(expected) = state.config().api_key() else {
        return Ok(());
    };

    verify_api_key(expected, headers).inspect_err(|failure| {
        state.metrics().record_auth_failure(endpoint, *failure);
        let remote = remote.map_or_else(|| "unknown".to_owned(), |addr| addr.to_string());
        warn!(
            %remote,
            endpoint,
            reason = failure.label(),
            "rejected request: {}",
            failure.message()
        );
    })
}
