/// Error payload returned on rejected requests.
pub mod error;
/// Health check payload.
pub mod health;
/// Current time payload.
pub mod time;
