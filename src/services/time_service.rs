use time::{OffsetDateTime, macros::format_description};

use crate::{clock::Clock, dto::time::TimeResponse};

/// Format `at` as `YYYY-MM-DD HH:MM:SS`, keeping its own offset.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    at.format(format)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

/// Read the clock and build the `/api/time` payload.
pub fn current_time(clock: &dyn Clock) -> TimeResponse {
    TimeResponse::new(format_timestamp(clock.now()))
}
