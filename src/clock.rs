//! Wall-clock source used by the time endpoint.

use time::{OffsetDateTime, UtcOffset};
use tracing::warn;

/// Source of the current time, injected into [`crate::state::AppState`].
pub trait Clock: Send + Sync {
    /// Current instant, already shifted to the zone the service reports in.
    fn now(&self) -> OffsetDateTime;
}

/// Clock reading the system time and reporting it at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    /// Build a clock reporting times at `offset`.
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Clock reporting UTC.
    pub fn utc() -> Self {
        Self::new(UtcOffset::UTC)
    }

    /// Clock reporting the server's local zone.
    ///
    /// Must be called before any other thread is spawned: on Unix the `time`
    /// crate refuses to read the local offset from a multi-threaded process.
    /// Falls back to UTC when the offset cannot be determined.
    pub fn local() -> Self {
        match UtcOffset::current_local_offset() {
            Ok(offset) => Self::new(offset),
            Err(err) => {
                warn!(error = %err, "could not determine local UTC offset; reporting UTC");
                Self::utc()
            }
        }
    }

    /// Offset applied to every reading.
    pub fn offset(&self) -> UtcOffset {
        self.offset
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}
