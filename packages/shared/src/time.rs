//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};

/// Display format used for message timestamps (e.g. `Oct 16, 2026, 3:04 PM`).
const MESSAGE_TIMESTAMP_FORMAT: &str = "%b %-d, %Y, %-I:%M %p";

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Format a Unix timestamp (milliseconds) for display in the given offset.
///
/// Returns `None` when the timestamp is outside the range chrono can represent.
pub fn format_message_timestamp(timestamp_millis: i64, offset: &FixedOffset) -> Option<String> {
    DateTime::from_timestamp_millis(timestamp_millis).map(|utc| {
        offset
            .from_utc_datetime(&utc.naive_utc())
            .format(MESSAGE_TIMESTAMP_FORMAT)
            .to_string()
    })
}

/// Format a Unix timestamp (milliseconds) for display in the local time zone.
pub fn format_local_timestamp(timestamp_millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(timestamp_millis).map(|utc| {
        utc.with_timezone(&Local)
            .format(MESSAGE_TIMESTAMP_FORMAT)
            .to_string()
    })
}
