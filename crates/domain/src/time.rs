//! Local wall-clock helpers.
//!
//! Programs are scheduled against the host's local time. No timezone
//! arithmetic happens here; keeping the host clock correct is the job of the
//! operating system's time sync.

use chrono::{Local, NaiveDateTime, Timelike};

/// Local date and time without an attached offset.
pub type LocalDateTime = NaiveDateTime;

/// Return the current local wall-clock time.
#[must_use]
pub fn now_local() -> LocalDateTime {
    Local::now().naive_local()
}

/// Seconds elapsed since local midnight for `at`.
#[must_use]
pub fn seconds_since_midnight(at: LocalDateTime) -> u32 {
    at.time().num_seconds_from_midnight()
}
