//! Clock port — where "now" comes from.

use irrigo_domain::time::{LocalDateTime, now_local};

/// Source of local wall-clock time for the scheduler.
pub trait Clock: Send + Sync {
    fn now(&self) -> LocalDateTime;
}

/// The host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> LocalDateTime {
        now_local()
    }
}

impl<T: Clock> Clock for std::sync::Arc<T> {
    fn now(&self) -> LocalDateTime {
        (**self).now()
    }
}
