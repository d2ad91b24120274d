//! Clock port — where the schedule runner reads the time from.

use chrono::NaiveDateTime;

/// Source of local wall-clock time.
pub trait Clock {
    /// Current local date and time.
    fn now_local(&self) -> NaiveDateTime;
}

/// The host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_local(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}
