use crate::domain::stored_instant;
use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;

/// Source of wall-clock time.
///
/// Consumers that persist what they read go through
/// [`SessionStore::now`](super::store::SessionStore::now), which truncates to
/// stored precision whatever the clock returns.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock, at millisecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        stored_instant(Utc::now())
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Cell::new(start) }
    }

    pub fn advance(&self, seconds: i64) {
        self.now.set(self.now.get() + Duration::seconds(seconds));
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
