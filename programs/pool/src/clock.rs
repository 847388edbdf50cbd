//! Time source for expiry checks

use chrono::Utc;

pub trait Clock {
    /// Current unix timestamp in seconds
    fn now(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Settable clock for tests and replays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    pub now: i64,
}

impl FixedClock {
    pub fn at(now: i64) -> Self {
        Self { now }
    }

    pub fn advance(&mut self, secs: i64) {
        self.now = self.now.saturating_add(secs);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.now
    }
}
