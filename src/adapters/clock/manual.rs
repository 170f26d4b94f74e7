//! Manually driven clock for tests and simulations.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Starts at the given Unix milliseconds, or the epoch if out of range.
    pub fn at_millis(millis: i64) -> Self {
        let start = Timestamp::from_unix_millis(millis)
            .or_else(|| Timestamp::from_unix_millis(0))
            .unwrap_or_default();
        Self::new(start)
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = now.plus_millis(i64::try_from(by.as_millis()).unwrap_or(i64::MAX));
    }

    /// Jumps to an arbitrary instant.
    pub fn set(&self, to: Timestamp) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
