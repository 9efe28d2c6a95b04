//! Monotonic time sources
//!
//! The run engine never accumulates per-tick deltas; elapsed time is always
//! recomputed from a reference reading taken at start/resume. `Clock`
//! abstracts the reading so tests can drive time by hand.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A monotonic reading since an arbitrary, fixed epoch.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// `Instant`-backed clock. The epoch is the moment of construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-advanced clock for deterministic tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().expect("clock poisoned") += by;
    }

    pub fn set(&self, to: Duration) {
        *self.now.lock().expect("clock poisoned") = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().expect("clock poisoned")
    }
}
