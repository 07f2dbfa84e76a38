//! A seam for injecting time, so rate-limit and decay-tick tests don't
//! have to sleep wall-clock seconds. Grounded in the teacher's pattern of
//! injecting a shared handle (e.g. `MemoryStatsCache`) rather than reaching
//! for global time.

use std::sync::Mutex;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A test double that only advances when told to.
pub struct ManualClock {
    current: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { current: Mutex::new(Instant::now()) }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.current.lock().unwrap();
        *guard += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap()
    }
}
