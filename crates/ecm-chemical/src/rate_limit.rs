//! Per-source and global release throttling (spec.md §4.2, S4). Checks are
//! atomic check-then-record: a release that fails downstream (e.g. no
//! registered position) does not get its rate-limit slot refunded.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use parking_lot::Mutex;

use ecm_types::{ChemicalError, ComponentId, GLOBAL_RELEASE_CAP_HZ, LigandKind};

const GLOBAL_WINDOW: Duration = Duration::from_secs(1);

pub struct RateLimiter {
    per_source: Mutex<AHashMap<ComponentId, Instant>>,
    global_window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            per_source: Mutex::new(AHashMap::new()),
            global_window: Mutex::new(VecDeque::new()),
        }
    }

    /// Rejects without side effects if either the per-source minimum
    /// interval or the global rolling-window cap would be exceeded;
    /// records both on success.
    pub fn check_and_record(
        &self,
        source_id: &ComponentId,
        ligand: LigandKind,
        now: Instant,
    ) -> Result<(), ChemicalError> {
        let min_interval = Duration::from_secs_f64(1.0 / ligand.kinetics().max_rate_hz);
        {
            let per_source = self.per_source.lock();
            if let Some(&last) = per_source.get(source_id) {
                if now.saturating_duration_since(last) < min_interval {
                    return Err(ChemicalError::RateLimited);
                }
            }
        }
        {
            let mut window = self.global_window.lock();
            while let Some(&front) = window.front() {
                if now.saturating_duration_since(front) > GLOBAL_WINDOW {
                    window.pop_front();
                } else {
                    break;
                }
            }
            if window.len() as u32 >= GLOBAL_RELEASE_CAP_HZ {
                return Err(ChemicalError::RateLimited);
            }
            window.push_back(now);
        }
        self.per_source.lock().insert(source_id.clone(), now);
        Ok(())
    }

    /// Count of successful releases within the trailing global window, as
    /// of `now`. Used for observability (`current_global_rate`), not for
    /// the admission check itself.
    pub fn current_global_rate(&self, now: Instant) -> usize {
        let window = self.global_window.lock();
        window.iter().filter(|&&at| now.saturating_duration_since(at) <= GLOBAL_WINDOW).count()
    }

    /// Clears all per-source and global rate-limit state, for deterministic
    /// test isolation (spec.md §4.2 "Observability").
    pub fn reset(&self) {
        self.per_source.lock().clear();
        self.global_window.lock().clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
