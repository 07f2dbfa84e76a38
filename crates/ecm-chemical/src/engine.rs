//! The modulator: release, decay-tick, and binding dispatch (spec.md §4.2).
//! Background decay is a periodic thread, started/stopped explicitly and
//! safety-netted by `Drop`, grounded on the plasticity service's lifecycle
//! manager in the teacher's NPU crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use ecm_registry::Registry;
use ecm_types::{
    ChemicalError, ChemicalReceiver, ComponentId, ConcentrationField, LigandKind, Position,
    ReleaseEvent, BINDING_DISPATCH_THRESHOLD,
};

use crate::clock::{Clock, SystemClock};
use crate::kernel::kernel;
use crate::rate_limit::RateLimiter;
use crate::targets::TargetRegistry;

const HISTORY_CAP: usize = 1000;

/// The chemical field engine. One instance is shared (behind `Arc`) by the
/// `Matrix` facade and the background decay thread.
pub struct ChemicalEngine {
    fields: [RwLock<ConcentrationField>; LigandKind::COUNT],
    targets: TargetRegistry,
    rate_limiter: RateLimiter,
    history: Mutex<VecDeque<ReleaseEvent>>,
    registry: Arc<Registry>,
    clock: Arc<dyn Clock>,
    unknown_source_fallback: bool,
    decay_interval: Duration,
    running: AtomicBool,
    tick_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl ChemicalEngine {
    pub fn new(registry: Arc<Registry>, decay_interval: Duration, unknown_source_fallback: bool) -> Arc<Self> {
        Self::with_clock(registry, decay_interval, unknown_source_fallback, Arc::new(SystemClock))
    }

    pub fn with_clock(
        registry: Arc<Registry>,
        decay_interval: Duration,
        unknown_source_fallback: bool,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        Arc::new(Self {
            fields: std::array::from_fn(|_| RwLock::new(ConcentrationField::new())),
            targets: TargetRegistry::new(),
            rate_limiter: RateLimiter::new(),
            history: Mutex::new(VecDeque::with_capacity(HISTORY_CAP)),
            registry,
            clock,
            unknown_source_fallback,
            decay_interval,
            running: AtomicBool::new(false),
            tick_handle: Mutex::new(None),
        })
    }

    pub fn register_target(&self, id: ComponentId, ligand: LigandKind, receiver: Arc<dyn ChemicalReceiver>) {
        self.targets.register(id, ligand, receiver);
    }

    pub fn unregister_target(&self, id: &ComponentId) {
        self.targets.unregister(id);
    }

    /// Releases `magnitude` of `ligand` from `source_id`. Rate-limit check
    /// and record happen first and atomically; a failure downstream of
    /// that (e.g. the source has no registered position and fallback is
    /// disabled) does not refund the slot — spec.md §4.2.
    pub fn release(&self, source_id: &ComponentId, ligand: LigandKind, magnitude: f64) -> Result<(), ChemicalError> {
        let now = self.clock.now();
        self.rate_limiter.check_and_record(source_id, ligand, now)?;

        let position = match self.registry.get(source_id) {
            Some(info) => info.position,
            None if self.unknown_source_fallback => Position::ORIGIN,
            None => return Err(ChemicalError::RegistryUnavailable),
        };

        let start = now;
        {
            let mut field = self.fields[ligand.index()].write();
            field.point_sources.insert(position, magnitude);
            field.max_seen = field.max_seen.max(magnitude);
            field.last_tick = now;
        }

        {
            let mut history = self.history.lock();
            if history.len() == HISTORY_CAP {
                history.pop_front();
            }
            history.push_back(ReleaseEvent {
                source_id: source_id.clone(),
                ligand,
                position,
                peak_concentration: magnitude,
                at: SystemTime::now(),
                duration: start.elapsed(),
            });
        }

        self.dispatch_binding(ligand, &position);
        Ok(())
    }

    /// Sum of every stored point source's contribution at `position`,
    /// via the analytic kernel (spec.md §4.2).
    pub fn concentration_at(&self, ligand: LigandKind, position: &Position) -> f64 {
        let field = self.fields[ligand.index()].read();
        field
            .point_sources
            .iter()
            .map(|(src, &c0)| kernel(ligand, position.distance(src), c0))
            .sum()
    }

    /// Snapshots targets and positions, then drops every lock before
    /// calling into `bind` — no registry/field lock is held across a
    /// collaborator callback (spec.md §5 lock-ordering discipline).
    fn dispatch_binding(&self, ligand: LigandKind, _source_position: &Position) {
        for (id, receiver) in self.targets.targets_for(ligand) {
            let Some(info) = self.registry.get(&id) else { continue };
            let concentration = self.concentration_at(ligand, &info.position);
            if concentration >= BINDING_DISPATCH_THRESHOLD {
                receiver.bind(ligand, &id, concentration);
            }
        }
    }

    /// Minimum per-field Δt that a decay tick applies (spec.md §4.2
    /// "Decay tick"). A field ticked more often than this is left
    /// untouched until enough time has accumulated since its own
    /// `last_tick`, rather than double-decaying on a jittery scheduler.
    const MIN_TICK_DT: Duration = Duration::from_micros(100);

    /// One decay/clearance step over every ligand's stored sources, each
    /// measured against that field's own `last_tick` rather than a single
    /// shared elapsed value (spec.md §4.2: "Δt in seconds since that
    /// field's `last_tick`"). Sources below the ligand's biological
    /// threshold after decay are pruned. Fields whose own Δt is under
    /// `MIN_TICK_DT` are skipped this round.
    pub fn tick(&self, now: Instant) {
        for ligand in LigandKind::ALL {
            let k = ligand.kinetics();
            let mut field = self.fields[ligand.index()].write();
            let dt = now.saturating_duration_since(field.last_tick);
            if dt < Self::MIN_TICK_DT {
                continue;
            }
            let factor = (-(k.decay_rate + k.clearance_rate) * dt.as_secs_f64()).exp();
            for value in field.point_sources.values_mut() {
                *value *= factor;
            }
            field.point_sources.retain(|_, &mut c| c >= k.bio_threshold);
            field.last_tick = now;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// The `n` most recent release events across all ligands, newest
    /// first (spec.md §4.2 "Observability"). Purely observational — never
    /// consulted by `concentration_at`.
    pub fn recent_releases(&self, n: usize) -> Vec<ReleaseEvent> {
        self.history.lock().iter().rev().take(n).cloned().collect()
    }

    /// Count of successful releases within the trailing 1-second window,
    /// across all ligands and sources.
    pub fn current_global_rate(&self) -> usize {
        self.rate_limiter.current_global_rate(self.clock.now())
    }

    /// Clears all rate-limit state, for deterministic test isolation.
    pub fn reset_rate_limits(&self) {
        self.rate_limiter.reset();
    }

    /// Starts the background decay-tick thread. Non-blocking; a second call
    /// while already running is a no-op.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("chemical decay tick starting");
        let engine = Arc::clone(self);
        let interval = self.decay_interval;
        let handle = thread::spawn(move || {
            while engine.running.load(Ordering::Relaxed) {
                thread::sleep(interval);
                engine.tick(Instant::now());
            }
        });
        *self.tick_handle.lock() = Some(handle);
    }

    /// Stops the background decay-tick thread and joins it. Non-blocking
    /// signal, blocking join — matches spec.md §4.2 "stop() is synchronous".
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        debug!("chemical decay tick stopping");
        if let Some(handle) = self.tick_handle.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ChemicalEngine {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("ChemicalEngine dropped while decay tick was running, stopping now");
            self.stop();
        }
    }
}
