//! Concentration fields and release bookkeeping for the chemical engine.

use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime};

use crate::component::ComponentId;
use crate::ligand::LigandKind;
use crate::position::Position;

/// One ligand's analytic spatial concentration function, realised as a
/// sparse map of stored point sources plus the kernel in `ecm-chemical`.
/// `active_releases` is bookkeeping for observability only (spec.md Open
/// Question 3): `point_sources` is the single source of truth summed by
/// `concentration_at`.
#[derive(Debug, Clone)]
pub struct ConcentrationField {
    pub point_sources: HashMap<Position, f64>,
    pub active_releases: HashMap<ComponentId, ReleaseRecord>,
    pub max_seen: f64,
    pub last_tick: Instant,
}

impl ConcentrationField {
    pub fn new() -> Self {
        Self {
            point_sources: HashMap::new(),
            active_releases: HashMap::new(),
            max_seen: 0.0,
            last_tick: Instant::now(),
        }
    }
}

impl Default for ConcentrationField {
    fn default() -> Self {
        Self::new()
    }
}

/// Observability record of a source currently considered "active" for a
/// field. Never consulted by `concentration_at` — see module docs.
#[derive(Debug, Clone)]
pub struct ReleaseRecord {
    pub source_id: ComponentId,
    pub magnitude: f64,
    pub at: SystemTime,
}

/// An append-only observability record of one `release` call. Never used
/// in the physical concentration model — see spec.md §3.
#[derive(Debug, Clone)]
pub struct ReleaseEvent {
    pub source_id: ComponentId,
    pub ligand: LigandKind,
    pub position: Position,
    pub peak_concentration: f64,
    pub at: SystemTime,
    pub duration: Duration,
}
