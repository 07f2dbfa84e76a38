//! Component health scoring, surfaced to operators but never acted on by
//! the substrate itself.

use std::collections::HashSet;
use std::time::SystemTime;

use crate::component::ComponentId;

#[derive(Debug, Clone)]
pub struct ComponentHealth {
    /// In [0, 1].
    pub score: f64,
    pub activity: f64,
    pub connection_count: usize,
    pub last_updated: SystemTime,
    pub issues: HashSet<String>,
}

impl ComponentHealth {
    pub fn new() -> Self {
        Self {
            score: 1.0,
            activity: 0.0,
            connection_count: 0,
            last_updated: SystemTime::now(),
            issues: HashSet::new(),
        }
    }
}

impl Default for ComponentHealth {
    fn default() -> Self {
        Self::new()
    }
}

/// A one-shot sweep result over the components inside a territory.
#[derive(Debug, Clone)]
pub struct PatrolReport {
    pub components_checked: usize,
    pub issues_found: usize,
    pub at: SystemTime,
}

/// A pruning candidate surfaced for an operator to act on. Advisory only —
/// nothing in the substrate removes a component because of this.
#[derive(Debug, Clone)]
pub struct PruningCandidate {
    pub edge_id: ComponentId,
    pub pre_id: ComponentId,
    pub post_id: ComponentId,
    pub recent_activity: f64,
}
