//! Named configuration profiles (spec.md §4.4 "Configuration profiles").
//! Profile selection is a startup decision; runtime profile changes are out
//! of scope — the substrate never swaps `ProfileSettings` after `start()`.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Profile {
    Conservative,
    Default,
    Aggressive,
}

impl Default for Profile {
    fn default() -> Self {
        Profile::Default
    }
}

/// Pruning thresholds, patrol interval, and health-band tolerances derived
/// from a [`Profile`].
#[derive(Debug, Clone, Copy)]
pub struct ProfileSettings {
    /// Activity below this is tagged `very_low_activity`.
    pub activity_low: f64,
    /// Activity above this is tagged `hyperactive`.
    pub activity_high: f64,
    /// Connection count below this is tagged `poorly_connected`.
    pub connections_low: usize,
    /// Connection count above this is tagged `hyperconnected`.
    pub connections_high: usize,
    /// Recent activity below this makes an edge a pruning candidate.
    pub prune_activity_threshold: f64,
    pub patrol_interval: Duration,
}

impl Profile {
    pub fn settings(self) -> ProfileSettings {
        match self {
            Profile::Conservative => ProfileSettings {
                activity_low: 0.1,
                activity_high: 0.95,
                connections_low: 1,
                connections_high: 40,
                prune_activity_threshold: 0.01,
                patrol_interval: Duration::from_secs(10),
            },
            Profile::Default => ProfileSettings {
                activity_low: 0.2,
                activity_high: 0.9,
                connections_low: 1,
                connections_high: 30,
                prune_activity_threshold: 0.05,
                patrol_interval: Duration::from_secs(5),
            },
            Profile::Aggressive => ProfileSettings {
                activity_low: 0.3,
                activity_high: 0.8,
                connections_low: 2,
                connections_high: 20,
                prune_activity_threshold: 0.1,
                patrol_interval: Duration::from_secs(1),
            },
        }
    }
}
