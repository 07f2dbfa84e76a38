//! Axonal conduction speed presets and the delay model (spec.md §6
//! "Axonal delay model"). `synaptic_delay = base + dist(pre, post) / speed`.

use std::time::Duration;

/// Named conduction-speed presets, µm/ms.
pub const UNMYELINATED_SLOW: f64 = 500.0;
pub const CORTICAL_LOCAL: f64 = 2_000.0;
pub const CORTICAL_INTER: f64 = 5_000.0;
pub const MYELINATED_MEDIUM: f64 = 10_000.0;
pub const LONG_RANGE: f64 = 15_000.0;
pub const MYELINATED_FAST: f64 = 80_000.0;

pub fn speed_for_name(name: &str) -> Option<f64> {
    match name {
        "unmyelinated_slow" => Some(UNMYELINATED_SLOW),
        "cortical_local" => Some(CORTICAL_LOCAL),
        "cortical_inter" => Some(CORTICAL_INTER),
        "myelinated_medium" => Some(MYELINATED_MEDIUM),
        "long_range" => Some(LONG_RANGE),
        "myelinated_fast" => Some(MYELINATED_FAST),
        _ => None,
    }
}

/// `base + distance_um / speed_um_per_ms`, expressed as a `Duration`.
/// Callers that find either neuron unknown should pass `None` for
/// `distance_um`, which returns `base` unchanged (spec.md §6).
pub fn delay(base: Duration, distance_um: Option<f64>, speed_um_per_ms: f64) -> Duration {
    match distance_um {
        Some(d) if speed_um_per_ms > 0.0 => {
            let extra_ms = d / speed_um_per_ms;
            base + Duration::from_secs_f64(extra_ms / 1_000.0)
        }
        _ => base,
    }
}
