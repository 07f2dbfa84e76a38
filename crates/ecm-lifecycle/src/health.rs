//! Health scoring (spec.md §4.4 "Health"). Scores are surfaced to
//! operators; nothing in the substrate reads them to make decisions.

use ecm_types::ComponentHealth;

use crate::profile::ProfileSettings;

/// Recomputes `health`'s score and issue tags from a fresh
/// activity/connection-count sample.
pub fn assess(health: &mut ComponentHealth, activity: f64, connection_count: usize, settings: &ProfileSettings) {
    health.activity = activity;
    health.connection_count = connection_count;
    health.issues.clear();

    if activity < settings.activity_low {
        health.issues.insert("very_low_activity".to_string());
    }
    if activity > settings.activity_high {
        health.issues.insert("hyperactive".to_string());
    }
    if connection_count < settings.connections_low {
        health.issues.insert("poorly_connected".to_string());
    }
    if connection_count > settings.connections_high {
        health.issues.insert("hyperconnected".to_string());
    }

    let activity_score = band_score(activity, settings.activity_low, settings.activity_high);
    let connection_score = band_score(
        connection_count as f64,
        settings.connections_low as f64,
        settings.connections_high as f64,
    );
    health.score = (activity_score + connection_score) / 2.0;
    health.last_updated = std::time::SystemTime::now();
}

/// 1.0 inside `[low, high]`, decaying linearly to 0.0 at twice the
/// distance from the nearer band edge. A simple, symmetric penalty —
/// exact shape is not spec-mandated, only that out-of-band samples score
/// lower than in-band ones.
fn band_score(value: f64, low: f64, high: f64) -> f64 {
    if value >= low && value <= high {
        return 1.0;
    }
    let span = (high - low).max(1e-9);
    let distance = if value < low { low - value } else { value - high };
    (1.0 - distance / span).clamp(0.0, 1.0)
}
