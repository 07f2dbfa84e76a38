// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # ecm-config
//!
//! Startup configuration for the extracellular matrix substrate (spec.md
//! §6 "Configuration"). Deliberately narrower than the teacher's TOML/file
//! loader: this substrate has no file format or wire protocol to load from
//! (spec.md §6), so construction is programmatic — a plain struct with a
//! sane `Default`, not a parser.

use std::time::Duration;

/// Named tuning profile (spec.md §4.4 "Configuration profiles"). Selected
/// once at startup; runtime profile changes are out of scope.
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

/// Minimum permitted decay-tick period (spec.md §6).
pub const MIN_UPDATE_INTERVAL: Duration = Duration::from_micros(100);

/// Startup configuration for a `Matrix` instance.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixConfig {
    /// If false, releases succeed as a no-op and `concentration_at` returns 0.
    pub chemical_enabled: bool,
    /// If false, spatial queries return empty and distances return 0.
    pub spatial_enabled: bool,
    /// Decay-tick period. Clamped up to [`MIN_UPDATE_INTERVAL`] if lower.
    pub update_interval: Duration,
    pub max_components: usize,
    /// Ring length for signal and release histories.
    pub history_size: usize,
    pub profile: Profile,
    /// Whether `release` falls back to `Position::ORIGIN` for an unknown
    /// source rather than rejecting (spec.md Open Question 2).
    pub unknown_source_fallback: bool,
}

impl MatrixConfig {
    /// Clamps `update_interval` up to the configured floor. Called once at
    /// `Matrix::new`, not on every tick.
    pub fn normalized(mut self) -> Self {
        if self.update_interval < MIN_UPDATE_INTERVAL {
            self.update_interval = MIN_UPDATE_INTERVAL;
        }
        self
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            chemical_enabled: true,
            spatial_enabled: true,
            update_interval: Duration::from_millis(1),
            max_components: 100_000,
            history_size: 1000,
            profile: Profile::default(),
            unknown_source_fallback: true,
        }
    }
}
