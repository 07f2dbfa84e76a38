//! Ligand kinds and the fixed kinetics table that parameterises them.

/// A closed enumeration of the chemical species the engine models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LigandKind {
    Glutamate,
    GABA,
    Dopamine,
    Serotonin,
    Acetylcholine,
}

impl LigandKind {
    pub const ALL: [LigandKind; 5] = [
        LigandKind::Glutamate,
        LigandKind::GABA,
        LigandKind::Dopamine,
        LigandKind::Serotonin,
        LigandKind::Acetylcholine,
    ];

    pub const COUNT: usize = 5;

    pub fn index(&self) -> usize {
        match self {
            LigandKind::Glutamate => 0,
            LigandKind::GABA => 1,
            LigandKind::Dopamine => 2,
            LigandKind::Serotonin => 3,
            LigandKind::Acetylcholine => 4,
        }
    }

    /// The diffusion regime used by the concentration kernel (§4.2).
    pub fn regime(&self) -> DiffusionRegime {
        match self {
            LigandKind::Glutamate | LigandKind::GABA => DiffusionRegime::Synaptic,
            LigandKind::Dopamine | LigandKind::Serotonin => DiffusionRegime::Volume,
            LigandKind::Acetylcholine => DiffusionRegime::Mixed,
        }
    }

    pub fn kinetics(&self) -> &'static LigandKinetics {
        &LIGAND_KINETICS[self.index()]
    }
}

/// Which closed-form kernel shape a ligand's concentration follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffusionRegime {
    Synaptic,
    Volume,
    Mixed,
}

/// Fixed biophysical constants for one ligand. These are a design contract
/// (spec.md §4.2), not derived from first principles — two independent
/// implementations of the kernel must agree within 1% at any distance
/// inside `max_range_um`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LigandKinetics {
    /// Diffusion coefficient, µm²/ms.
    pub diffusion: f64,
    /// First-order decay rate, 1/s.
    pub decay_rate: f64,
    /// First-order clearance rate, 1/s.
    pub clearance_rate: f64,
    /// Distance beyond which concentration is defined to be zero, µm.
    pub max_range_um: f64,
    /// Receptor affinity, dimensionless in [0, 1].
    pub affinity: f64,
    /// Per-source release rate ceiling, Hz.
    pub max_rate_hz: f64,
    /// Concentration below which a stored sample is pruned on decay.
    pub bio_threshold: f64,
}

pub const LIGAND_KINETICS: [LigandKinetics; LigandKind::COUNT] = [
    // Glutamate
    LigandKinetics {
        diffusion: 0.76,
        decay_rate: 200.0,
        clearance_rate: 300.0,
        max_range_um: 5.0,
        affinity: 0.9,
        max_rate_hz: 500.0,
        bio_threshold: 0.01,
    },
    // GABA
    LigandKinetics {
        diffusion: 0.60,
        decay_rate: 150.0,
        clearance_rate: 200.0,
        max_range_um: 4.0,
        affinity: 0.8,
        max_rate_hz: 500.0,
        bio_threshold: 0.01,
    },
    // Dopamine
    LigandKinetics {
        diffusion: 0.20,
        decay_rate: 0.01,
        clearance_rate: 0.05,
        max_range_um: 100.0,
        affinity: 0.7,
        max_rate_hz: 100.0,
        bio_threshold: 0.001,
    },
    // Serotonin
    LigandKinetics {
        diffusion: 0.15,
        decay_rate: 0.005,
        clearance_rate: 0.03,
        max_range_um: 80.0,
        affinity: 0.6,
        max_rate_hz: 80.0,
        bio_threshold: 0.001,
    },
    // Acetylcholine
    LigandKinetics {
        diffusion: 0.40,
        decay_rate: 100.0,
        clearance_rate: 20.0,
        max_range_um: 20.0,
        affinity: 0.8,
        max_rate_hz: 300.0,
        bio_threshold: 0.005,
    },
];

/// Aggregate release-rate ceiling across all ligands and sources, Hz.
pub const GLOBAL_RELEASE_CAP_HZ: u32 = 2000;

/// Concentration (µM) below which immediate binding dispatch does not fire.
pub const BINDING_DISPATCH_THRESHOLD: f64 = 0.001;
