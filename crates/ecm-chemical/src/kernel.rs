//! The concentration kernel (spec.md §4.2). A design-level contract, not a
//! first-principles derivation: two independent implementations must agree
//! within 1% at any distance inside a ligand's `max_range_um`.

use ecm_types::{DiffusionRegime, LigandKind};

/// Concentration contributed by one point source of magnitude `c0` at
/// distance `d` from it.
pub fn kernel(ligand: LigandKind, d: f64, c0: f64) -> f64 {
    let k = ligand.kinetics();
    if d > k.max_range_um {
        return 0.0;
    }
    if d < 1e-3 {
        return c0;
    }
    match ligand.regime() {
        DiffusionRegime::Synaptic => {
            let sigma = k.max_range_um / 3.0;
            c0 * (-(d * d) / (2.0 * sigma * sigma)).exp() * (k.diffusion / 1.0)
        }
        DiffusionRegime::Volume => {
            if d < 1.0 {
                c0 * (1.0 - d / 10.0) * (k.diffusion / 0.2)
            } else {
                c0 * d.powf(-0.5) * (-d / (0.6 * k.max_range_um)).exp() * (k.diffusion / 0.2)
            }
        }
        DiffusionRegime::Mixed => c0 * (-d / (k.max_range_um / 2.5)).exp() * (k.diffusion / 0.4),
    }
}
