//! Uniform spatial grid used to keep `find_nearby` sublinear.
//!
//! Bucketed at 50 micrometre cells, per spec.md §4.1's suggested scale for
//! 10^4-10^5 components at tens of queries/ms. Rebuilt incrementally on
//! register/unregister rather than lazily from scratch, since component
//! positions never change after registration (the registry never writes
//! component state — spec.md §3 "Lifecycles").

use ahash::AHashMap;
use ecm_types::{ComponentId, Position};

pub const CELL_SIZE_UM: f64 = 50.0;

type Cell = (i64, i64, i64);

fn cell_of(pos: &Position) -> Cell {
    (
        (pos.x / CELL_SIZE_UM).floor() as i64,
        (pos.y / CELL_SIZE_UM).floor() as i64,
        (pos.z / CELL_SIZE_UM).floor() as i64,
    )
}

#[derive(Default)]
pub struct SpatialGrid {
    cells: AHashMap<Cell, Vec<ComponentId>>,
}

impl SpatialGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ComponentId, pos: &Position) {
        self.cells.entry(cell_of(pos)).or_default().push(id);
    }

    pub fn remove(&mut self, id: &ComponentId, pos: &Position) {
        if let Some(bucket) = self.cells.get_mut(&cell_of(pos)) {
            bucket.retain(|existing| existing != id);
            if bucket.is_empty() {
                self.cells.remove(&cell_of(pos));
            }
        }
    }

    /// Every id whose cell lies within the axis-aligned box covering
    /// `radius` around `centre`. Callers must still filter candidates by
    /// exact Euclidean distance — a cell overlapping the box can contain
    /// points outside the sphere.
    pub fn candidates_within(&self, centre: &Position, radius: f64) -> Vec<ComponentId> {
        let span = (radius / CELL_SIZE_UM).ceil() as i64 + 1;
        let (cx, cy, cz) = cell_of(centre);
        let mut out = Vec::new();
        for dx in -span..=span {
            for dy in -span..=span {
                for dz in -span..=span {
                    if let Some(bucket) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) {
                        out.extend(bucket.iter().cloned());
                    }
                }
            }
        }
        out
    }
}
