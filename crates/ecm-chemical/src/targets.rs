//! Binding-target bookkeeping: which components receive which ligand's
//! concentration updates (spec.md §4.2 "binding dispatch"). Kept separate
//! from `ConcentrationField` so the release path can compute concentrations
//! under a read lock and only then, lock-free, walk targets to call `bind`.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;

use ecm_types::{ChemicalReceiver, ComponentId, LigandKind};

#[derive(Default)]
pub struct TargetRegistry {
    by_id: RwLock<AHashMap<ComponentId, Arc<dyn ChemicalReceiver>>>,
    by_ligand: RwLock<[Vec<ComponentId>; LigandKind::COUNT]>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: re-registering the same id under the same ligand does
    /// not create a duplicate dispatch entry.
    pub fn register(&self, id: ComponentId, ligand: LigandKind, receiver: Arc<dyn ChemicalReceiver>) {
        self.by_id.write().insert(id.clone(), receiver);
        let mut by_ligand = self.by_ligand.write();
        let bucket = &mut by_ligand[ligand.index()];
        if !bucket.contains(&id) {
            bucket.push(id);
        }
    }

    pub fn unregister(&self, id: &ComponentId) {
        self.by_id.write().remove(id);
        let mut by_ligand = self.by_ligand.write();
        for bucket in by_ligand.iter_mut() {
            bucket.retain(|t| t != id);
        }
    }

    /// Targets registered for `ligand`, with their receivers, snapshotted
    /// so the caller can drop all locks before invoking `bind`.
    pub fn targets_for(&self, ligand: LigandKind) -> Vec<(ComponentId, Arc<dyn ChemicalReceiver>)> {
        let ids = self.by_ligand.read()[ligand.index()].clone();
        let by_id = self.by_id.read();
        ids.into_iter().filter_map(|id| by_id.get(&id).cloned().map(|r| (id, r))).collect()
    }
}
