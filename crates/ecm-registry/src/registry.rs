//! The canonical id -> info map, territory map, and directed synaptic edge
//! list (spec.md §4.1). A leaf subsystem: it has no dependency on its
//! peers, and every other subsystem depends on it for position lookup.

use ahash::AHashMap;
use parking_lot::RwLock;

use ecm_types::{ComponentId, ComponentInfo, ListCriteria, Position, RegistryError, SynapticEdge, Territory};

use crate::grid::SpatialGrid;

struct Inner {
    components: AHashMap<ComponentId, ComponentInfo>,
    territories: AHashMap<ComponentId, Territory>,
    edges: Vec<SynapticEdge>,
    grid: SpatialGrid,
}

/// The astrocyte network: spatial/component registry.
pub struct Registry {
    max_components: usize,
    inner: RwLock<Inner>,
}

impl Registry {
    pub fn new(max_components: usize) -> Self {
        Self {
            max_components,
            inner: RwLock::new(Inner {
                components: AHashMap::new(),
                territories: AHashMap::new(),
                edges: Vec::new(),
                grid: SpatialGrid::new(),
            }),
        }
    }

    pub fn count(&self) -> usize {
        self.inner.read().components.len()
    }

    /// Fails on id collision, a non-finite position, or capacity. Most
    /// call paths enforce the cap earlier and atomically in
    /// `ecm-lifecycle`'s factory (spec.md §4.4 step 1); this check exists
    /// so `register` is never the weak link for a caller that bypasses
    /// the factory (the "legacy path", spec.md §6 `register_component`).
    pub fn register(&self, info: ComponentInfo) -> Result<(), RegistryError> {
        if !info.position.is_finite() {
            return Err(RegistryError::InvalidPosition(info.position));
        }
        let mut inner = self.inner.write();
        if inner.components.len() >= self.max_components {
            return Err(RegistryError::CapacityExceeded(self.max_components));
        }
        if inner.components.contains_key(&info.id) {
            return Err(RegistryError::DuplicateId(info.id));
        }
        inner.grid.insert(info.id.clone(), &info.position);
        tracing::debug!(id = %info.id, "component registered");
        inner.components.insert(info.id.clone(), info);
        Ok(())
    }

    pub fn get(&self, id: &ComponentId) -> Option<ComponentInfo> {
        self.inner.read().components.get(id).cloned()
    }

    pub fn list(&self, criteria: &ListCriteria) -> Vec<ComponentInfo> {
        self.inner
            .read()
            .components
            .values()
            .filter(|info| criteria.matches(info))
            .cloned()
            .collect()
    }

    /// Every live component within `radius` of `centre`. No ordering
    /// contract — see spec.md §4.1.
    pub fn find_nearby(&self, centre: &Position, radius: f64) -> Vec<ComponentInfo> {
        let inner = self.inner.read();
        let candidates = inner.grid.candidates_within(centre, radius);
        candidates
            .into_iter()
            .filter_map(|id| inner.components.get(&id))
            .filter(|info| info.position.distance(centre) <= radius)
            .cloned()
            .collect()
    }

    /// Pure Euclidean distance between two positions. NaN/Inf propagate
    /// per ordinary float semantics — callers decide whether to reject.
    pub fn distance(&self, a: &Position, b: &Position) -> f64 {
        a.distance(b)
    }

    /// Distance between two registered components, by id.
    pub fn distance_between(&self, a: &ComponentId, b: &ComponentId) -> Result<f64, RegistryError> {
        let inner = self.inner.read();
        let pos_a = inner
            .components
            .get(a)
            .map(|info| info.position)
            .ok_or_else(|| RegistryError::NotFound(a.clone()))?;
        let pos_b = inner
            .components
            .get(b)
            .map(|info| info.position)
            .ok_or_else(|| RegistryError::NotFound(b.clone()))?;
        Ok(pos_a.distance(&pos_b))
    }

    /// Overwrites any prior territory of the same owner.
    pub fn establish_territory(&self, owner: ComponentId, centre: Position, radius_um: f64) {
        let mut inner = self.inner.write();
        inner.territories.insert(owner.clone(), Territory::new(owner, centre, radius_um));
    }

    pub fn territory_of(&self, owner: &ComponentId) -> Option<Territory> {
        self.inner.read().territories.get(owner).cloned()
    }

    pub fn territories(&self) -> Vec<Territory> {
        self.inner.read().territories.values().cloned().collect()
    }

    /// Idempotent on `syn_id`: a second call with the same id overwrites
    /// the first rather than appending a duplicate edge.
    pub fn record_edge(&self, syn_id: ComponentId, pre: ComponentId, post: ComponentId, weight: f64) {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.edges.iter_mut().find(|e| e.synapse_id == syn_id) {
            existing.pre_id = pre;
            existing.post_id = post;
            existing.weight = weight;
        } else {
            inner.edges.push(SynapticEdge::new(syn_id, pre, post, weight));
        }
    }

    pub fn connections(&self, id: &ComponentId) -> Vec<SynapticEdge> {
        self.inner
            .read()
            .edges
            .iter()
            .filter(|e| e.touches(id))
            .cloned()
            .collect()
    }

    /// Removes the component, any territory it owns, and any edge it is
    /// the synapse of. Edges that merely reference `id` as `pre`/`post`
    /// are left as tombstones (spec.md §3 "tombstones allowed") — use
    /// `purge_stale_edges` to drop edges whose endpoints are both gone.
    pub fn unregister(&self, id: &ComponentId) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        let info = inner.components.remove(id).ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        inner.grid.remove(id, &info.position);
        inner.territories.remove(id);
        inner.edges.retain(|e| &e.synapse_id != id);
        tracing::debug!(id = %id, "component unregistered");
        Ok(())
    }

    /// Drops edges whose `pre` and `post` are both no longer registered.
    /// Maintenance operation, not invoked automatically by `unregister`.
    pub fn purge_stale_edges(&self) -> usize {
        let mut inner = self.inner.write();
        let components = &inner.components;
        let before = inner.edges.len();
        inner
            .edges
            .retain(|e| components.contains_key(&e.pre_id) || components.contains_key(&e.post_id));
        before - inner.edges.len()
    }
}
