//! Typed pub/sub plus bidirectional electrical coupling (spec.md §4.3).
//! Listener/coupling maps live behind `RwLock`s; history lives behind its
//! own `Mutex` so a long `recent_signals` read never blocks `send` —
//! grounded on the teacher's separation of `AgentRegistry`'s `RwLock` map
//! from `StateEvent`'s independent channel.

use std::collections::VecDeque;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::{Mutex, RwLock};

use ecm_types::{ComponentId, ElectricalReceiver, Payload, SignalKind, SignalRecord};

const DEFAULT_HISTORY_CAP: usize = 1000;

fn clamp_conductance(value: f64) -> f64 {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        0.5
    } else {
        value
    }
}

pub struct SignalMediator {
    listeners: RwLock<AHashMap<SignalKind, Vec<(ComponentId, Arc<dyn ElectricalReceiver>)>>>,
    couplings: RwLock<AHashMap<ComponentId, AHashMap<ComponentId, f64>>>,
    history: Mutex<VecDeque<SignalRecord>>,
    history_cap: usize,
}

impl SignalMediator {
    pub fn new() -> Self {
        Self::with_history_cap(DEFAULT_HISTORY_CAP)
    }

    pub fn with_history_cap(history_cap: usize) -> Self {
        Self {
            listeners: RwLock::new(AHashMap::new()),
            couplings: RwLock::new(AHashMap::new()),
            history: Mutex::new(VecDeque::with_capacity(history_cap.min(4096))),
            history_cap,
        }
    }

    /// Idempotent: subscribing the same id to the same kind twice leaves a
    /// single entry, so a listener is delivered to at most once per `send`.
    pub fn subscribe(&self, id: ComponentId, kinds: &[SignalKind], listener: Arc<dyn ElectricalReceiver>) {
        let mut listeners = self.listeners.write();
        for kind in kinds {
            let bucket = listeners.entry(kind.clone()).or_default();
            if !bucket.iter().any(|(existing, _)| existing == &id) {
                bucket.push((id.clone(), listener.clone()));
            }
        }
    }

    pub fn unsubscribe(&self, id: &ComponentId, kinds: &[SignalKind]) {
        let mut listeners = self.listeners.write();
        for kind in kinds {
            if let Some(bucket) = listeners.get_mut(kind) {
                bucket.retain(|(existing, _)| existing != id);
            }
        }
    }

    /// Removes `id` from every subscribed kind, not just the ones named.
    pub fn unsubscribe_all(&self, id: &ComponentId) {
        let mut listeners = self.listeners.write();
        for bucket in listeners.values_mut() {
            bucket.retain(|(existing, _)| existing != id);
        }
    }

    /// Delivers `payload` to every listener of `kind` except `source_id`
    /// itself, then appends a history record. Synchronous: every listener
    /// returns before this call does.
    pub fn send(&self, kind: SignalKind, source_id: &ComponentId, payload: Payload) {
        let targets: Vec<Arc<dyn ElectricalReceiver>> = {
            let listeners = self.listeners.read();
            listeners
                .get(&kind)
                .map(|bucket| {
                    bucket
                        .iter()
                        .filter(|(id, _)| id != source_id)
                        .map(|(_, listener)| Arc::clone(listener))
                        .collect()
                })
                .unwrap_or_default()
        };

        for listener in &targets {
            listener.on_signal(&kind, source_id, &payload);
        }

        let mut history = self.history.lock();
        if history.len() >= self.history_cap {
            history.pop_front();
        }
        history.push_back(SignalRecord {
            kind,
            source_id: source_id.clone(),
            payload,
            at: std::time::SystemTime::now(),
        });
    }

    /// Inserts an undirected edge. Self-coupling (`a == b`) is permitted.
    pub fn couple(&self, a: ComponentId, b: ComponentId, conductance: f64) {
        let g = clamp_conductance(conductance);
        let mut couplings = self.couplings.write();
        couplings.entry(a.clone()).or_default().insert(b.clone(), g);
        couplings.entry(b).or_default().insert(a, g);
    }

    pub fn uncouple(&self, a: &ComponentId, b: &ComponentId) {
        let mut couplings = self.couplings.write();
        if let Some(neighbours) = couplings.get_mut(a) {
            neighbours.remove(b);
        }
        if let Some(neighbours) = couplings.get_mut(b) {
            neighbours.remove(a);
        }
    }

    pub fn couplings(&self, id: &ComponentId) -> Vec<ComponentId> {
        self.couplings.read().get(id).map(|n| n.keys().cloned().collect()).unwrap_or_default()
    }

    pub fn conductance(&self, a: &ComponentId, b: &ComponentId) -> f64 {
        self.couplings.read().get(a).and_then(|n| n.get(b)).copied().unwrap_or(0.0)
    }

    pub fn recent_signals(&self, n: usize) -> Vec<SignalRecord> {
        let history = self.history.lock();
        history.iter().rev().take(n).cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    pub fn signal_count(&self) -> usize {
        self.history.lock().len()
    }
}

impl Default for SignalMediator {
    fn default() -> Self {
        Self::new()
    }
}
