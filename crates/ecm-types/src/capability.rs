//! External collaborator interfaces: the capability contracts the
//! substrate consumes from neuron/synapse implementations, and the
//! callback bundles components receive in return. Neither the neuron nor
//! the synapse dynamics themselves are implemented here — spec.md §1
//! treats them as out of scope; only the seams are.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::component::{ComponentId, ComponentState};
use crate::ligand::LigandKind;
use crate::position::Position;
use crate::signal::SignalKind;

/// An opaque event/bind payload. Wrapped rather than exposing `Arc<dyn
/// Any>` directly so callers get a `Debug` impl without each payload type
/// needing one.
#[derive(Clone)]
pub struct Payload(pub Arc<dyn Any + Send + Sync>);

impl Payload {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Payload(..)")
    }
}

/// `NeuralComponent`: the minimal identity/lifecycle surface every
/// substrate-managed neuron exposes.
pub trait NeuralComponent: Send + Sync {
    fn id(&self) -> &ComponentId;
    fn position(&self) -> Position;
    fn start(&self);
    fn stop(&self);
    fn current_state(&self) -> ComponentState;
}

/// A component that wants synchronous chemical `bind` notifications.
pub trait ChemicalReceiver: Send + Sync {
    fn receptors(&self) -> Vec<LigandKind>;
    fn bind(&self, ligand: LigandKind, source_id: &ComponentId, concentration: f64);
}

/// A component that wants to be delivered discrete signal-mediator events.
pub trait ElectricalReceiver: Send + Sync {
    fn signal_kinds(&self) -> Vec<SignalKind>;
    fn on_signal(&self, kind: &SignalKind, source_id: &ComponentId, payload: &Payload);
}

/// A synapse's transmit surface, invoked by the mandatory pre-neuron wiring
/// described in spec.md §4.4 step 6 / Open Question 1.
pub trait SynapticProcessor: Send + Sync {
    fn transmit(&self, payload: &Payload);
    fn pre_id(&self) -> &ComponentId;
    fn post_id(&self) -> &ComponentId;
    fn weight(&self) -> f64;
}

/// Closures a constructed neuron receives at construction time — its only
/// view back into the substrate (§4.4, §9 "Cyclic ownership").
pub struct NeuronCallbacks {
    pub release_ligand: Box<dyn Fn(LigandKind, f64) + Send + Sync>,
    pub send_signal: Box<dyn Fn(SignalKind, Payload) + Send + Sync>,
    pub report_fire: Box<dyn Fn() + Send + Sync>,
    pub spatial_distance_to: Box<dyn Fn(&ComponentId) -> Option<f64> + Send + Sync>,
    pub update_health: Box<dyn Fn(f64, usize) + Send + Sync>,
}

/// Closures a constructed synapse receives at construction time.
pub struct SynapseCallbacks {
    pub deliver_to_post: Box<dyn Fn(Payload) + Send + Sync>,
    pub synaptic_delay: Box<dyn Fn() -> Duration + Send + Sync>,
    pub report_transmission: Box<dyn Fn() + Send + Sync>,
}

/// Inputs to a `NeuronCtor`. Declares which signal kinds and receptors the
/// constructed neuron should be registered for, so the factory can perform
/// the wiring in §4.4 step 5 without inspecting the constructed component.
#[derive(Debug, Clone)]
pub struct NeuronConfig {
    pub type_tag: String,
    pub position: Position,
    pub listens_for: Vec<SignalKind>,
    pub receptors: Vec<LigandKind>,
}

/// Inputs to a `SynapseCtor`. `position` is registered in the spatial
/// registry alongside the synapse's own `ComponentInfo` (kind `Synapse`) —
/// callers typically pass the midpoint of `pre_id`/`post_id`, mirroring
/// `NeuronConfig::position`.
#[derive(Debug, Clone)]
pub struct SynapseConfig {
    pub type_tag: String,
    pub pre_id: ComponentId,
    pub post_id: ComponentId,
    pub weight: f64,
    pub position: Position,
}
