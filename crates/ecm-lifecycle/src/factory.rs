//! Typed constructor registries and the wiring steps `create_neuron` /
//! `create_synapse` perform after invoking a constructor (spec.md §4.4).

use std::sync::Arc;

use ecm_types::{
    ChemicalReceiver, ComponentId, ElectricalReceiver, NeuralComponent, NeuronCallbacks, NeuronConfig,
    SynapseCallbacks, SynapseConfig, SynapticProcessor,
};

/// The three capability surfaces a constructed neuron exposes, bundled so a
/// constructor can build one concrete type and hand back three coercions of
/// the same `Arc`.
pub struct NeuronHandle {
    pub component: Arc<dyn NeuralComponent>,
    pub chemical: Arc<dyn ChemicalReceiver>,
    pub electrical: Arc<dyn ElectricalReceiver>,
}

pub struct SynapseHandle {
    pub processor: Arc<dyn SynapticProcessor>,
}

pub type NeuronCtor = Box<dyn Fn(ComponentId, NeuronConfig, NeuronCallbacks) -> NeuronHandle + Send + Sync>;
pub type SynapseCtor = Box<dyn Fn(ComponentId, SynapseConfig, SynapseCallbacks) -> SynapseHandle + Send + Sync>;
