// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # ecm — extracellular matrix coordination substrate
//!
//! A biologically-inspired neural simulation needs a substrate that answers
//! three questions: who exists and where, what chemical signals exist in
//! space at what concentration, and which discrete electrical events should
//! be delivered where. `ecm` answers all three through a single façade,
//! [`Matrix`], that owns four interlocking subsystems:
//!
//! - [`ecm_registry::Registry`] — the astrocyte network: spatial/component
//!   registry, territories, directed synaptic edges.
//! - [`ecm_chemical::ChemicalEngine`] — the modulator: per-ligand
//!   concentration fields, release, decay tick, rate limiting.
//! - [`ecm_signal::SignalMediator`] — gap junctions: typed pub/sub and the
//!   electrical coupling graph.
//! - [`ecm_lifecycle::LifecycleManager`] — the microglia: typed factory
//!   dispatch, health scoring, patrol, removal.
//!
//! Neuron and synapse dynamics themselves (spiking, STDP, weight update)
//! are out of scope; components are external collaborators that implement
//! the capability traits in [`ecm_types`] and receive a callback bundle at
//! construction time rather than a handle to `Matrix` itself — this is
//! what keeps construction acyclic (see the module-level lock-ordering
//! note below).
//!
//! ## Lock ordering
//!
//! A thread that must hold more than one subsystem lock acquires in this
//! order: Lifecycle → Registry → Signal Mediator → Chemical Engine
//! (per-ligand) → rate-limit counters → history rings. Callback and
//! binding-target invocations happen with no `Matrix`-owned lock held —
//! `ChemicalEngine::release` drops its field lock before calling `bind`,
//! and `SignalMediator::send` never holds its listener lock across a
//! listener invocation. A caller reaching into more than one subsystem
//! directly (rather than through a single façade method) must preserve
//! this order to avoid deadlock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use ecm_chemical::ChemicalEngine;
pub use ecm_config::{MatrixConfig, Profile as ConfigProfile};
use ecm_lifecycle::{LifecycleManager, Profile};
pub use ecm_observability::{init_tracing, LoggingGuard};
pub use ecm_lifecycle::{NeuronCtor, NeuronHandle, SynapseCtor, SynapseHandle};
use ecm_registry::Registry;
use ecm_signal::SignalMediator;
pub use ecm_types::{
    ChemicalReceiver, ComponentHealth, ComponentId, ComponentInfo, ComponentKind, ComponentState,
    ElectricalReceiver, ListCriteria, LigandKind, MatrixError, NeuralComponent, NeuronCallbacks, NeuronConfig,
    Payload, PatrolReport, PruningCandidate, Position, RegistryError, ReleaseEvent, SignalKind, SignalRecord,
    SynapseCallbacks, SynapseConfig, SynapticEdge, SynapticProcessor, Territory,
};
use ecm_types::{ChemicalError, LifecycleError};

fn lifecycle_profile(profile: ConfigProfile) -> Profile {
    match profile {
        ConfigProfile::Conservative => Profile::Conservative,
        ConfigProfile::Default => Profile::Default,
        ConfigProfile::Aggressive => Profile::Aggressive,
    }
}

/// The single external façade over the four coordination subsystems
/// (spec.md §6 "Public API surface"). Multiple `Matrix` instances can
/// coexist in one process, each with its own counters, locks, and decay
/// tick thread — there is no process-wide global state (spec.md §9
/// "Global mutable state").
pub struct Matrix {
    registry: Arc<Registry>,
    chemical: Arc<ChemicalEngine>,
    signal: Arc<SignalMediator>,
    lifecycle: Arc<LifecycleManager>,
    config: MatrixConfig,
    running: AtomicBool,
}

impl Matrix {
    /// Builds every subsystem and wires their cross-dependencies, but does
    /// not start the chemical decay tick — call [`Matrix::start`] for that.
    pub fn new(config: MatrixConfig) -> Self {
        let config = config.normalized();
        let registry = Arc::new(Registry::new(config.max_components));
        let chemical = ChemicalEngine::new(Arc::clone(&registry), config.update_interval, config.unknown_source_fallback);
        let signal = Arc::new(SignalMediator::with_history_cap(config.history_size));
        let lifecycle = LifecycleManager::new(
            Arc::clone(&registry),
            Arc::clone(&signal),
            Arc::clone(&chemical),
            config.max_components,
            lifecycle_profile(config.profile),
        );

        Self { registry, chemical, signal, lifecycle, config, running: AtomicBool::new(false) }
    }

    /// Starts the chemical engine's background decay tick and the
    /// lifecycle manager's patrol loop. Idempotent.
    pub fn start(&self) -> Result<(), MatrixError> {
        if self.config.chemical_enabled {
            self.chemical.start();
        }
        self.lifecycle.start_patrol_loop();
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Stops the decay tick and the patrol loop and joins their threads.
    /// Idempotent; does not wait for in-flight façade calls made from
    /// other threads to complete — callers are responsible for quiescing
    /// their own threads first if that matters to them.
    pub fn stop(&self) -> Result<(), MatrixError> {
        self.running.store(false, Ordering::SeqCst);
        self.chemical.stop();
        self.lifecycle.stop_patrol_loop();
        Ok(())
    }

    fn require_running(&self) -> Result<(), MatrixError> {
        if self.running.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(MatrixError::NotRunning)
        }
    }

    // ---- Factory / lifecycle -------------------------------------------------

    pub fn register_neuron_type(&self, tag: impl Into<String>, ctor: NeuronCtor) {
        self.lifecycle.register_neuron_type(tag, ctor);
    }

    pub fn register_synapse_type(&self, tag: impl Into<String>, ctor: SynapseCtor) {
        self.lifecycle.register_synapse_type(tag, ctor);
    }

    pub fn create_neuron(&self, cfg: NeuronConfig) -> Result<NeuronHandle, MatrixError> {
        self.require_running()?;
        self.lifecycle.create_neuron(cfg).map_err(|e| {
            if matches!(e, LifecycleError::UnknownType(_) | LifecycleError::DuplicateId(_)) {
                error!(error = %e, "create_neuron failed");
            }
            MatrixError::from(e)
        })
    }

    pub fn create_synapse(&self, cfg: SynapseConfig) -> Result<SynapseHandle, MatrixError> {
        self.require_running()?;
        self.lifecycle.create_synapse(cfg).map_err(|e| {
            if matches!(e, LifecycleError::UnknownType(_) | LifecycleError::DuplicateId(_)) {
                error!(error = %e, "create_synapse failed");
            }
            MatrixError::from(e)
        })
    }

    pub fn remove(&self, id: &ComponentId) -> Result<(), MatrixError> {
        Ok(self.lifecycle.remove(id)?)
    }

    /// Legacy path: registers an externally-constructed component directly
    /// with the registry, bypassing the factory's callback-bundle wiring
    /// (spec.md §6). Callers that use this path are responsible for their
    /// own signal subscriptions and chemical target registration.
    pub fn register_component(&self, info: ComponentInfo) -> Result<(), MatrixError> {
        Ok(self.registry.register(info)?)
    }

    // ---- Chemical engine -------------------------------------------------

    pub fn release_ligand(&self, ligand: LigandKind, source: &ComponentId, magnitude: f64) -> Result<(), MatrixError> {
        if !self.config.chemical_enabled {
            return Ok(());
        }
        self.chemical.release(source, ligand, magnitude).map_err(|e| {
            if !matches!(e, ChemicalError::RateLimited) {
                error!(error = %e, "release_ligand failed");
            }
            MatrixError::from(e)
        })
    }

    pub fn concentration_at(&self, ligand: LigandKind, pos: Position) -> f64 {
        if !self.config.chemical_enabled {
            return 0.0;
        }
        self.chemical.concentration_at(ligand, &pos)
    }

    pub fn recent_releases(&self, n: usize) -> Vec<ReleaseEvent> {
        self.chemical.recent_releases(n)
    }

    pub fn current_global_release_rate(&self) -> usize {
        self.chemical.current_global_rate()
    }

    pub fn reset_rate_limits(&self) {
        self.chemical.reset_rate_limits();
    }

    // ---- Signal mediator ---------------------------------------------------

    pub fn send_signal(&self, kind: SignalKind, source: &ComponentId, payload: Payload) {
        self.signal.send(kind, source, payload);
    }

    pub fn subscribe(&self, id: ComponentId, kinds: &[SignalKind], listener: Arc<dyn ElectricalReceiver>) {
        self.signal.subscribe(id, kinds, listener);
    }

    pub fn unsubscribe(&self, id: &ComponentId, kinds: &[SignalKind]) {
        self.signal.unsubscribe(id, kinds);
    }

    pub fn couple(&self, a: ComponentId, b: ComponentId, conductance: f64) {
        self.signal.couple(a, b, conductance);
    }

    pub fn uncouple(&self, a: &ComponentId, b: &ComponentId) {
        self.signal.uncouple(a, b);
    }

    pub fn couplings(&self, id: &ComponentId) -> Vec<ComponentId> {
        self.signal.couplings(id)
    }

    pub fn conductance(&self, a: &ComponentId, b: &ComponentId) -> f64 {
        self.signal.conductance(a, b)
    }

    pub fn recent_signals(&self, n: usize) -> Vec<SignalRecord> {
        self.signal.recent_signals(n)
    }

    pub fn clear_signal_history(&self) {
        self.signal.clear_history();
    }

    pub fn signal_count(&self) -> usize {
        self.signal.signal_count()
    }

    // ---- Spatial / component registry --------------------------------------

    pub fn get(&self, id: &ComponentId) -> Option<ComponentInfo> {
        self.registry.get(id)
    }

    pub fn find(&self, criteria: &ListCriteria) -> Vec<ComponentInfo> {
        if !self.config.spatial_enabled {
            return Vec::new();
        }
        self.registry.list(criteria)
    }

    pub fn find_nearby(&self, centre: Position, radius: f64) -> Vec<ComponentInfo> {
        if !self.config.spatial_enabled {
            return Vec::new();
        }
        self.registry.find_nearby(&centre, radius)
    }

    pub fn distance(&self, a: &ComponentId, b: &ComponentId) -> Result<f64, MatrixError> {
        if !self.config.spatial_enabled {
            return Ok(0.0);
        }
        Ok(self.registry.distance_between(a, b)?)
    }

    pub fn establish_territory(&self, owner: ComponentId, centre: Position, radius_um: f64) {
        self.registry.establish_territory(owner, centre, radius_um);
    }

    pub fn connections(&self, id: &ComponentId) -> Vec<SynapticEdge> {
        self.registry.connections(id)
    }

    pub fn count(&self) -> usize {
        self.registry.count()
    }

    // ---- Lifecycle / health -------------------------------------------------

    pub fn update_health(&self, id: &ComponentId, activity: f64, connection_count: usize) {
        self.lifecycle.update_health(id, activity, connection_count);
    }

    pub fn health_of(&self, id: &ComponentId) -> Option<ComponentHealth> {
        self.lifecycle.health_of(id)
    }

    pub fn mark_for_pruning(&self, edge_id: ComponentId, pre_id: ComponentId, post_id: ComponentId, recent_activity: f64) {
        self.lifecycle.mark_for_pruning(edge_id, pre_id, post_id, recent_activity);
    }

    pub fn pruning_candidates(&self) -> Vec<PruningCandidate> {
        self.lifecycle.pruning_candidates()
    }

    pub fn patrol(&self, owner: &ComponentId) -> PatrolReport {
        self.lifecycle.patrol(owner)
    }

    // ---- Axonal delay -------------------------------------------------------

    pub fn set_axon_speed(&self, um_per_ms: f64) {
        self.lifecycle.set_axon_speed(um_per_ms);
    }

    pub fn set_axon_type(&self, name: &str) -> Result<(), MatrixError> {
        Ok(self.lifecycle.set_axon_type(name)?)
    }

    /// `base + dist(pre, post) / axon_speed`. `_syn` is accepted for
    /// symmetry with spec.md §6's signature but unused: the delay model
    /// depends only on the pre/post positions and the configured axon
    /// speed, not on which synapse is asking.
    pub fn synaptic_delay(&self, pre: &ComponentId, post: &ComponentId, _syn: &ComponentId, base: Duration) -> Duration {
        self.lifecycle.synaptic_delay(pre, post, base)
    }
}
