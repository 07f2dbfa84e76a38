// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Multi-threaded stress tests for the two invariants spec.md §8 calls out
//! as holding "under concurrent creates": id uniqueness (property 1) and
//! cap enforcement (property 2).

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use ecm::{
    ChemicalReceiver, ComponentId, ComponentState, ElectricalReceiver, LigandKind, Matrix, MatrixConfig,
    NeuralComponent, NeuronConfig, Payload, Position, SignalKind,
};

struct StubNeuron {
    id: ComponentId,
    position: Position,
}

impl NeuralComponent for StubNeuron {
    fn id(&self) -> &ComponentId {
        &self.id
    }
    fn position(&self) -> Position {
        self.position
    }
    fn start(&self) {}
    fn stop(&self) {}
    fn current_state(&self) -> ComponentState {
        ComponentState::Active
    }
}

impl ChemicalReceiver for StubNeuron {
    fn receptors(&self) -> Vec<LigandKind> {
        vec![]
    }
    fn bind(&self, _ligand: LigandKind, _source_id: &ComponentId, _concentration: f64) {}
}

impl ElectricalReceiver for StubNeuron {
    fn signal_kinds(&self) -> Vec<SignalKind> {
        vec![]
    }
    fn on_signal(&self, _kind: &SignalKind, _source_id: &ComponentId, _payload: &Payload) {}
}

fn stub_ctor() -> ecm::NeuronCtor {
    Box::new(|id, cfg: NeuronConfig, _callbacks| {
        let neuron = Arc::new(StubNeuron { id, position: cfg.position });
        ecm::NeuronHandle { component: neuron.clone(), chemical: neuron.clone(), electrical: neuron }
    })
}

/// spec.md §8 property 2: `count() <= max_components` at all times, even
/// under concurrent creates — and property 1: no two simultaneously live
/// components share an id. 64 threads race to create neurons against a
/// matrix capped at 10; at most 10 succeed, every successful id is unique,
/// and the final count never exceeds the cap.
#[test]
fn concurrent_creates_respect_cap_and_id_uniqueness() {
    const CAP: usize = 10;
    const THREADS: usize = 64;

    let m = Arc::new(Matrix::new(MatrixConfig { max_components: CAP, ..MatrixConfig::default() }));
    m.start().unwrap();
    m.register_neuron_type("stub", stub_ctor());

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let m = Arc::clone(&m);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let cfg = NeuronConfig {
                    type_tag: "stub".into(),
                    position: Position::new(i as f64, 0.0, 0.0),
                    listens_for: vec![],
                    receptors: vec![],
                };
                m.create_neuron(cfg).ok().map(|h| h.component.id().clone())
            })
        })
        .collect();

    let ids: Vec<ComponentId> = handles.into_iter().filter_map(|h| h.join().unwrap()).collect();

    assert!(ids.len() <= CAP, "more successful creates ({}) than the cap ({CAP})", ids.len());
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate id among concurrently created components");
    assert!(m.count() <= CAP, "registry count {} exceeded cap {CAP}", m.count());
    assert_eq!(m.count(), ids.len(), "registry count should match the number of successful creates");
}

/// Hammers the cap from both sides: once the cap is saturated, every
/// further concurrent attempt must fail with `ResourceExhausted`, never
/// silently succeed or panic.
#[test]
fn cap_holds_once_saturated_under_concurrent_pressure() {
    const CAP: usize = 4;
    const THREADS: usize = 32;

    let m = Arc::new(Matrix::new(MatrixConfig { max_components: CAP, ..MatrixConfig::default() }));
    m.start().unwrap();
    m.register_neuron_type("stub", stub_ctor());

    for i in 0..CAP {
        let cfg = NeuronConfig { type_tag: "stub".into(), position: Position::new(i as f64, 0.0, 0.0), listens_for: vec![], receptors: vec![] };
        m.create_neuron(cfg).unwrap();
    }
    assert_eq!(m.count(), CAP);

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let m = Arc::clone(&m);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let cfg = NeuronConfig {
                    type_tag: "stub".into(),
                    position: Position::new(100.0 + i as f64, 0.0, 0.0),
                    listens_for: vec![],
                    receptors: vec![],
                };
                m.create_neuron(cfg)
            })
        })
        .collect();

    for h in handles {
        let result = h.join().unwrap();
        assert!(result.is_err(), "create beyond a saturated cap must fail, not succeed");
    }
    assert_eq!(m.count(), CAP, "a saturated cap must never grow under concurrent pressure");
}
