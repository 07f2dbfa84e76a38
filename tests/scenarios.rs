// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end scenarios exercising the full `Matrix` façade (spec.md §8
//! "Concrete end-to-end scenarios", S1-S6).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ecm::{
    ComponentId, ComponentInfo, ComponentKind, ComponentState, ElectricalReceiver, LigandKind, Matrix, MatrixConfig,
    Payload, Position, SignalKind,
};

fn running_matrix() -> Matrix {
    let m = Matrix::new(MatrixConfig { max_components: 1000, ..MatrixConfig::default() });
    m.start().unwrap();
    m
}

fn register(m: &Matrix, id: &str, pos: Position) {
    m.register_component(ComponentInfo::new(ComponentId::new(id), ComponentKind::Neuron, pos).with_state(ComponentState::Active))
        .unwrap();
}

fn approx(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// S1 — Distance and delay.
#[test]
fn s1_distance_and_delay() {
    let m = running_matrix();
    register(&m, "A", Position::new(0.0, 0.0, 0.0));
    register(&m, "B", Position::new(100.0, 0.0, 0.0));

    let d = m.distance(&ComponentId::new("A"), &ComponentId::new("B")).unwrap();
    assert!(approx(d, 100.0, 1e-9));

    m.set_axon_speed(2000.0);
    let delay = m.synaptic_delay(&ComponentId::new("A"), &ComponentId::new("B"), &ComponentId::new("s1"), Duration::from_millis(1));
    assert!(approx(delay.as_secs_f64() * 1000.0, 1.05, 1e-9));
}

/// S2 — Synaptic diffusion (Glutamate).
#[test]
fn s2_synaptic_diffusion() {
    let m = running_matrix();
    register(&m, "src", Position::ORIGIN);
    m.release_ligand(LigandKind::Glutamate, &ComponentId::new("src"), 1.0).unwrap();

    let at_origin = m.concentration_at(LigandKind::Glutamate, Position::ORIGIN);
    assert!(approx(at_origin, 1.0, 1e-9));

    let at_max_range = m.concentration_at(LigandKind::Glutamate, Position::new(5.0, 0.0, 0.0));
    assert!(approx(at_max_range, 0.00844, 1e-4), "got {at_max_range}");

    let beyond = m.concentration_at(LigandKind::Glutamate, Position::new(6.0, 0.0, 0.0));
    assert_eq!(beyond, 0.0);
}

/// S3 — Volume diffusion (Dopamine).
#[test]
fn s3_volume_diffusion() {
    let m = running_matrix();
    register(&m, "src", Position::ORIGIN);
    m.release_ligand(LigandKind::Dopamine, &ComponentId::new("src"), 1.0).unwrap();

    let at_10 = m.concentration_at(LigandKind::Dopamine, Position::new(10.0, 0.0, 0.0));
    assert!(approx(at_10, 0.267, 1e-3), "got {at_10}");

    let beyond = m.concentration_at(LigandKind::Dopamine, Position::new(101.0, 0.0, 0.0));
    assert_eq!(beyond, 0.0);
}

/// S4 — Rate limiting.
#[test]
fn s4_rate_limiting() {
    let m = running_matrix();
    register(&m, "n1", Position::ORIGIN);
    m.reset_rate_limits();

    m.release_ligand(LigandKind::Glutamate, &ComponentId::new("n1"), 0.5).unwrap();
    let second = m.release_ligand(LigandKind::Glutamate, &ComponentId::new("n1"), 0.5);
    assert!(second.is_err(), "second release within 1/MaxRate should be rate-limited");

    // Glutamate's MaxRate is 500Hz -> 2ms minimum interval; wait past it.
    thread::sleep(Duration::from_millis(3));
    m.release_ligand(LigandKind::Glutamate, &ComponentId::new("n1"), 0.5).unwrap();
}

struct CountingListener {
    hits: AtomicUsize,
}

impl ElectricalReceiver for CountingListener {
    fn signal_kinds(&self) -> Vec<SignalKind> {
        vec![SignalKind::Fired]
    }

    fn on_signal(&self, _kind: &SignalKind, _source_id: &ComponentId, _payload: &Payload) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}

/// S5 — Self-signal prevention.
#[test]
fn s5_self_signal_prevention() {
    let m = running_matrix();
    let listener = Arc::new(CountingListener { hits: AtomicUsize::new(0) });
    m.subscribe(ComponentId::new("n1"), &[SignalKind::Fired], listener.clone());

    m.send_signal(SignalKind::Fired, &ComponentId::new("n1"), Payload::new(()));
    assert_eq!(listener.hits.load(Ordering::SeqCst), 0);

    m.send_signal(SignalKind::Fired, &ComponentId::new("n2"), Payload::new(()));
    assert_eq!(listener.hits.load(Ordering::SeqCst), 1);
}

/// S6 — Gap junction symmetry.
#[test]
fn s6_gap_junction_symmetry() {
    let m = running_matrix();
    let a = ComponentId::new("a");
    let b = ComponentId::new("b");

    m.couple(a.clone(), b.clone(), 0.7);
    assert_eq!(m.conductance(&a, &b), 0.7);
    assert_eq!(m.conductance(&b, &a), 0.7);
    assert!(m.couplings(&a).contains(&b));
    assert!(m.couplings(&b).contains(&a));

    m.couple(a.clone(), b.clone(), 2.0);
    assert_eq!(m.conductance(&a, &b), 0.5);

    m.uncouple(&a, &b);
    assert_eq!(m.conductance(&a, &b), 0.0);
    assert!(m.couplings(&a).is_empty());
    assert!(m.couplings(&b).is_empty());
}
