// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # ecm-types
//!
//! Shared data model, error taxonomy, and component capability traits for
//! the extracellular matrix coordination substrate. This is the leaf crate
//! in the workspace: it depends on nothing else in `ecm-*`.

pub mod capability;
pub mod component;
pub mod edge;
pub mod error;
pub mod health;
pub mod ligand;
pub mod position;
pub mod release;
pub mod signal;
pub mod territory;

pub use capability::{
    ChemicalReceiver, ElectricalReceiver, NeuralComponent, NeuronCallbacks, NeuronConfig, Payload,
    SynapseCallbacks, SynapseConfig, SynapticProcessor,
};
pub use component::{ComponentId, ComponentInfo, ComponentKind, ComponentState, ListCriteria, MetadataValue};
pub use edge::SynapticEdge;
pub use error::{ChemicalError, LifecycleError, MatrixError, RegistryError};
pub use health::{ComponentHealth, PatrolReport, PruningCandidate};
pub use ligand::{DiffusionRegime, LigandKind, LigandKinetics, BINDING_DISPATCH_THRESHOLD, GLOBAL_RELEASE_CAP_HZ, LIGAND_KINETICS};
pub use position::Position;
pub use release::{ConcentrationField, ReleaseEvent, ReleaseRecord};
pub use signal::{SignalKind, SignalRecord};
pub use territory::Territory;
