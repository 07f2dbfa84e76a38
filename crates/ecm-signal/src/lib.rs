// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # ecm-signal
//!
//! Gap junctions: typed pub/sub for discrete events plus a bidirectional
//! electrical coupling graph (spec.md §4.3). A leaf subsystem — no
//! dependency on the registry or chemical engine.

mod mediator;

pub use mediator::SignalMediator;
