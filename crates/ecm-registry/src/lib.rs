// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # ecm-registry
//!
//! The astrocyte network: canonical store of components, territories, and
//! directed synaptic edges, with sublinear spatial queries (spec.md §4.1).
//! A leaf subsystem — no dependency on its peers.

mod grid;
mod registry;

pub use registry::Registry;
