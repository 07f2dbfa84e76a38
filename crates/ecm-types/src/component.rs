//! Component identity and the registry's canonical record for one component.

use std::collections::HashMap;
use std::fmt;
use std::time::SystemTime;

use crate::position::Position;

/// A unique, immutable, non-empty component identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentId(String);

impl ComponentId {
    /// Fails to construct from an empty string — callers that need a
    /// fallible path should check `as_str().is_empty()` themselves before
    /// calling, since most call sites already have a non-empty literal or
    /// generated id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for ComponentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What kind of component this is, for `list`/`find` filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentKind {
    Neuron,
    Synapse,
    Gate,
    Other,
}

/// Lifecycle state, read but never written by the substrate itself — see
/// §3 "Lifecycles" in spec.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentState {
    Developing,
    Active,
    Inhibited,
    Dying,
    Dead,
}

/// A metadata value. Kept to a small closed set rather than an arbitrary
/// `Any` so `ComponentInfo` stays `Clone` and comparable in tests without
/// pulling in a JSON dependency the spec never asks for.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// The registry's canonical record for one live component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInfo {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub position: Position,
    pub state: ComponentState,
    pub registered_at: SystemTime,
    pub metadata: HashMap<String, MetadataValue>,
}

impl ComponentInfo {
    pub fn new(id: ComponentId, kind: ComponentKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            state: ComponentState::Developing,
            registered_at: SystemTime::now(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_state(mut self, state: ComponentState) -> Self {
        self.state = state;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Criteria for `list`/`find` queries (§4.1). All fields are optional
/// filters; `None` means "don't filter on this dimension".
#[derive(Debug, Clone, Default)]
pub struct ListCriteria {
    pub kind: Option<ComponentKind>,
    pub state: Option<ComponentState>,
    pub near: Option<(Position, f64)>,
    pub metadata_key: Option<String>,
}

impl ListCriteria {
    pub fn matches(&self, info: &ComponentInfo) -> bool {
        if let Some(kind) = self.kind {
            if info.kind != kind {
                return false;
            }
        }
        if let Some(state) = self.state {
            if info.state != state {
                return false;
            }
        }
        if let Some((centre, radius)) = self.near {
            if info.position.distance(&centre) > radius {
                return false;
            }
        }
        if let Some(key) = &self.metadata_key {
            if !info.metadata.contains_key(key) {
                return false;
            }
        }
        true
    }
}
