//! Discrete electrical event kinds routed by the signal mediator.

use std::fmt;
use std::time::SystemTime;

use crate::capability::Payload;
use crate::component::ComponentId;

/// A discrete event type. `Fired` and `Connected` are the two kinds every
/// substrate ships with; `Custom` lets a component author introduce new
/// kinds without touching this crate, matching spec.md's "extensible by the
/// implementer" note while keeping the common case a plain enum match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalKind {
    Fired,
    Connected,
    Custom(String),
}

impl SignalKind {
    pub fn custom(name: impl Into<String>) -> Self {
        SignalKind::Custom(name.into())
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Fired => write!(f, "Fired"),
            SignalKind::Connected => write!(f, "Connected"),
            SignalKind::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// An append-only history entry for one `send` call.
#[derive(Debug, Clone)]
pub struct SignalRecord {
    pub kind: SignalKind,
    pub source_id: ComponentId,
    pub payload: Payload,
    pub at: SystemTime,
}
