//! Error taxonomy (spec.md §7). `RateLimited` and friends are expected,
//! recoverable outcomes; they are never logged by the substrate itself.

use thiserror::Error;

use crate::component::ComponentId;
use crate::position::Position;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    #[error("component id already registered: {0}")]
    DuplicateId(ComponentId),
    #[error("no such component: {0}")]
    NotFound(ComponentId),
    #[error("position is not finite: {0:?}")]
    InvalidPosition(Position),
    #[error("registry is at capacity ({0})")]
    CapacityExceeded(usize),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChemicalError {
    /// A normal biological refusal, not a fault — see spec.md §4.2/§7.
    #[error("release rejected by rate limiter")]
    RateLimited,
    #[error("unknown ligand requested")]
    UnknownLigand,
    #[error("registry unavailable")]
    RegistryUnavailable,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LifecycleError {
    #[error("no constructor registered for type tag: {0}")]
    UnknownType(String),
    #[error("component id already registered: {0}")]
    DuplicateId(ComponentId),
    #[error("component cap reached ({0})")]
    ResourceExhausted(usize),
    #[error("no such component: {0}")]
    NotFound(ComponentId),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatrixError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Chemical(#[from] ChemicalError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("operation attempted after stop()")]
    NotRunning,
    #[error("invalid argument: {0}")]
    InvalidArg(String),
}
