//! Error taxonomy for the simulation core

use crate::sim::EntityKind;

/// Errors raised by the simulation core
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    /// Operation called in the wrong lifecycle state
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Rejected input value
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Velocity or visual metadata missing for a kind
    #[error("{what} not configured for {kind:?}")]
    NotConfigured { what: &'static str, kind: EntityKind },

    /// Background worker thread could not be started
    #[error("failed to spawn background task: {0}")]
    Spawn(#[from] std::io::Error),
}
