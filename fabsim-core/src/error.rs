//! Error types for the simulation framework

use thiserror::Error;

/// Convenience alias used across the workspace.
pub type SimResult<T> = Result<T, SimError>;

/// Top-level error type for simulation operations
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(
        "Modeling invariant violated: {message} (seed {seed}, time {time}, event #{event_index})"
    )]
    Invariant {
        message: String,
        seed: u64,
        time: f64,
        event_index: u64,
    },

    #[error("Simulation is not initialized")]
    NotInitialized,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A configuration record failed validation.
///
/// Carries enough context to name the offending record: the collection it
/// came from, its `ID`, and the reason it was rejected.
#[derive(Debug, Error)]
#[error("{record_kind} '{id}': {reason}")]
pub struct ConfigError {
    pub record_kind: &'static str,
    pub id: String,
    pub reason: String,
}

impl ConfigError {
    pub fn new(record_kind: &'static str, id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            record_kind,
            id: id.into(),
            reason: reason.into(),
        }
    }
}
