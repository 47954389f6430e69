//! Error types for path integration.

use ms_chem::ChemError;
use ms_models::ModelError;
use thiserror::Error;

pub type PathResult<T> = Result<T, PathError>;

/// Errors encountered while integrating degassing paths or driving the
/// external equilibrium engine.
#[derive(Error, Debug)]
pub enum PathError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Saturation error: {what}")]
    Saturation { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Equilibrium engine error: {what}")]
    Engine { what: String },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Composition error: {0}")]
    Chem(#[from] ChemError),
}

impl PathError {
    pub fn engine(what: impl Into<String>) -> Self {
        PathError::Engine { what: what.into() }
    }
}
