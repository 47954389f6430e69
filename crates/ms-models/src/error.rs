//! Error types for solubility modeling.

use ms_chem::ChemError;
use ms_solver::SolverError;
use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by solubility laws and the mixed-fluid coordinator.
///
/// Calibration-range violations are deliberately not here: they are
/// advisory report data, not failures.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Malformed input: bad fluid fractions, wrong species count,
    /// mutually exclusive options, unknown model name.
    #[error("Input error: {what}")]
    Input { what: String },

    /// The sample cannot reach fluid saturation inside the search domain.
    #[error("Saturation error: {what}")]
    Saturation { what: String },

    /// An internal root-find exhausted its iteration or bracket budget.
    #[error("Numerical convergence error: {0}")]
    Convergence(#[from] SolverError),

    /// Composition handling failed.
    #[error("Composition error: {0}")]
    Chem(#[from] ChemError),
}

impl ModelError {
    pub fn input(what: impl Into<String>) -> Self {
        ModelError::Input { what: what.into() }
    }

    pub fn saturation(what: impl Into<String>) -> Self {
        ModelError::Saturation { what: what.into() }
    }
}
