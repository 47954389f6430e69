//! Error types for solver operations.

use ms_core::MsError;
use thiserror::Error;

/// Errors that can occur during root finding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("No sign change bracketed for {what} in [{lo}, {hi}]")]
    BracketFailed { what: &'static str, lo: f64, hi: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Residual evaluation failed: {what}")]
    Evaluation { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for MsError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::InvalidArg { what } => MsError::InvalidArg { what },
            _ => MsError::Invariant {
                what: "numerical convergence failure",
            },
        }
    }
}
