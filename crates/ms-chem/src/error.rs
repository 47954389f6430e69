//! Composition errors.

use ms_core::MsError;
use thiserror::Error;

/// Result type for composition operations.
pub type ChemResult<T> = Result<T, ChemError>;

/// Errors that can occur while building or transforming compositions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChemError {
    /// Non-physical values (negative or non-finite weight percent).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Unknown oxide symbol.
    #[error("Unknown oxide: {symbol}")]
    UnknownOxide { symbol: String },
}

impl From<ChemError> for MsError {
    fn from(err: ChemError) -> Self {
        match err {
            ChemError::NonPhysical { what } => MsError::Invariant { what },
            ChemError::InvalidArg { what } => MsError::InvalidArg { what },
            ChemError::UnknownOxide { .. } => MsError::InvalidArg {
                what: "unknown oxide symbol",
            },
        }
    }
}
