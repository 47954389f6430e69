//! ms-chem: melt composition handling for meltsat.
//!
//! Provides:
//! - The fixed 16-oxide major-element vocabulary (`Oxide`) and the volatile
//!   subset (`Volatile`)
//! - Dense weight-percent compositions with value semantics (`Composition`)
//! - Conversions to molar oxide, cation, and single-oxygen-basis fractions
//! - Normalization strategies (standard, fixed-volatiles,
//!   additional-volatiles, anhydrous)
//!
//! Every transformation returns a new `Composition`; nothing mutates the
//! caller's data in place.

pub mod composition;
pub mod error;
pub mod oxides;

// Re-exports for ergonomics
pub use composition::{Composition, Normalization, OxideMap};
pub use error::{ChemError, ChemResult};
pub use oxides::{Oxide, Volatile};
