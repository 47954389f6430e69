//! ms-paths: degassing-path integration for meltsat.
//!
//! Provides:
//! - The degassing-path integrator over decreasing pressure (open system,
//!   closed system, closed with a pre-existing vapor fraction)
//! - The `EquilibriumEngine` trait, the boundary to an external
//!   Gibbs-minimization solver (pressures cross that boundary in MPa;
//!   everything else in this workspace speaks bars)
//! - The engine-backed model driver with its coarse-to-fine saturation
//!   scan and isobar sweeps

pub mod degassing;
pub mod engine;
pub mod error;
pub mod magmasat;

pub use degassing::{DegassingOptions, DegassingStep, SystemKind, degassing_path};
pub use engine::{EquilibriumEngine, FLUID_PHASE, LIQUID_PHASE, Phase, PhaseAssemblage};
pub use error::{PathError, PathResult};
pub use magmasat::{EngineIsobarRow, EngineModel, EngineSearchConfig};
