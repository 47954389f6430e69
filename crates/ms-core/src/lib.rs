//! ms-core: stable foundation for meltsat.
//!
//! Contains:
//! - units (uom quantity aliases + constructors for bars/MPa/K/°C)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{MsError, MsResult};
pub use numeric::*;
pub use units::*;
