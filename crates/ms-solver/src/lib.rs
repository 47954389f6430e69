//! ms-solver: root finding for meltsat.
//!
//! Two layers:
//! - scalar: secant iteration with an expanding-bracket bisection fallback,
//!   used for saturation-pressure inversion, EOS molar volume, and
//!   speciation equilibria
//! - newton: small dense Newton with finite-difference Jacobian, used for
//!   the joint (pressure, fluid-composition) saturation solve
//!
//! Every solver carries an explicit iteration ceiling; exceeding it is an
//! error, never a silent wrong answer.

pub mod error;
pub mod newton;
pub mod scalar;

pub use error::{SolverError, SolverResult};
pub use newton::{NewtonConfig, NewtonResult, newton_solve};
pub use scalar::{ScalarConfig, bisect, expand_bracket, secant, solve_scalar};
