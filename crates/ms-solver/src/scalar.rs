//! Scalar root finding: secant iteration with a bracketed fallback.

use crate::error::{SolverError, SolverResult};
use tracing::trace;

/// Scalar solver configuration.
#[derive(Clone, Copy, Debug)]
pub struct ScalarConfig {
    /// Maximum iterations for any single method
    pub max_iterations: usize,
    /// Absolute tolerance on |f(x)|
    pub abs_tol: f64,
    /// Relative tolerance on the step size |dx| / max(|x|, 1)
    pub step_tol: f64,
    /// Growth factor for bracket expansion
    pub bracket_growth: f64,
    /// Maximum bracket expansions
    pub max_expansions: usize,
}

impl Default for ScalarConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            abs_tol: 1e-9,
            step_tol: 1e-12,
            bracket_growth: 1.6,
            max_expansions: 60,
        }
    }
}

/// Classic two-point secant iteration.
///
/// Seeds `x0`/`x1` need not bracket the root. Fails if the iteration
/// stalls (flat secant), produces non-finite values, or exceeds the
/// iteration ceiling.
pub fn secant<F>(mut f: F, x0: f64, x1: f64, config: &ScalarConfig) -> SolverResult<f64>
where
    F: FnMut(f64) -> SolverResult<f64>,
{
    let mut a = x0;
    let mut b = x1;
    let mut fa = f(a)?;
    if fa.abs() <= config.abs_tol {
        return Ok(a);
    }
    let mut fb = f(b)?;

    for iter in 0..config.max_iterations {
        if fb.abs() <= config.abs_tol {
            return Ok(b);
        }
        let denom = fb - fa;
        if denom == 0.0 || !denom.is_finite() {
            return Err(SolverError::ConvergenceFailed {
                what: format!("secant stalled at iteration {iter} (flat residual)"),
            });
        }
        let next = b - fb * (b - a) / denom;
        if !next.is_finite() {
            return Err(SolverError::ConvergenceFailed {
                what: format!("secant produced non-finite iterate at iteration {iter}"),
            });
        }
        trace!(iter, x = next, residual = fb, "secant step");
        if (next - b).abs() <= config.step_tol * next.abs().max(1.0) {
            let fnext = f(next)?;
            if fnext.abs() <= config.abs_tol {
                return Ok(next);
            }
            return Err(SolverError::ConvergenceFailed {
                what: format!("secant step collapsed at iteration {iter} without convergence"),
            });
        }
        a = b;
        fa = fb;
        b = next;
        fb = f(b)?;
    }

    Err(SolverError::ConvergenceFailed {
        what: format!(
            "secant exceeded {} iterations, residual = {fb}",
            config.max_iterations
        ),
    })
}

/// Grow an interval geometrically around the seeds until `f` changes sign.
///
/// Returns the bracketing pair. Fails with `BracketFailed` when no sign
/// change is found within the expansion budget.
pub fn expand_bracket<F>(
    mut f: F,
    x0: f64,
    x1: f64,
    floor: Option<f64>,
    what: &'static str,
    config: &ScalarConfig,
) -> SolverResult<(f64, f64)>
where
    F: FnMut(f64) -> SolverResult<f64>,
{
    let mut lo = x0.min(x1);
    let mut hi = x0.max(x1);
    let mut flo = f(lo)?;
    let mut fhi = f(hi)?;

    for _ in 0..config.max_expansions {
        if flo == 0.0 {
            return Ok((lo, lo));
        }
        if fhi == 0.0 {
            return Ok((hi, hi));
        }
        if flo * fhi < 0.0 {
            return Ok((lo, hi));
        }
        let width = (hi - lo).max(f64::MIN_POSITIVE);
        // Push the side with the smaller |f| outward first.
        if flo.abs() < fhi.abs() {
            let mut next = lo - config.bracket_growth * width;
            if let Some(fl) = floor {
                next = next.max(fl);
            }
            if next < lo {
                lo = next;
                flo = f(lo)?;
                continue;
            }
        }
        hi += config.bracket_growth * width;
        fhi = f(hi)?;
    }

    Err(SolverError::BracketFailed {
        what,
        lo,
        hi,
    })
}

/// Bisection on a verified bracket.
pub fn bisect<F>(mut f: F, bracket: (f64, f64), config: &ScalarConfig) -> SolverResult<f64>
where
    F: FnMut(f64) -> SolverResult<f64>,
{
    let (mut lo, mut hi) = bracket;
    if lo == hi {
        return Ok(lo);
    }
    let mut flo = f(lo)?;
    if flo == 0.0 {
        return Ok(lo);
    }
    let fhi = f(hi)?;
    if fhi == 0.0 {
        return Ok(hi);
    }
    if flo * fhi > 0.0 {
        return Err(SolverError::BracketFailed {
            what: "bisection bracket",
            lo,
            hi,
        });
    }

    for _ in 0..config.max_iterations {
        let mid = 0.5 * (lo + hi);
        let fmid = f(mid)?;
        if fmid.abs() <= config.abs_tol || (hi - lo).abs() <= config.step_tol * mid.abs().max(1.0) {
            return Ok(mid);
        }
        if flo * fmid < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            flo = fmid;
        }
    }

    // The interval kept halving; the midpoint is as good as it gets.
    let mid = 0.5 * (lo + hi);
    let fmid = f(mid)?;
    if fmid.abs() <= config.abs_tol.max(1e-6) {
        return Ok(mid);
    }
    Err(SolverError::ConvergenceFailed {
        what: format!(
            "bisection exceeded {} iterations, residual = {fmid}",
            config.max_iterations
        ),
    })
}

/// Secant first (preserving the published seed pairs), bracketed bisection
/// as fallback when the secant stalls or walks out of the domain.
///
/// `floor` optionally bounds the bracket expansion from below (e.g. a
/// minimum physical pressure).
pub fn solve_scalar<F>(
    mut f: F,
    x0: f64,
    x1: f64,
    floor: Option<f64>,
    what: &'static str,
    config: &ScalarConfig,
) -> SolverResult<f64>
where
    F: FnMut(f64) -> SolverResult<f64>,
{
    match secant(&mut f, x0, x1, config) {
        Ok(root) => Ok(root),
        Err(SolverError::Evaluation { what }) => Err(SolverError::Evaluation { what }),
        Err(_) => {
            let bracket = expand_bracket(&mut f, x0, x1, floor, what, config)?;
            bisect(&mut f, bracket, config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secant_quadratic() {
        let config = ScalarConfig::default();
        let root = secant(|x| Ok(x * x - 4.0), 3.0, 5.0, &config).unwrap();
        assert!((root - 2.0).abs() < 1e-6);
    }

    #[test]
    fn secant_respects_iteration_ceiling() {
        let config = ScalarConfig {
            max_iterations: 3,
            ..Default::default()
        };
        // No real root; must error rather than loop or lie.
        let err = secant(|x| Ok(x * x + 1.0), 0.5, 1.0, &config).unwrap_err();
        assert!(matches!(err, SolverError::ConvergenceFailed { .. }));
    }

    #[test]
    fn expand_bracket_finds_sign_change() {
        let config = ScalarConfig::default();
        let (lo, hi) = expand_bracket(|x| Ok(x - 10.0), 1.0, 2.0, Some(0.0), "test", &config).unwrap();
        assert!(lo <= 10.0 && 10.0 <= hi);
    }

    #[test]
    fn bracket_failure_is_reported() {
        let config = ScalarConfig {
            max_expansions: 5,
            ..Default::default()
        };
        let err =
            expand_bracket(|x| Ok(x * x + 1.0), 0.0, 1.0, None, "no root", &config).unwrap_err();
        assert!(matches!(err, SolverError::BracketFailed { .. }));
    }

    #[test]
    fn bisect_simple_root() {
        let config = ScalarConfig::default();
        let root = bisect(|x| Ok(x.powi(3) - 8.0), (0.0, 10.0), &config).unwrap();
        assert!((root - 2.0).abs() < 1e-6);
    }

    #[test]
    fn solve_scalar_falls_back_to_bisection() {
        let config = ScalarConfig::default();
        // Flat shelf near the seeds defeats the secant; bisection recovers.
        let f = |x: f64| {
            if x < 5.0 {
                Ok(-1.0)
            } else {
                Ok(x - 6.0)
            }
        };
        let root = solve_scalar(f, 1.0, 1.5, Some(0.0), "shelf", &config).unwrap();
        assert!((root - 6.0).abs() < 1e-6);
    }

    #[test]
    fn solve_scalar_with_floor() {
        let config = ScalarConfig::default();
        // Root below the floor is unreachable: must error, not fabricate.
        let err = solve_scalar(|x| Ok(x + 5.0), 1.0, 2.0, Some(0.0), "floored", &config)
            .unwrap_err();
        assert!(matches!(
            err,
            SolverError::BracketFailed { .. } | SolverError::ConvergenceFailed { .. }
        ));
    }
}
