//! Small dense Newton solver with finite-difference Jacobian.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};
use tracing::trace;

/// Newton solver configuration.
#[derive(Clone, Debug)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: f64,
    /// Relative tolerance for residual norm
    pub rel_tol: f64,
    /// Relative perturbation for the finite-difference Jacobian
    pub fd_step: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-8,
            rel_tol: 1e-8,
            fd_step: 1e-6,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
        }
    }
}

/// Newton iteration result.
#[derive(Debug)]
pub struct NewtonResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of iterations
    pub iterations: usize,
}

/// Newton iteration with backtracking line search and a caller-supplied
/// projection that keeps iterates inside the physical domain (positive
/// pressure, mole fractions in (0,1), ...).
///
/// The Jacobian is built by forward finite differences of `residual_fn`.
pub fn newton_solve<F, P>(
    x0: DVector<f64>,
    mut residual_fn: F,
    project: P,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: FnMut(&DVector<f64>) -> SolverResult<DVector<f64>>,
    P: Fn(&mut DVector<f64>),
{
    let mut x = x0;
    project(&mut x);
    let mut r = residual_fn(&x)?;
    let mut r_norm = r.norm();
    let r0_norm = r_norm.max(f64::MIN_POSITIVE);

    for iter in 0..config.max_iterations {
        if r_norm < config.abs_tol || r_norm < config.rel_tol * r0_norm {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
            });
        }

        let jac = finite_difference_jacobian(&x, &mut residual_fn, &r, config.fd_step)?;

        // Solve J * dx = -r
        let dx = jac
            .lu()
            .solve(&(-r.clone()))
            .ok_or_else(|| SolverError::ConvergenceFailed {
                what: format!("singular Jacobian at iteration {iter}"),
            })?;

        // Backtracking line search inside the projected domain
        let mut alpha = 1.0;
        let mut accepted = false;
        for _ in 0..config.max_line_search_iters {
            let mut x_new = &x + alpha * &dx;
            project(&mut x_new);
            let r_new = residual_fn(&x_new)?;
            let r_new_norm = r_new.norm();
            if r_new_norm.is_finite() && r_new_norm < r_norm {
                x = x_new;
                r = r_new;
                r_norm = r_new_norm;
                accepted = true;
                break;
            }
            alpha *= config.line_search_beta;
        }
        trace!(iter, residual = r_norm, alpha, "newton step");

        if !accepted {
            return Err(SolverError::ConvergenceFailed {
                what: format!("line search stagnated at iteration {iter}, residual = {r_norm}"),
            });
        }
    }

    Err(SolverError::ConvergenceFailed {
        what: format!(
            "Newton exceeded {} iterations, residual = {r_norm}",
            config.max_iterations
        ),
    })
}

/// Forward finite-difference Jacobian reusing the residual at `x`.
fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    residual_fn: &mut F,
    r0: &DVector<f64>,
    fd_step: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: FnMut(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let m = r0.len();
    let mut jac = DMatrix::zeros(m, n);
    for j in 0..n {
        let h = fd_step * x[j].abs().max(1.0);
        let mut xp = x.clone();
        xp[j] += h;
        let rp = residual_fn(&xp)?;
        for i in 0..m {
            jac[(i, j)] = (rp[i] - r0[i]) / h;
        }
    }
    Ok(jac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0, x > 0
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let x0 = DVector::from_element(1, 3.0);
        let config = NewtonConfig::default();
        let result = newton_solve(x0, residual, |_| {}, &config).unwrap();
        assert!((result.x[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn coupled_two_by_two() {
        // x + y = 3, x * y = 2  ->  (1, 2) or (2, 1)
        let residual = |v: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![
                v[0] + v[1] - 3.0,
                v[0] * v[1] - 2.0,
            ]))
        };
        let x0 = DVector::from_vec(vec![2.5, 0.7]);
        let config = NewtonConfig::default();
        let result = newton_solve(x0, residual, |_| {}, &config).unwrap();
        let (x, y) = (result.x[0], result.x[1]);
        assert!((x + y - 3.0).abs() < 1e-6);
        assert!((x * y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn projection_keeps_domain() {
        // Root at x = 0.25 with iterates clamped into (0, 1).
        let residual = |v: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, v[0].ln() + 2.0 * 2.0_f64.ln()))
        };
        let x0 = DVector::from_element(1, 0.9);
        let config = NewtonConfig::default();
        let result = newton_solve(
            x0,
            residual,
            |v| v[0] = v[0].clamp(1e-6, 1.0 - 1e-6),
            &config,
        )
        .unwrap();
        assert!((result.x[0] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn iteration_ceiling_is_an_error() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] + 1.0))
        };
        let x0 = DVector::from_element(1, 1.0);
        let config = NewtonConfig {
            max_iterations: 5,
            ..Default::default()
        };
        let err = newton_solve(x0, residual, |_| {}, &config).unwrap_err();
        assert!(matches!(err, SolverError::ConvergenceFailed { .. }));
    }
}
