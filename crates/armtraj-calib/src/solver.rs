//! Levenberg–Marquardt nonlinear least squares.
//!
//! Minimizes `½‖r(x)‖²` for a residual function `r`. The Jacobian is taken
//! by central differences, and each step solves the damped normal equations
//! `(JᵀJ + λ·diag(JᵀJ)) δ = −Jᵀr` with a Cholesky factorization.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::{CalibrationError, Result};

/// Solver parameters.
#[derive(Debug, Clone)]
pub struct LmConfig {
    /// Maximum number of outer iterations.
    pub max_iterations: usize,
    /// Initial damping factor λ.
    pub initial_damping: f64,
    /// Stop when the largest gradient component falls below this.
    pub gradient_tolerance: f64,
    /// Stop when a step is smaller than this, relative to `‖x‖ + 1`.
    pub step_tolerance: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            initial_damping: 1e-3,
            gradient_tolerance: 1e-10,
            step_tolerance: 1e-12,
        }
    }
}

/// Outcome of a converged solve.
#[derive(Debug, Clone)]
pub struct LmReport {
    /// Parameters at the minimum.
    pub solution: DVector<f64>,
    /// `½‖r‖²` at the solution.
    pub cost: f64,
    /// Outer iterations performed.
    pub iterations: usize,
}

const MAX_DAMPING: f64 = 1e16;

fn cost_of(r: &DVector<f64>) -> f64 {
    0.5 * r.norm_squared()
}

/// Central-difference Jacobian of `f` at `x`.
fn numeric_jacobian<F>(f: &F, x: &DVector<f64>, rows: usize) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let mut jac = DMatrix::zeros(rows, x.len());
    for j in 0..x.len() {
        let h = 1e-6 * x[j].abs().max(1.0);
        let mut forward = x.clone();
        let mut backward = x.clone();
        forward[j] += h;
        backward[j] -= h;
        let column = (f(&forward) - f(&backward)) / (2.0 * h);
        jac.set_column(j, &column);
    }
    jac
}

/// Minimize `½‖residuals(x)‖²` starting from `initial`.
pub fn minimize<F>(residuals: F, initial: DVector<f64>, config: &LmConfig) -> Result<LmReport>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let mut x = initial;
    let mut r = residuals(&x);
    let mut cost = cost_of(&r);
    let mut lambda = config.initial_damping;

    for iteration in 1..=config.max_iterations {
        let jac = numeric_jacobian(&residuals, &x, r.len());
        let gradient = jac.transpose() * &r;
        if gradient.amax() < config.gradient_tolerance {
            debug!(iteration, cost, "gradient below tolerance");
            return Ok(LmReport {
                solution: x,
                cost,
                iterations: iteration,
            });
        }

        let normal = jac.transpose() * &jac;
        let accepted = loop {
            if lambda > MAX_DAMPING {
                break None;
            }
            let mut damped = normal.clone();
            for i in 0..damped.nrows() {
                damped[(i, i)] += lambda * normal[(i, i)].max(1e-12);
            }
            let Some(cholesky) = damped.cholesky() else {
                lambda *= 10.0;
                continue;
            };
            let step = cholesky.solve(&(-&gradient));
            let candidate = &x + &step;
            let candidate_r = residuals(&candidate);
            let candidate_cost = cost_of(&candidate_r);
            if candidate_cost < cost {
                lambda = (lambda / 10.0).max(1e-15);
                break Some((step, candidate, candidate_r, candidate_cost));
            }
            lambda *= 10.0;
        };

        let Some((step, candidate, candidate_r, candidate_cost)) = accepted else {
            // No damping level reduces the cost: x is already a minimum.
            debug!(iteration, cost, "no descent step left");
            return Ok(LmReport {
                solution: x,
                cost,
                iterations: iteration,
            });
        };

        let small_step = step.norm() < config.step_tolerance * (x.norm() + 1.0);
        x = candidate;
        r = candidate_r;
        cost = candidate_cost;
        if small_step {
            debug!(iteration, cost, "step below tolerance");
            return Ok(LmReport {
                solution: x,
                cost,
                iterations: iteration,
            });
        }
    }

    Err(CalibrationError::NoConvergence {
        iterations: config.max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_fit() {
        // y = 2x + 1 sampled exactly.
        let xs = [0.0, 1.0, 2.0, 3.0];
        let residuals = |p: &DVector<f64>| {
            DVector::from_iterator(xs.len(), xs.iter().map(|x| p[0] * x + p[1] - (2.0 * x + 1.0)))
        };
        let report = minimize(residuals, DVector::from_vec(vec![0.0, 0.0]), &LmConfig::default()).unwrap();
        assert!((report.solution[0] - 2.0).abs() < 1e-6);
        assert!((report.solution[1] - 1.0).abs() < 1e-6);
        assert!(report.cost < 1e-12);
    }

    #[test]
    fn test_rosenbrock() {
        let residuals = |p: &DVector<f64>| {
            DVector::from_vec(vec![10.0 * (p[1] - p[0] * p[0]), 1.0 - p[0]])
        };
        let report = minimize(residuals, DVector::from_vec(vec![-1.2, 1.0]), &LmConfig::default()).unwrap();
        assert!((report.solution[0] - 1.0).abs() < 1e-5);
        assert!((report.solution[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_iteration_limit() {
        let residuals = |p: &DVector<f64>| {
            DVector::from_vec(vec![10.0 * (p[1] - p[0] * p[0]), 1.0 - p[0]])
        };
        let config = LmConfig {
            max_iterations: 1,
            ..Default::default()
        };
        assert_eq!(
            minimize(residuals, DVector::from_vec(vec![-1.2, 1.0]), &config).unwrap_err(),
            CalibrationError::NoConvergence { iterations: 1 }
        );
    }
}
