//! # Newton-Raphson driver
//!
//! ## Purpose
//! Full (undamped) Newton iteration over a caller-supplied closure that fills the residual
//! and the Jacobian at the current iterate. The linear step goes through the pivoted
//! Gaussian elimination of `DirectSystemSolve`.
//!
//! ## Main Structures
//! - **`NewtonConfig`**: iteration cap, tolerance and the optional linear-system dump
//! - **`NewtonStatus`** / **`SolveReport`**: the status returned by every iterative solver of
//!   the crate. Reaching the iteration cap is reported here and is never an `Err`; the
//!   iterate is left at the last state reached.
use crate::Common::DirectSystemSolve::solve_nxn_pivoted;
use crate::Common::errors::ReactionsError;
use crate::Common::printers::print_linear_system;
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// terminal state of an iterative solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewtonStatus {
    Converged,
    MaxIterationsReached,
}

/// outcome of one iterative solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    pub status: NewtonStatus,
    /// number of updates applied to the unknowns
    pub iterations: usize,
    /// 2-norm of the last residual evaluated
    pub residual_norm: f64,
}

impl SolveReport {
    pub fn converged(iterations: usize, residual_norm: f64) -> Self {
        Self {
            status: NewtonStatus::Converged,
            iterations,
            residual_norm,
        }
    }

    pub fn not_converged(iterations: usize, residual_norm: f64) -> Self {
        Self {
            status: NewtonStatus::MaxIterationsReached,
            iterations,
            residual_norm,
        }
    }

    pub fn is_converged(&self) -> bool {
        self.status == NewtonStatus::Converged
    }
}

/// Settings of the generic Newton driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewtonConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
    /// print Jacobian, right-hand side and update of every iteration
    pub print_linear_system: bool,
}

impl NewtonConfig {
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
            print_linear_system: false,
        }
    }

    pub fn validate(&self) -> Result<(), ReactionsError> {
        validate_iteration_control("newton", self.max_iterations, self.tolerance)
    }
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self::new(12, 1e-10)
    }
}

/// shared check for every `max_iterations`/`tolerance` pair of the crate
pub(crate) fn validate_iteration_control(
    owner: &str,
    max_iterations: usize,
    tolerance: f64,
) -> Result<(), ReactionsError> {
    if max_iterations == 0 {
        return Err(ReactionsError::InvalidConfiguration(format!(
            "{}: max_iterations must be at least 1",
            owner
        )));
    }
    if !(tolerance > 0.0) || !tolerance.is_finite() {
        return Err(ReactionsError::InvalidConfiguration(format!(
            "{}: tolerance must be positive and finite, got {}",
            owner, tolerance
        )));
    }
    Ok(())
}

pub fn norm(v: &DVector<f64>) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Newton-Raphson iteration on `x`.
///
/// `compute_residual_and_jacobian(x, residual, jacobian)` fills `r(x)` and `dr/dx`. The loop
/// stops when `|r| < tolerance`; otherwise it solves `J dx = -r` and applies the full step.
/// At most `max_iterations` updates are applied, and the point after the last one is checked.
pub fn newton_raphson<F>(
    x: &mut DVector<f64>,
    mut compute_residual_and_jacobian: F,
    config: &NewtonConfig,
) -> Result<SolveReport, ReactionsError>
where
    F: FnMut(&DVector<f64>, &mut DVector<f64>, &mut DMatrix<f64>) -> Result<(), ReactionsError>,
{
    config.validate()?;
    let n = x.len();
    let mut residual = DVector::zeros(n);
    let mut jacobian = DMatrix::zeros(n, n);
    let mut iter = 0;

    // the residual is evaluated once more than the update count, so a root reached by the last
    // permitted update is reported as converged
    loop {
        compute_residual_and_jacobian(x, &mut residual, &mut jacobian)?;
        let residual_norm = norm(&residual);
        debug!("--Iter {}: residual norm = {:.12e}", iter, residual_norm);
        if residual_norm < config.tolerance {
            info!("Newton converged in {} iterations", iter);
            return Ok(SolveReport::converged(iter, residual_norm));
        }
        if iter == config.max_iterations {
            warn!(
                "Newton solver: max iterations ({}) reached without convergence, residual norm = {:.6e}",
                config.max_iterations, residual_norm
            );
            return Ok(SolveReport::not_converged(iter, residual_norm));
        }
        residual.scale_mut(-1.0);
        let dx = solve_nxn_pivoted(&jacobian, &residual)?;
        if config.print_linear_system {
            print_linear_system(&jacobian, &residual, &dx);
        }
        *x += dx;
        iter += 1;
    }
}
