//! # Equilibrium solver
//!
//! ## Purpose
//! Brings a set of species to chemical equilibrium. Two Newton formulations are available.
//!
//! **Reaction extents**: the unknowns are the extents `xi_r`, concentrations follow from
//! `c_i = c0_i + sum_r S[r][i] * xi_r`. With `F_r` the product of forward-side concentrations
//! (powers `-S`) and `R_r` the product of reverse-side concentrations, the residual of reaction
//! `r` is one of
//! - `Difference`: `K*F - R`
//! - `Ratio`: `1 - R/(K*F)`
//! - `LogRatio`: `ln(R/(K*F))`, whose Jacobian `S diag(1/c) S^T` is symmetric positive
//!   definite and is solved by Cholesky
//!
//! Each step is shortened so that no concentration drops below the positivity floor. Far from
//! equilibrium the `Difference` direction can be cut to almost nothing this way; such
//! iterations take the `LogRatio` direction instead.
//!
//! **Aggregates**: the unknowns are the primary log concentrations; the residual is
//! `agg_i/target_i - 1` with secondary species given by mass action. No step control is needed
//! since every iterate maps to positive concentrations.
//!
//! ## Main Structures
//! - **`EquilibriumSolver`**: borrows an `EquilibriumReactionsParameters`, holds the configuration
//!   of both formulations and the activity model used by the aggregate one
//! - **`ExtentsConfig`** / **`AggregateConfig`**: iteration control
//! - **`AggregateSolution`**: primary and secondary log concentrations, activity coefficients
use crate::Activity::ActivityModels::{ActivityModel, ActivityModelKind};
use crate::Common::DirectSystemSolve::{solve_nxn_cholesky, solve_nxn_pivoted};
use crate::Common::NonlinearSolvers::{SolveReport, norm, validate_iteration_control};
use crate::Common::constants::MIN_CONCENTRATION;
use crate::Common::errors::ReactionsError;
use crate::Reactions::MassActions::aggregate_unchecked;
use crate::Reactions::Parameters::EquilibriumReactionsParameters;
use crate::settings::SolverSettings;
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// relative tolerance of the Jacobian symmetry check
const SYMMETRY_TOLERANCE: f64 = 1e-14;
/// largest change of `ln(gamma)` accepted at convergence of the activity-corrected solve
const ACTIVITY_TOLERANCE: f64 = 1e-10;
/// below this step scale a `Difference` iteration falls back to the `LogRatio` direction
const MIN_DIFFERENCE_STEP_SCALE: f64 = 1e-2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ResidualForm {
    Difference,
    Ratio,
    #[default]
    LogRatio,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtentsConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub residual_form: ResidualForm,
    /// smallest concentration a step may produce
    pub positivity_floor: f64,
    /// fraction of the largest admissible step actually taken
    pub safety_factor: f64,
    pub check_symmetry: bool,
    pub asymmetry_is_error: bool,
}

impl Default for ExtentsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-14,
            residual_form: ResidualForm::LogRatio,
            positivity_floor: MIN_CONCENTRATION,
            safety_factor: 0.99,
            check_symmetry: true,
            asymmetry_is_error: false,
        }
    }
}

impl ExtentsConfig {
    /// settings of the bulk generic reaction set
    pub fn bulk_generic() -> Self {
        Self {
            max_iterations: 30,
            tolerance: 1e-12,
            safety_factor: 0.9,
            ..Self::default()
        }
    }

    pub fn with_residual_form(mut self, residual_form: ResidualForm) -> Self {
        self.residual_form = residual_form;
        self
    }

    pub fn validate(&self) -> Result<(), ReactionsError> {
        validate_iteration_control("extents", self.max_iterations, self.tolerance)?;
        if !(self.safety_factor > 0.0 && self.safety_factor <= 1.0) {
            return Err(ReactionsError::InvalidConfiguration(format!(
                "extents: safety_factor must be in (0, 1], got {}",
                self.safety_factor
            )));
        }
        if !(self.positivity_floor > 0.0) {
            return Err(ReactionsError::InvalidConfiguration(format!(
                "extents: positivity_floor must be positive, got {}",
                self.positivity_floor
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            max_iterations: 150,
            tolerance: 1e-12,
        }
    }
}

impl AggregateConfig {
    pub fn validate(&self) -> Result<(), ReactionsError> {
        validate_iteration_control("aggregate", self.max_iterations, self.tolerance)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSolution {
    pub log_primary: DVector<f64>,
    pub log_secondary: DVector<f64>,
    /// `ln(gamma)` of all species at the solution, zeros for the ideal model
    pub log_activity_coefficients: DVector<f64>,
    pub report: SolveReport,
}

pub struct EquilibriumSolver<'a> {
    params: &'a EquilibriumReactionsParameters,
    pub extents: ExtentsConfig,
    pub aggregate: AggregateConfig,
    pub activity: ActivityModelKind,
}

impl<'a> EquilibriumSolver<'a> {
    pub fn new(params: &'a EquilibriumReactionsParameters) -> Self {
        Self {
            params,
            extents: ExtentsConfig::default(),
            aggregate: AggregateConfig::default(),
            activity: ActivityModelKind::default(),
        }
    }

    pub fn from_settings(
        params: &'a EquilibriumReactionsParameters,
        settings: &SolverSettings,
    ) -> Result<Self, ReactionsError> {
        settings.validate()?;
        Ok(Self {
            params,
            extents: settings.extents.clone(),
            aggregate: settings.aggregate.clone(),
            activity: ActivityModelKind::default(),
        })
    }

    pub fn with_extents_config(mut self, extents: ExtentsConfig) -> Self {
        self.extents = extents;
        self
    }

    pub fn with_aggregate_config(mut self, aggregate: AggregateConfig) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn with_activity_model(mut self, activity: impl Into<ActivityModelKind>) -> Self {
        self.activity = activity.into();
        self
    }

    pub fn params(&self) -> &EquilibriumReactionsParameters {
        self.params
    }

    ////////////////////////////////REACTION EXTENTS////////////////////////////////

    /// `c0 + S^T xi`, not floored
    fn concentration_from_extents(&self, c0: &DVector<f64>, xi: &DVector<f64>) -> DVector<f64> {
        c0 + self.params.stoichiometric_matrix().tr_mul(xi)
    }

    /// Residual and Jacobian (w.r.t. the extents) of the selected residual form. Concentrations
    /// are clamped to the positivity floor before the products are formed.
    pub fn compute_residual_and_jacobian_reaction_extents(
        &self,
        c0: &DVector<f64>,
        xi: &DVector<f64>,
    ) -> Result<(DVector<f64>, DMatrix<f64>), ReactionsError> {
        self.extent_system(c0, xi, self.extents.residual_form)
    }

    fn extent_system(
        &self,
        c0: &DVector<f64>,
        xi: &DVector<f64>,
        residual_form: ResidualForm,
    ) -> Result<(DVector<f64>, DMatrix<f64>), ReactionsError> {
        let n_species = self.params.num_species();
        let n_reactions = self.params.num_reactions();
        if c0.len() != n_species || xi.len() != n_reactions {
            return Err(ReactionsError::DimensionMismatch(format!(
                "extents: {} concentrations and {} extents given for {} species and {} reactions",
                c0.len(),
                xi.len(),
                n_species,
                n_reactions
            )));
        }
        let floor = self.extents.positivity_floor;
        let c = self
            .concentration_from_extents(c0, xi)
            .map(|ci| ci.max(floor));
        let s = self.params.stoichiometric_matrix();

        let mut residual = DVector::zeros(n_reactions);
        let mut jacobian = DMatrix::zeros(n_reactions, n_reactions);
        let mut d_forward = vec![0.0; n_reactions];
        let mut d_reverse = vec![0.0; n_reactions];
        for a in 0..n_reactions {
            let k = self.params.equilibrium_constant(a);
            let mut forward_product = 1.0;
            let mut reverse_product = 1.0;
            d_forward.iter_mut().for_each(|d| *d = 0.0);
            d_reverse.iter_mut().for_each(|d| *d = 0.0);
            for i in 0..n_species {
                let s_ai = s[(a, i)];
                if s_ai < 0.0 {
                    forward_product *= c[i].powf(-s_ai);
                    for b in 0..n_reactions {
                        d_forward[b] += -s_ai / c[i] * s[(b, i)];
                    }
                } else if s_ai > 0.0 {
                    reverse_product *= c[i].powf(s_ai);
                    for b in 0..n_reactions {
                        d_reverse[b] += s_ai / c[i] * s[(b, i)];
                    }
                }
            }

            match residual_form {
                ResidualForm::Difference => {
                    let k_forward = k * forward_product;
                    residual[a] = k_forward - reverse_product;
                    for b in 0..n_reactions {
                        jacobian[(a, b)] = k_forward * d_forward[b] - reverse_product * d_reverse[b];
                    }
                }
                ResidualForm::Ratio => {
                    let ratio = reverse_product / (k * forward_product);
                    residual[a] = 1.0 - ratio;
                    for b in 0..n_reactions {
                        jacobian[(a, b)] = -ratio * (d_reverse[b] - d_forward[b]);
                    }
                }
                ResidualForm::LogRatio => {
                    residual[a] = (reverse_product / (forward_product * k)).ln();
                    for b in 0..n_reactions {
                        jacobian[(a, b)] = d_reverse[b] - d_forward[b];
                    }
                }
            }
        }
        Ok((residual, jacobian))
    }

    fn check_symmetry(&self, jacobian: &DMatrix<f64>) -> Result<(), ReactionsError> {
        let n = jacobian.nrows();
        for i in 0..n {
            for j in (i + 1)..n {
                let value = jacobian[(i, j)];
                let transposed = jacobian[(j, i)];
                if (value - transposed).abs() > 0.5 * (value + transposed).abs() * SYMMETRY_TOLERANCE
                {
                    warn!(
                        "extent jacobian not symmetric: J[{}][{}] = {:e}, J[{}][{}] = {:e}",
                        i, j, value, j, i, transposed
                    );
                    if self.extents.asymmetry_is_error {
                        return Err(ReactionsError::AsymmetricJacobian {
                            row: i,
                            col: j,
                            value,
                            transposed,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// largest step fraction keeping every concentration above the floor, with safety margin
    fn step_scale(&self, c_n: &DVector<f64>, dc: &DVector<f64>) -> f64 {
        let floor = self.extents.positivity_floor;
        let mut scale = 1.0;
        for (cn, dc) in c_n.iter().zip(dc.iter()) {
            if cn + dc < floor {
                let fscale = ((floor - cn) / dc).max(0.0);
                if fscale < scale {
                    scale = self.extents.safety_factor * fscale;
                }
            }
        }
        scale
    }

    /// Newton step of the `LogRatio` system, solved by Cholesky
    fn log_ratio_step(
        &self,
        jacobian: &DMatrix<f64>,
        residual: &DVector<f64>,
    ) -> Result<DVector<f64>, ReactionsError> {
        if self.extents.check_symmetry {
            self.check_symmetry(jacobian)?;
        }
        solve_nxn_cholesky(jacobian, &(-residual))
    }

    /// Equilibrates `c0` by Newton iteration on the reaction extents, starting from `xi = 0`.
    ///
    /// With the `Difference` form, an iteration whose step scale falls below
    /// `MIN_DIFFERENCE_STEP_SCALE` takes the `LogRatio` direction instead. Convergence is always
    /// judged on the selected residual form.
    ///
    /// Returns the concentrations `c0 + S^T xi` (clamped to the floor) and the solve report.
    pub fn enforce_equilibrium_extents(
        &self,
        c0: &DVector<f64>,
    ) -> Result<(DVector<f64>, SolveReport), ReactionsError> {
        self.extents.validate()?;
        let n_reactions = self.params.num_reactions();
        let mut xi = DVector::zeros(n_reactions);

        for iter in 0..self.extents.max_iterations {
            let (residual, jacobian) = self.compute_residual_and_jacobian_reaction_extents(c0, &xi)?;
            let residual_norm = norm(&residual);
            debug!("--Iter {}: extents residual norm = {:.10e}", iter, residual_norm);
            if residual_norm < self.extents.tolerance {
                info!("extent equilibrium converged in {} iterations", iter);
                let c = self.floored_concentration(c0, &xi);
                return Ok((c, SolveReport::converged(iter, residual_norm)));
            }

            let mut dxi = match self.extents.residual_form {
                ResidualForm::LogRatio => self.log_ratio_step(&jacobian, &residual)?,
                ResidualForm::Difference | ResidualForm::Ratio => {
                    solve_nxn_pivoted(&jacobian, &(-&residual))?
                }
            };

            let c_n = self.concentration_from_extents(c0, &xi);
            let s = self.params.stoichiometric_matrix();
            let mut scale = self.step_scale(&c_n, &s.tr_mul(&dxi));
            if self.extents.residual_form == ResidualForm::Difference
                && scale < MIN_DIFFERENCE_STEP_SCALE
            {
                debug!(
                    "--Iter {}: difference step scale {:.3e}, taking the log-ratio direction",
                    iter, scale
                );
                let (log_residual, log_jacobian) =
                    self.extent_system(c0, &xi, ResidualForm::LogRatio)?;
                dxi = self.log_ratio_step(&log_jacobian, &log_residual)?;
                scale = self.step_scale(&c_n, &s.tr_mul(&dxi));
            }
            xi.axpy(scale, &dxi, 1.0);
        }

        // the last update has not been checked yet
        let max_iterations = self.extents.max_iterations;
        let (residual, _) = self.compute_residual_and_jacobian_reaction_extents(c0, &xi)?;
        let residual_norm = norm(&residual);
        let c = self.floored_concentration(c0, &xi);
        if residual_norm < self.extents.tolerance {
            info!("extent equilibrium converged in {} iterations", max_iterations);
            return Ok((c, SolveReport::converged(max_iterations, residual_norm)));
        }
        warn!(
            "extent equilibrium: max iterations ({}) reached, residual norm = {:.6e}",
            max_iterations, residual_norm
        );
        Ok((c, SolveReport::not_converged(max_iterations, residual_norm)))
    }

    fn floored_concentration(&self, c0: &DVector<f64>, xi: &DVector<f64>) -> DVector<f64> {
        let floor = self.extents.positivity_floor;
        self.concentration_from_extents(c0, xi).map(|ci| ci.max(floor))
    }

    ////////////////////////////////AGGREGATES////////////////////////////////

    fn check_aggregate_inputs(
        &self,
        target: &DVector<f64>,
        log_primary: &DVector<f64>,
    ) -> Result<(), ReactionsError> {
        self.params.verify_secondary_species_structure()?;
        let n_prim = self.params.num_primary_species();
        if target.len() != n_prim || log_primary.len() != n_prim {
            return Err(ReactionsError::DimensionMismatch(format!(
                "aggregate: {} targets and {} log concentrations given for {} primary species",
                target.len(),
                log_primary.len(),
                n_prim
            )));
        }
        if let Some(index) = target.iter().position(|t| !(*t > 0.0)) {
            return Err(ReactionsError::NonPositiveConcentration {
                index,
                value: target[index],
            });
        }
        Ok(())
    }

    /// `r_i = agg_i/target_i - 1` and `J_ij = -d(agg_i)/d(ln c_j) / target_i`. The Newton
    /// update with this sign convention is `J dx = r`, `x += dx`.
    pub fn compute_residual_and_jacobian_aggregate(
        &self,
        target: &DVector<f64>,
        log_primary: &DVector<f64>,
        log_gamma: Option<&DVector<f64>>,
    ) -> Result<(DVector<f64>, DMatrix<f64>), ReactionsError> {
        self.check_aggregate_inputs(target, log_primary)?;
        if let Some(g) = log_gamma {
            if g.len() != self.params.num_species() {
                return Err(ReactionsError::DimensionMismatch(format!(
                    "{} activity coefficients given for {} species",
                    g.len(),
                    self.params.num_species()
                )));
            }
        }
        Ok(self.aggregate_residual(target, log_primary, log_gamma))
    }

    fn aggregate_residual(
        &self,
        target: &DVector<f64>,
        log_primary: &DVector<f64>,
        log_gamma: Option<&DVector<f64>>,
    ) -> (DVector<f64>, DMatrix<f64>) {
        let speciation = aggregate_unchecked(self.params, log_primary, log_gamma);
        let n = target.len();
        let residual = DVector::from_fn(n, |i, _| speciation.aggregate[i] / target[i] - 1.0);
        let jacobian = DMatrix::from_fn(n, n, |i, j| {
            -speciation.d_aggregate_d_log_primary[(i, j)] / target[i]
        });
        (residual, jacobian)
    }

    /// all species concentrations (secondary first) for the activity model
    fn species_concentration(
        &self,
        log_primary: &DVector<f64>,
        log_gamma: Option<&DVector<f64>>,
    ) -> DVector<f64> {
        let speciation = aggregate_unchecked(self.params, log_primary, log_gamma);
        let n_sec = self.params.num_secondary_species();
        DVector::from_fn(self.params.num_species(), |i, _| {
            if i < n_sec {
                speciation.log_secondary[i].exp()
            } else {
                log_primary[i - n_sec].exp()
            }
        })
    }

    /// Solves for primary log concentrations whose aggregates match `target`, starting from
    /// `log_primary0`. With a non-ideal activity model `ln(gamma)` is re-evaluated at every
    /// iterate and held fixed within the iteration.
    pub fn enforce_equilibrium_aggregate(
        &self,
        temperature: f64,
        target: &DVector<f64>,
        log_primary0: &DVector<f64>,
    ) -> Result<AggregateSolution, ReactionsError> {
        self.aggregate.validate()?;
        self.check_aggregate_inputs(target, log_primary0)?;
        let n_species = self.params.num_species();

        if self.params.num_secondary_species() == 0 {
            let log_primary = target.map(f64::ln);
            let log_gamma = if self.activity.is_ideal() {
                DVector::zeros(n_species)
            } else {
                self.activity
                    .log_activity_coefficients(temperature, &log_primary.map(f64::exp))?
            };
            return Ok(AggregateSolution {
                log_primary,
                log_secondary: DVector::zeros(0),
                log_activity_coefficients: log_gamma,
                report: SolveReport::converged(0, 0.0),
            });
        }

        let ideal = self.activity.is_ideal();
        let max_iterations = self.aggregate.max_iterations;
        let mut x = log_primary0.clone();
        let mut log_gamma = DVector::zeros(n_species);
        let mut iter = 0;

        // one evaluation more than updates, so that the last update is checked too
        let report = loop {
            let mut gamma_change = 0.0;
            if !ideal {
                let c = self.species_concentration(&x, Some(&log_gamma));
                let new_log_gamma = self.activity.log_activity_coefficients(temperature, &c)?;
                gamma_change = (&new_log_gamma - &log_gamma).amax();
                log_gamma = new_log_gamma;
            }
            let gamma = if ideal { None } else { Some(&log_gamma) };
            let (residual, jacobian) = self.aggregate_residual(target, &x, gamma);
            let residual_norm = norm(&residual);
            debug!(
                "--Iter {}: aggregate residual norm = {:.10e}",
                iter, residual_norm
            );
            if residual_norm < self.aggregate.tolerance && gamma_change < ACTIVITY_TOLERANCE {
                info!("aggregate equilibrium converged in {} iterations", iter);
                break SolveReport::converged(iter, residual_norm);
            }
            if iter == max_iterations {
                warn!(
                    "aggregate equilibrium: max iterations ({}) reached, residual norm = {:.6e}",
                    max_iterations, residual_norm
                );
                break SolveReport::not_converged(max_iterations, residual_norm);
            }
            let dx = solve_nxn_pivoted(&jacobian, &residual)?;
            x += dx;
            iter += 1;
        };

        let gamma = if ideal { None } else { Some(&log_gamma) };
        let log_secondary = aggregate_unchecked(self.params, &x, gamma).log_secondary;
        Ok(AggregateSolution {
            log_primary: x,
            log_secondary,
            log_activity_coefficients: log_gamma,
            report,
        })
    }

    /// Aggregate solve with the target taken from the starting point: `target = exp(log_primary0)`.
    pub fn enforce_equilibrium_log_aggregate(
        &self,
        temperature: f64,
        log_primary0: &DVector<f64>,
    ) -> Result<AggregateSolution, ReactionsError> {
        let target = log_primary0.map(f64::exp);
        self.enforce_equilibrium_aggregate(temperature, &target, log_primary0)
    }
}
