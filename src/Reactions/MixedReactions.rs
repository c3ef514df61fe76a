//! # Mixed equilibrium-kinetic reactions
//!
//! ## Purpose
//! Couples the fast (equilibrium) and slow (kinetic) parts of a reaction system in one
//! fully implicit solve per time step. The unknowns are the primary log concentrations;
//! secondary species follow from mass action, and the kinetic reactions act on the aggregate
//! concentrations:
//! ```text
//! (agg(ln c) - agg_n) - aggRate(ln c) * dt = 0
//! ```
//! Kinetic reactions may involve secondary species. Their rates are differentiated through the
//! mass action law (`d ln c_sec_k / d ln c_j = S_eq[k][n_sec + j]`), and their contribution to
//! aggregate `i` uses the effective coefficient
//! `S_kin[r][n_sec + i] + sum_k S_kin[r][k] * S_eq[k][n_sec + i]`.
//!
//! ## Main Structures
//! - **`MixedReactionsSolver`**: owns the two sub-systems and the step configuration
//! - **`MixedSystemState`**: everything `update_mixed_system` evaluates at one state
//! - **`MixedRun`**: result of `advance`
use crate::Common::NonlinearSolvers::{NewtonConfig, SolveReport, newton_raphson};
use crate::Common::errors::ReactionsError;
use crate::Reactions::EquilibriumReactions::{AggregateConfig, EquilibriumSolver};
use crate::Reactions::KineticReactions::{RateLaw, reaction_rate};
use crate::Reactions::MassActions::calculate_total_and_mobile_aggregate_primary_concentrations_wrt_log_c;
use crate::Reactions::Parameters::{
    EquilibriumReactionsParameters, KineticReactionsParameters, ReactionsParameters,
};
use crate::settings::SolverSettings;
use log::{info, warn};
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone, PartialEq)]
pub struct MixedSystemState {
    pub log_secondary: DVector<f64>,
    pub aggregate: DVector<f64>,
    pub d_aggregate_d_log_primary: DMatrix<f64>,
    pub mobile_aggregate: DVector<f64>,
    pub d_mobile_aggregate_d_log_primary: DMatrix<f64>,
    pub reaction_rates: DVector<f64>,
    /// `[r][j] = d(rate_r)/d(ln c_primary_j)`, secondary dependence included
    pub d_reaction_rates_d_log_primary: DMatrix<f64>,
    pub aggregate_rates: DVector<f64>,
    pub d_aggregate_rates_d_log_primary: DMatrix<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MixedRun {
    pub log_primary: DVector<f64>,
    pub log_secondary: DVector<f64>,
    pub aggregate: DVector<f64>,
    /// report of the initial equilibration
    pub equilibrium_report: SolveReport,
    /// one report per time step
    pub reports: Vec<SolveReport>,
    pub time: f64,
}

pub struct MixedReactionsSolver {
    equilibrium: EquilibriumReactionsParameters,
    kinetic: KineticReactionsParameters,
    /// `[r][i]`: change of aggregate `i` per unit extent of kinetic reaction `r`
    effective_stoichiometry: DMatrix<f64>,
    pub rate_law: RateLaw,
    pub surface_area: DVector<f64>,
    pub newton: NewtonConfig,
    pub aggregate: AggregateConfig,
}

impl MixedReactionsSolver {
    pub fn new(params: &ReactionsParameters) -> Result<Self, ReactionsError> {
        let equilibrium = params.equilibrium_reactions_parameters();
        equilibrium.verify_secondary_species_structure()?;
        let kinetic = params.kinetic_reactions_parameters();
        let n_sec = params.num_secondary_species();
        let n_prim = params.num_primary_species();
        let n_kin = kinetic.num_reactions();

        let effective_stoichiometry = DMatrix::from_fn(n_kin, n_prim, |r, i| {
            let through_secondary: f64 = (0..n_sec)
                .map(|k| {
                    kinetic.stoichiometric_coefficient(r, k)
                        * equilibrium.stoichiometric_coefficient(k, n_sec + i)
                })
                .sum();
            kinetic.stoichiometric_coefficient(r, n_sec + i) + through_secondary
        });

        Ok(Self {
            equilibrium,
            kinetic,
            effective_stoichiometry,
            rate_law: RateLaw::default(),
            surface_area: DVector::from_element(n_kin, 1.0),
            newton: NewtonConfig::default(),
            aggregate: AggregateConfig::default(),
        })
    }

    pub fn from_settings(
        params: &ReactionsParameters,
        settings: &SolverSettings,
    ) -> Result<Self, ReactionsError> {
        settings.validate()?;
        let mut solver = Self::new(params)?;
        solver.rate_law = settings.rate_law;
        solver.newton = settings.newton.clone();
        solver.aggregate = settings.aggregate.clone();
        Ok(solver)
    }

    pub fn with_rate_law(mut self, rate_law: RateLaw) -> Self {
        self.rate_law = rate_law;
        self
    }

    pub fn with_surface_area(mut self, surface_area: DVector<f64>) -> Result<Self, ReactionsError> {
        if surface_area.len() != self.kinetic.num_reactions() {
            return Err(ReactionsError::DimensionMismatch(format!(
                "{} surface areas given for {} kinetic reactions",
                surface_area.len(),
                self.kinetic.num_reactions()
            )));
        }
        self.surface_area = surface_area;
        Ok(self)
    }

    pub fn with_newton_config(mut self, newton: NewtonConfig) -> Self {
        self.newton = newton;
        self
    }

    pub fn equilibrium_parameters(&self) -> &EquilibriumReactionsParameters {
        &self.equilibrium
    }

    pub fn effective_stoichiometry(&self) -> &DMatrix<f64> {
        &self.effective_stoichiometry
    }

    /// Speciation, aggregates, kinetic rates and aggregate rates at `log_primary`, with their
    /// derivatives w.r.t. the primary log concentrations.
    pub fn update_mixed_system(
        &self,
        temperature: f64,
        log_primary: &DVector<f64>,
    ) -> Result<MixedSystemState, ReactionsError> {
        let speciation = calculate_total_and_mobile_aggregate_primary_concentrations_wrt_log_c(
            &self.equilibrium,
            log_primary,
        )?;
        let n_sec = self.equilibrium.num_secondary_species();
        let n_prim = self.equilibrium.num_primary_species();
        let n_species = n_sec + n_prim;
        let n_kin = self.kinetic.num_reactions();

        let log_species = DVector::from_fn(n_species, |i, _| {
            if i < n_sec {
                speciation.log_secondary[i]
            } else {
                log_primary[i - n_sec]
            }
        });

        let mut reaction_rates = DVector::zeros(n_kin);
        let mut d_rates = DMatrix::zeros(n_kin, n_prim);
        let mut row = vec![0.0; n_species];
        for r in 0..n_kin {
            reaction_rates[r] = reaction_rate(
                &self.kinetic,
                self.rate_law,
                r,
                temperature,
                self.surface_area[r],
                &log_species,
                &mut row,
            );
            for j in 0..n_prim {
                let mut d = row[n_sec + j];
                for (k, d_rate_d_secondary) in row.iter().take(n_sec).enumerate() {
                    d += d_rate_d_secondary * self.equilibrium.stoichiometric_coefficient(k, n_sec + j);
                }
                d_rates[(r, j)] = d;
            }
        }

        let aggregate_rates = self.effective_stoichiometry.tr_mul(&reaction_rates);
        let d_aggregate_rates = self.effective_stoichiometry.tr_mul(&d_rates);

        Ok(MixedSystemState {
            log_secondary: speciation.log_secondary,
            aggregate: speciation.total,
            d_aggregate_d_log_primary: speciation.d_total_d_log_primary,
            mobile_aggregate: speciation.mobile,
            d_mobile_aggregate_d_log_primary: speciation.d_mobile_d_log_primary,
            reaction_rates,
            d_reaction_rates_d_log_primary: d_rates,
            aggregate_rates,
            d_aggregate_rates_d_log_primary: d_aggregate_rates,
        })
    }

    /// One implicit step of length `dt`; `log_primary` enters as the initial guess and leaves
    /// as the new state.
    pub fn step(
        &self,
        temperature: f64,
        dt: f64,
        log_primary: &mut DVector<f64>,
        aggregate_n: &DVector<f64>,
    ) -> Result<SolveReport, ReactionsError> {
        if aggregate_n.len() != self.equilibrium.num_primary_species() {
            return Err(ReactionsError::DimensionMismatch(format!(
                "{} aggregates given for {} primary species",
                aggregate_n.len(),
                self.equilibrium.num_primary_species()
            )));
        }
        if !(dt >= 0.0) {
            return Err(ReactionsError::InvalidConfiguration(format!(
                "time step must be non-negative, got {}",
                dt
            )));
        }
        newton_raphson(
            log_primary,
            |x, residual, jacobian| {
                let state = self.update_mixed_system(temperature, x)?;
                residual.copy_from(&(&state.aggregate - aggregate_n - state.aggregate_rates * dt));
                jacobian.copy_from(
                    &(state.d_aggregate_d_log_primary - state.d_aggregate_rates_d_log_primary * dt),
                );
                Ok(())
            },
            &self.newton,
        )
    }

    /// Equilibrates `initial_aggregate` and then runs `n_steps` implicit steps of length `dt`.
    pub fn advance(
        &self,
        temperature: f64,
        dt: f64,
        n_steps: usize,
        initial_aggregate: &DVector<f64>,
    ) -> Result<MixedRun, ReactionsError> {
        self.newton.validate()?;
        let equilibrium_solver =
            EquilibriumSolver::new(&self.equilibrium).with_aggregate_config(self.aggregate.clone());
        let log_initial = initial_aggregate.map(f64::ln);
        let equilibrated =
            equilibrium_solver.enforce_equilibrium_log_aggregate(temperature, &log_initial)?;
        if !equilibrated.report.is_converged() {
            warn!("initial equilibration did not converge, continuing from the last iterate");
        }

        let mut log_primary = equilibrated.log_primary;
        let mut aggregate = initial_aggregate.clone();
        let mut log_secondary = equilibrated.log_secondary;
        let mut reports = Vec::with_capacity(n_steps);
        let mut time = 0.0;
        for n in 0..n_steps {
            let aggregate_n = aggregate.clone();
            let report = self.step(temperature, dt, &mut log_primary, &aggregate_n)?;
            if !report.is_converged() {
                warn!("mixed step {} did not converge, residual norm = {:e}", n, report.residual_norm);
            }
            let state = self.update_mixed_system(temperature, &log_primary)?;
            aggregate = state.aggregate;
            log_secondary = state.log_secondary;
            reports.push(report);
            time += dt;
            info!("mixed step {} done, time = {:.6e}", n, time);
        }
        Ok(MixedRun {
            log_primary,
            log_secondary,
            aggregate,
            equilibrium_report: equilibrated.report,
            reports,
            time,
        })
    }
}
