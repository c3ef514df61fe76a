//! # Kinetic reactions
//!
//! ## Purpose
//! Reaction rates of the kinetic sub-system, the net species rates they produce and an implicit
//! (backward Euler) time step over all species. Concentrations enter as natural logarithms and
//! every derivative is taken with respect to `ln(c)`.
//!
//! ## Rate laws
//! - `MassActionDifference`: `kf * prod(c^-S over S<0) - kr * prod(c^S over S>0)`
//! - `Quotient`: `kf * A * (1 - Q/K)` with `Q = prod(c^S)` and `A` the surface area of the
//!   reaction, used for minerals driven toward saturation
//!
//! Rate constants are scaled by the Arrhenius factor of the reaction at the given temperature.
use crate::Common::NonlinearSolvers::{
    NewtonConfig, SolveReport, newton_raphson, validate_iteration_control,
};
use crate::Common::errors::ReactionsError;
use crate::Reactions::Parameters::KineticReactionsParameters;
use log::info;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RateLaw {
    #[default]
    MassActionDifference,
    Quotient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeStepConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for TimeStepConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            tolerance: 1e-14,
        }
    }
}

impl TimeStepConfig {
    pub fn validate(&self) -> Result<(), ReactionsError> {
        validate_iteration_control("time step", self.max_iterations, self.tolerance)
    }
}

/// rates of the kinetic reactions and `d(rate_r)/d(ln c_i)` over all species
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionRates {
    pub rates: DVector<f64>,
    pub derivatives: DMatrix<f64>,
}

/// net production rate of every species and `d(rate_i)/d(ln c_j)`
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesRates {
    pub rates: DVector<f64>,
    pub derivatives: DMatrix<f64>,
}

/// Rates of a single reaction, shared with the mixed coupler.
pub(crate) fn reaction_rate(
    params: &KineticReactionsParameters,
    rate_law: RateLaw,
    r: usize,
    temperature: f64,
    surface_area: f64,
    log_c: &DVector<f64>,
    derivative: &mut [f64],
) -> f64 {
    let (kf, kr) = params.rate_constants(r, temperature);
    match rate_law {
        RateLaw::MassActionDifference => {
            let mut log_forward = 0.0;
            let mut log_reverse = 0.0;
            for (i, log_ci) in log_c.iter().enumerate() {
                let s = params.stoichiometric_coefficient(r, i);
                if s < 0.0 {
                    log_forward += -s * log_ci;
                } else if s > 0.0 {
                    log_reverse += s * log_ci;
                }
            }
            let forward = kf * log_forward.exp();
            let reverse = kr * log_reverse.exp();
            for (i, d) in derivative.iter_mut().enumerate() {
                let s = params.stoichiometric_coefficient(r, i);
                *d = if s < 0.0 {
                    forward * (-s)
                } else if s > 0.0 {
                    -reverse * s
                } else {
                    0.0
                };
            }
            forward - reverse
        }
        RateLaw::Quotient => {
            let log_q: f64 = log_c
                .iter()
                .enumerate()
                .map(|(i, log_ci)| params.stoichiometric_coefficient(r, i) * log_ci)
                .sum();
            let q_over_k = log_q.exp() / params.equilibrium_constant(r);
            let prefactor = kf * surface_area;
            for (i, d) in derivative.iter_mut().enumerate() {
                let s = params.stoichiometric_coefficient(r, i);
                *d = if s != 0.0 { -prefactor * s * q_over_k } else { 0.0 };
            }
            prefactor * (1.0 - q_over_k)
        }
    }
}

pub struct KineticReactions<'a> {
    params: &'a KineticReactionsParameters,
    pub rate_law: RateLaw,
    /// per-reaction surface area of the quotient law
    pub surface_area: DVector<f64>,
    pub config: TimeStepConfig,
}

impl<'a> KineticReactions<'a> {
    pub fn new(params: &'a KineticReactionsParameters) -> Self {
        Self {
            params,
            rate_law: RateLaw::default(),
            surface_area: DVector::from_element(params.num_reactions(), 1.0),
            config: TimeStepConfig::default(),
        }
    }

    pub fn with_rate_law(mut self, rate_law: RateLaw) -> Self {
        self.rate_law = rate_law;
        self
    }

    pub fn with_surface_area(mut self, surface_area: DVector<f64>) -> Result<Self, ReactionsError> {
        if surface_area.len() != self.params.num_reactions() {
            return Err(ReactionsError::DimensionMismatch(format!(
                "{} surface areas given for {} kinetic reactions",
                surface_area.len(),
                self.params.num_reactions()
            )));
        }
        self.surface_area = surface_area;
        Ok(self)
    }

    pub fn with_config(mut self, config: TimeStepConfig) -> Self {
        self.config = config;
        self
    }

    fn check_species(&self, log_c: &DVector<f64>) -> Result<(), ReactionsError> {
        if log_c.len() != self.params.num_species() {
            return Err(ReactionsError::DimensionMismatch(format!(
                "{} log concentrations given for {} species",
                log_c.len(),
                self.params.num_species()
            )));
        }
        Ok(())
    }

    pub fn compute_reaction_rates(
        &self,
        temperature: f64,
        log_c: &DVector<f64>,
    ) -> Result<ReactionRates, ReactionsError> {
        self.check_species(log_c)?;
        let n_reactions = self.params.num_reactions();
        let n_species = self.params.num_species();
        let mut rates = DVector::zeros(n_reactions);
        let mut derivatives = DMatrix::zeros(n_reactions, n_species);
        let mut row = vec![0.0; n_species];
        for r in 0..n_reactions {
            rates[r] = reaction_rate(
                self.params,
                self.rate_law,
                r,
                temperature,
                self.surface_area[r],
                log_c,
                &mut row,
            );
            for (i, d) in row.iter().enumerate() {
                derivatives[(r, i)] = *d;
            }
        }
        Ok(ReactionRates { rates, derivatives })
    }

    /// `rate_i = sum_r S[r][i] * rate_r`, derivatives `S^T * d(rate)/d(ln c)`
    pub fn compute_species_rates(
        &self,
        temperature: f64,
        log_c: &DVector<f64>,
    ) -> Result<SpeciesRates, ReactionsError> {
        let reaction_rates = self.compute_reaction_rates(temperature, log_c)?;
        let s = self.params.stoichiometric_matrix();
        Ok(SpeciesRates {
            rates: s.tr_mul(&reaction_rates.rates),
            derivatives: s.tr_mul(&reaction_rates.derivatives),
        })
    }

    /// One backward Euler step of length `dt` from `log_c_n`.
    ///
    /// Solves `exp(ln c) - exp(ln c_n) - dt * rate(ln c) = 0` for `ln c` with the Newton driver,
    /// starting from `ln c_n`.
    pub fn time_step(
        &self,
        dt: f64,
        temperature: f64,
        log_c_n: &DVector<f64>,
    ) -> Result<(DVector<f64>, SolveReport), ReactionsError> {
        self.config.validate()?;
        self.check_species(log_c_n)?;
        if !(dt >= 0.0) {
            return Err(ReactionsError::InvalidConfiguration(format!(
                "time step must be non-negative, got {}",
                dt
            )));
        }
        let c_n = log_c_n.map(f64::exp);
        let newton = NewtonConfig::new(self.config.max_iterations, self.config.tolerance);
        let mut log_c = log_c_n.clone();
        let report = newton_raphson(
            &mut log_c,
            |x, residual, jacobian| {
                let species_rates = self.compute_species_rates(temperature, x)?;
                let c = x.map(f64::exp);
                residual.copy_from(&(&c - &c_n - species_rates.rates * dt));
                jacobian.copy_from(&(DMatrix::from_diagonal(&c) - species_rates.derivatives * dt));
                Ok(())
            },
            &newton,
        )?;
        info!(
            "kinetic time step dt = {:e}: {} Newton iterations",
            dt, report.iterations
        );
        Ok((log_c, report))
    }
}
