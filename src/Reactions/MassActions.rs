//! # Mass action speciation
//!
//! ## Purpose
//! Secondary species concentrations from primary species concentrations through the mass
//! action law of the equilibrium reactions, and the aggregate (total) primary concentrations
//! that follow from them. Everything works on natural logarithms of concentrations.
//!
//! For equilibrium reaction `j` (which consumes one unit of secondary species `j`):
//! ```text
//! ln(c_sec_j) = -ln(K_j) + sum_k S[j][n_sec + k] * (ln(c_k) + ln(gamma_k)) - ln(gamma_j)
//! agg_i       = c_i + sum_j S[j][n_sec + i] * c_sec_j
//! ```
//! Activity coefficients, when given, are held fixed while derivatives are taken.
//!
//! ## Main Structures
//! - **`AggregateConcentrations`**: secondary logs, aggregates and `d(agg)/d(ln c_primary)`
//! - **`TotalAndMobileAggregates`**: the same for all secondary species and for the mobile ones
use crate::Common::errors::ReactionsError;
use crate::Reactions::Parameters::EquilibriumReactionsParameters;
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateConcentrations {
    pub log_secondary: DVector<f64>,
    pub aggregate: DVector<f64>,
    /// `[i][k] = d(agg_i)/d(ln c_k)` over primary species
    pub d_aggregate_d_log_primary: DMatrix<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TotalAndMobileAggregates {
    pub log_secondary: DVector<f64>,
    pub total: DVector<f64>,
    pub d_total_d_log_primary: DMatrix<f64>,
    pub mobile: DVector<f64>,
    pub d_mobile_d_log_primary: DMatrix<f64>,
}

fn check_inputs(
    params: &EquilibriumReactionsParameters,
    log_primary: &DVector<f64>,
    log_gamma: Option<&DVector<f64>>,
) -> Result<(), ReactionsError> {
    params.verify_secondary_species_structure()?;
    if log_primary.len() != params.num_primary_species() {
        return Err(ReactionsError::DimensionMismatch(format!(
            "{} primary log concentrations given, system has {} primary species",
            log_primary.len(),
            params.num_primary_species()
        )));
    }
    if let Some(log_gamma) = log_gamma {
        if log_gamma.len() != params.num_species() {
            return Err(ReactionsError::DimensionMismatch(format!(
                "{} activity coefficients given, system has {} species",
                log_gamma.len(),
                params.num_species()
            )));
        }
    }
    Ok(())
}

fn log_secondary_unchecked(
    params: &EquilibriumReactionsParameters,
    log_primary: &DVector<f64>,
    log_gamma: Option<&DVector<f64>>,
) -> DVector<f64> {
    let n_sec = params.num_secondary_species();
    let gamma = |i: usize| log_gamma.map_or(0.0, |g| g[i]);
    DVector::from_fn(n_sec, |j, _| {
        let mut log_c = -params.equilibrium_constant(j).ln() - gamma(j);
        for (k, log_p) in log_primary.iter().enumerate() {
            let s = params.stoichiometric_coefficient(j, n_sec + k);
            if s != 0.0 {
                log_c += s * (log_p + gamma(n_sec + k));
            }
        }
        log_c
    })
}

pub fn calculate_log_secondary_species_concentration(
    params: &EquilibriumReactionsParameters,
    log_primary: &DVector<f64>,
) -> Result<DVector<f64>, ReactionsError> {
    check_inputs(params, log_primary, None)?;
    Ok(log_secondary_unchecked(params, log_primary, None))
}

/// `log_gamma` holds `ln(gamma)` for all species, secondary first.
pub fn calculate_log_secondary_species_concentration_with_activity(
    params: &EquilibriumReactionsParameters,
    log_primary: &DVector<f64>,
    log_gamma: &DVector<f64>,
) -> Result<DVector<f64>, ReactionsError> {
    check_inputs(params, log_primary, Some(log_gamma))?;
    Ok(log_secondary_unchecked(params, log_primary, Some(log_gamma)))
}

/// Secondary logs and `d(ln c_sec_j)/d(ln c_k) = S[j][n_sec + k]`.
pub fn calculate_log_secondary_species_concentration_wrt_log_c(
    params: &EquilibriumReactionsParameters,
    log_primary: &DVector<f64>,
) -> Result<(DVector<f64>, DMatrix<f64>), ReactionsError> {
    check_inputs(params, log_primary, None)?;
    let n_sec = params.num_secondary_species();
    let n_prim = params.num_primary_species();
    let log_secondary = log_secondary_unchecked(params, log_primary, None);
    let derivative = params
        .stoichiometric_matrix()
        .view((0, n_sec), (n_sec, n_prim))
        .into_owned();
    Ok((log_secondary, derivative))
}

/// aggregates over the secondary species selected by `include`
fn aggregate_over(
    params: &EquilibriumReactionsParameters,
    log_primary: &DVector<f64>,
    secondary: &DVector<f64>,
    include: impl Fn(usize) -> bool,
) -> (DVector<f64>, DMatrix<f64>) {
    let n_sec = params.num_secondary_species();
    let n_prim = params.num_primary_species();
    let mut aggregate = log_primary.map(f64::exp);
    let mut d_aggregate = DMatrix::from_diagonal(&aggregate);
    for j in (0..n_sec).filter(|j| include(*j)) {
        let c_sec = secondary[j];
        for i in 0..n_prim {
            let s_i = params.stoichiometric_coefficient(j, n_sec + i);
            if s_i == 0.0 {
                continue;
            }
            aggregate[i] += s_i * c_sec;
            for k in 0..n_prim {
                let s_k = params.stoichiometric_coefficient(j, n_sec + k);
                d_aggregate[(i, k)] += s_i * s_k * c_sec;
            }
        }
    }
    (aggregate, d_aggregate)
}

pub fn calculate_aggregate_primary_concentrations_wrt_log_c(
    params: &EquilibriumReactionsParameters,
    log_primary: &DVector<f64>,
) -> Result<AggregateConcentrations, ReactionsError> {
    check_inputs(params, log_primary, None)?;
    Ok(aggregate_unchecked(params, log_primary, None))
}

/// Aggregates with activity-corrected speciation; `log_gamma` is frozen in the derivatives.
pub fn calculate_aggregate_primary_concentrations_with_activity(
    params: &EquilibriumReactionsParameters,
    log_primary: &DVector<f64>,
    log_gamma: &DVector<f64>,
) -> Result<AggregateConcentrations, ReactionsError> {
    check_inputs(params, log_primary, Some(log_gamma))?;
    Ok(aggregate_unchecked(params, log_primary, Some(log_gamma)))
}

pub(crate) fn aggregate_unchecked(
    params: &EquilibriumReactionsParameters,
    log_primary: &DVector<f64>,
    log_gamma: Option<&DVector<f64>>,
) -> AggregateConcentrations {
    let log_secondary = log_secondary_unchecked(params, log_primary, log_gamma);
    let secondary = log_secondary.map(f64::exp);
    let (aggregate, d_aggregate_d_log_primary) =
        aggregate_over(params, log_primary, &secondary, |_| true);
    AggregateConcentrations {
        log_secondary,
        aggregate,
        d_aggregate_d_log_primary,
    }
}

/// Total aggregates count every secondary species, mobile aggregates only those flagged mobile.
pub fn calculate_total_and_mobile_aggregate_primary_concentrations_wrt_log_c(
    params: &EquilibriumReactionsParameters,
    log_primary: &DVector<f64>,
) -> Result<TotalAndMobileAggregates, ReactionsError> {
    check_inputs(params, log_primary, None)?;
    let log_secondary = log_secondary_unchecked(params, log_primary, None);
    let secondary = log_secondary.map(f64::exp);
    let (total, d_total_d_log_primary) = aggregate_over(params, log_primary, &secondary, |_| true);
    let (mobile, d_mobile_d_log_primary) =
        aggregate_over(params, log_primary, &secondary, |j| params.is_mobile(j));
    Ok(TotalAndMobileAggregates {
        log_secondary,
        total,
        d_total_d_log_primary,
        mobile,
        d_mobile_d_log_primary,
    })
}
