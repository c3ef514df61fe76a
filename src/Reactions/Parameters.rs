//! # Reaction system parameters
//!
//! ## Purpose
//! Immutable description of a set of species linked by reactions: the stoichiometric matrix
//! `S[r][i]` (reaction x species), the equilibrium constants, the forward and reverse rate
//! constants and the flags marking mobile secondary species.
//!
//! ## Conventions
//! - species `[0, num_secondary)` are secondary (dependent), species
//!   `[num_secondary, num_species)` are primary
//! - the first `num_secondary` reactions are the equilibrium reactions, reaction `r` defines
//!   secondary species `r`; the remaining reactions are kinetic
//! - `K_r` is the ratio of the product of reverse-side (positive coefficient) concentrations to
//!   the product of forward-side (negative coefficient) concentrations at equilibrium
//!
//! ## Main Structures
//! - **`ReactionsParameters`**: the complete system. Built through `new`, which runs
//!   `verify_parameter_consistency` and refuses inconsistent rate data.
//! - **`EquilibriumReactionsParameters`**: equilibrium sub-system (first `num_secondary`
//!   reactions with their `K`)
//! - **`KineticReactionsParameters`**: kinetic sub-system (remaining reactions with `kf`, `kr`, `K`)
use crate::Common::constants::R;
use crate::Common::errors::ReactionsError;
use log::info;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// relative tolerance on K = kf/kr when all three values are given
const CONSISTENCY_DIGITS: i32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReactionsParameters {
    stoichiometric_matrix: DMatrix<f64>,
    equilibrium_constant: DVector<f64>,
    rate_constant_forward: DVector<f64>,
    rate_constant_reverse: DVector<f64>,
    activation_energy: DVector<f64>,
    mobile_secondary_species_flag: Vec<bool>,
    num_equilibrium_reactions: usize,
}

/// plain input record used for JSON loading; turned into `ReactionsParameters` through `new`
#[derive(Debug, Deserialize)]
struct ReactionsParametersInput {
    stoichiometric_matrix: Vec<Vec<f64>>,
    equilibrium_constant: Vec<f64>,
    rate_constant_forward: Vec<f64>,
    rate_constant_reverse: Vec<f64>,
    num_equilibrium_reactions: usize,
    #[serde(default)]
    activation_energy: Option<Vec<f64>>,
    #[serde(default)]
    mobile_secondary_species_flag: Option<Vec<bool>>,
}

impl ReactionsParameters {
    /// Builds a system and verifies its rate data.
    ///
    /// A value that is not strictly positive counts as "not given". For every reaction at
    /// least two of `K`, `kf`, `kr` must be given; a missing third value is filled in.
    /// All secondary species are marked mobile, activation energies default to zero.
    pub fn new(
        stoichiometric_matrix: DMatrix<f64>,
        equilibrium_constant: DVector<f64>,
        rate_constant_forward: DVector<f64>,
        rate_constant_reverse: DVector<f64>,
        num_equilibrium_reactions: usize,
    ) -> Result<Self, ReactionsError> {
        let num_reactions = stoichiometric_matrix.nrows();
        let num_species = stoichiometric_matrix.ncols();
        for (name, len) in [
            ("equilibrium_constant", equilibrium_constant.len()),
            ("rate_constant_forward", rate_constant_forward.len()),
            ("rate_constant_reverse", rate_constant_reverse.len()),
        ] {
            if len != num_reactions {
                return Err(ReactionsError::DimensionMismatch(format!(
                    "{} has {} entries, stoichiometric matrix has {} reactions",
                    name, len, num_reactions
                )));
            }
        }
        if num_equilibrium_reactions > num_reactions {
            return Err(ReactionsError::InvalidStoichiometry(format!(
                "{} equilibrium reactions requested but only {} reactions exist",
                num_equilibrium_reactions, num_reactions
            )));
        }
        if num_equilibrium_reactions >= num_species {
            return Err(ReactionsError::InvalidStoichiometry(format!(
                "{} secondary species leave no primary species among {} species",
                num_equilibrium_reactions, num_species
            )));
        }

        let mut params = Self {
            stoichiometric_matrix,
            equilibrium_constant,
            rate_constant_forward,
            rate_constant_reverse,
            activation_energy: DVector::zeros(num_reactions),
            mobile_secondary_species_flag: vec![true; num_equilibrium_reactions],
            num_equilibrium_reactions,
        };
        params.verify_parameter_consistency()?;
        Ok(params)
    }

    /// Builds a system from row-major stoichiometric rows.
    pub fn from_rows(
        rows: &[Vec<f64>],
        equilibrium_constant: &[f64],
        rate_constant_forward: &[f64],
        rate_constant_reverse: &[f64],
        num_equilibrium_reactions: usize,
    ) -> Result<Self, ReactionsError> {
        let num_reactions = rows.len();
        let num_species = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some((r, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != num_species) {
            return Err(ReactionsError::DimensionMismatch(format!(
                "stoichiometric row {} has {} entries, expected {}",
                r,
                row.len(),
                num_species
            )));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::new(
            DMatrix::from_row_slice(num_reactions, num_species, &flat),
            DVector::from_column_slice(equilibrium_constant),
            DVector::from_column_slice(rate_constant_forward),
            DVector::from_column_slice(rate_constant_reverse),
            num_equilibrium_reactions,
        )
    }

    /// Parses a JSON description and validates it the same way as `new`.
    pub fn from_json_str(json: &str) -> Result<Self, ReactionsError> {
        let input: ReactionsParametersInput = serde_json::from_str(json)?;
        let mut params = Self::from_rows(
            &input.stoichiometric_matrix,
            &input.equilibrium_constant,
            &input.rate_constant_forward,
            &input.rate_constant_reverse,
            input.num_equilibrium_reactions,
        )?;
        if let Some(activation_energy) = input.activation_energy {
            params = params.with_activation_energy(DVector::from_vec(activation_energy))?;
        }
        if let Some(flags) = input.mobile_secondary_species_flag {
            params = params.with_mobile_secondary_species_flag(flags)?;
        }
        Ok(params)
    }

    pub fn with_mobile_secondary_species_flag(
        mut self,
        flags: Vec<bool>,
    ) -> Result<Self, ReactionsError> {
        if flags.len() != self.num_equilibrium_reactions {
            return Err(ReactionsError::DimensionMismatch(format!(
                "{} mobile flags given for {} secondary species",
                flags.len(),
                self.num_equilibrium_reactions
            )));
        }
        self.mobile_secondary_species_flag = flags;
        Ok(self)
    }

    /// Activation energies in J/mol; both rate constants of a reaction are scaled by
    /// `exp(-Ea/(R*T))`, so `K` does not depend on temperature.
    pub fn with_activation_energy(
        mut self,
        activation_energy: DVector<f64>,
    ) -> Result<Self, ReactionsError> {
        if activation_energy.len() != self.num_reactions() {
            return Err(ReactionsError::DimensionMismatch(format!(
                "{} activation energies given for {} reactions",
                activation_energy.len(),
                self.num_reactions()
            )));
        }
        if let Some(r) = activation_energy.iter().position(|e| *e < 0.0) {
            return Err(ReactionsError::InvalidConfiguration(format!(
                "activation energy of reaction {} is negative",
                r
            )));
        }
        self.activation_energy = activation_energy;
        Ok(self)
    }

    /// For each reaction: fewer than two of `K`, `kf`, `kr` given is an error; exactly two
    /// fills the third; all three must satisfy `K = kf/kr` to 12 significant digits.
    fn verify_parameter_consistency(&mut self) -> Result<(), ReactionsError> {
        for r in 0..self.num_reactions() {
            let k = self.equilibrium_constant[r];
            let kf = self.rate_constant_forward[r];
            let kr = self.rate_constant_reverse[r];
            let num_specified = [k, kf, kr].iter().filter(|v| **v > 0.0).count();
            match num_specified {
                3 => {
                    let kf_over_kr = kf / kr;
                    let abs_diff = (k - kf_over_kr).abs();
                    let magnitude = k.abs().max(kf_over_kr.abs());
                    if abs_diff > magnitude * 10f64.powi(-CONSISTENCY_DIGITS) {
                        return Err(ReactionsError::InconsistentEquilibriumRelation {
                            reaction: r,
                            k,
                            kf_over_kr,
                        });
                    }
                }
                2 => {
                    if !(k > 0.0) {
                        self.equilibrium_constant[r] = kf / kr;
                    } else if !(kf > 0.0) {
                        self.rate_constant_forward[r] = k * kr;
                    } else {
                        self.rate_constant_reverse[r] = kf / k;
                    }
                    info!(
                        "reaction {}: K = {:e}, kf = {:e}, kr = {:e}",
                        r,
                        self.equilibrium_constant[r],
                        self.rate_constant_forward[r],
                        self.rate_constant_reverse[r]
                    );
                }
                _ => return Err(ReactionsError::InsufficientRateData { reaction: r }),
            }
        }
        Ok(())
    }

    pub fn num_species(&self) -> usize {
        self.stoichiometric_matrix.ncols()
    }
    pub fn num_reactions(&self) -> usize {
        self.stoichiometric_matrix.nrows()
    }
    pub fn num_equilibrium_reactions(&self) -> usize {
        self.num_equilibrium_reactions
    }
    pub fn num_kinetic_reactions(&self) -> usize {
        self.num_reactions() - self.num_equilibrium_reactions
    }
    pub fn num_secondary_species(&self) -> usize {
        self.num_equilibrium_reactions
    }
    pub fn num_primary_species(&self) -> usize {
        self.num_species() - self.num_equilibrium_reactions
    }

    pub fn stoichiometric_coefficient(&self, r: usize, i: usize) -> f64 {
        self.stoichiometric_matrix[(r, i)]
    }
    pub fn stoichiometric_matrix(&self) -> &DMatrix<f64> {
        &self.stoichiometric_matrix
    }
    pub fn equilibrium_constant(&self, r: usize) -> f64 {
        self.equilibrium_constant[r]
    }
    pub fn rate_constant_forward(&self, r: usize) -> f64 {
        self.rate_constant_forward[r]
    }
    pub fn rate_constant_reverse(&self, r: usize) -> f64 {
        self.rate_constant_reverse[r]
    }
    pub fn mobile_secondary_species_flag(&self) -> &[bool] {
        &self.mobile_secondary_species_flag
    }

    ////////////////////////////////SUB-SYSTEM SPLIT////////////////////////////////
    /// first `num_secondary` reactions with all species columns
    pub fn equilibrium_reactions_parameters(&self) -> EquilibriumReactionsParameters {
        let n_eq = self.num_equilibrium_reactions;
        EquilibriumReactionsParameters {
            stoichiometric_matrix: self.stoichiometric_matrix.rows(0, n_eq).into_owned(),
            equilibrium_constant: self.equilibrium_constant.rows(0, n_eq).into_owned(),
            mobile_secondary_species_flag: self.mobile_secondary_species_flag.clone(),
        }
    }

    /// reactions after the equilibrium block with all species columns
    pub fn kinetic_reactions_parameters(&self) -> KineticReactionsParameters {
        let n_eq = self.num_equilibrium_reactions;
        let n_kin = self.num_kinetic_reactions();
        KineticReactionsParameters {
            stoichiometric_matrix: self.stoichiometric_matrix.rows(n_eq, n_kin).into_owned(),
            rate_constant_forward: self.rate_constant_forward.rows(n_eq, n_kin).into_owned(),
            rate_constant_reverse: self.rate_constant_reverse.rows(n_eq, n_kin).into_owned(),
            equilibrium_constant: self.equilibrium_constant.rows(n_eq, n_kin).into_owned(),
            activation_energy: self.activation_energy.rows(n_eq, n_kin).into_owned(),
        }
    }
}

/// Equilibrium sub-system. Reaction `r` defines secondary species `r`; the species count
/// minus the reaction count gives the primary species.
#[derive(Debug, Clone, PartialEq)]
pub struct EquilibriumReactionsParameters {
    stoichiometric_matrix: DMatrix<f64>,
    equilibrium_constant: DVector<f64>,
    mobile_secondary_species_flag: Vec<bool>,
}

impl EquilibriumReactionsParameters {
    /// Equilibrium-only system, used directly by the reaction-extent solver.
    /// All secondary species are mobile.
    pub fn new(
        stoichiometric_matrix: DMatrix<f64>,
        equilibrium_constant: DVector<f64>,
    ) -> Result<Self, ReactionsError> {
        if equilibrium_constant.len() != stoichiometric_matrix.nrows() {
            return Err(ReactionsError::DimensionMismatch(format!(
                "{} equilibrium constants given for {} reactions",
                equilibrium_constant.len(),
                stoichiometric_matrix.nrows()
            )));
        }
        if let Some(r) = equilibrium_constant.iter().position(|k| !(*k > 0.0)) {
            return Err(ReactionsError::InsufficientRateData { reaction: r });
        }
        let n = stoichiometric_matrix.nrows();
        Ok(Self {
            stoichiometric_matrix,
            equilibrium_constant,
            mobile_secondary_species_flag: vec![true; n],
        })
    }

    pub fn num_species(&self) -> usize {
        self.stoichiometric_matrix.ncols()
    }
    pub fn num_reactions(&self) -> usize {
        self.stoichiometric_matrix.nrows()
    }
    pub fn num_secondary_species(&self) -> usize {
        self.num_reactions()
    }
    pub fn num_primary_species(&self) -> usize {
        self.num_species().saturating_sub(self.num_reactions())
    }
    pub fn stoichiometric_coefficient(&self, r: usize, i: usize) -> f64 {
        self.stoichiometric_matrix[(r, i)]
    }
    pub fn stoichiometric_matrix(&self) -> &DMatrix<f64> {
        &self.stoichiometric_matrix
    }
    pub fn equilibrium_constant(&self, r: usize) -> f64 {
        self.equilibrium_constant[r]
    }
    pub fn is_mobile(&self, secondary: usize) -> bool {
        self.mobile_secondary_species_flag[secondary]
    }

    /// Mass action needs reaction `r` to carry coefficient -1 on its own secondary species and
    /// nothing on the other secondary species.
    pub fn verify_secondary_species_structure(&self) -> Result<(), ReactionsError> {
        let n_sec = self.num_secondary_species();
        if n_sec >= self.num_species() {
            return Err(ReactionsError::InvalidStoichiometry(format!(
                "{} reactions over {} species leave no primary species",
                n_sec,
                self.num_species()
            )));
        }
        for r in 0..n_sec {
            for j in 0..n_sec {
                let expected = if j == r { -1.0 } else { 0.0 };
                let s = self.stoichiometric_matrix[(r, j)];
                if s != expected {
                    return Err(ReactionsError::InvalidStoichiometry(format!(
                        "reaction {} has coefficient {} on secondary species {}, expected {}",
                        r, s, j, expected
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Kinetic sub-system with its own rate constants.
#[derive(Debug, Clone, PartialEq)]
pub struct KineticReactionsParameters {
    stoichiometric_matrix: DMatrix<f64>,
    rate_constant_forward: DVector<f64>,
    rate_constant_reverse: DVector<f64>,
    equilibrium_constant: DVector<f64>,
    activation_energy: DVector<f64>,
}

impl KineticReactionsParameters {
    pub fn num_species(&self) -> usize {
        self.stoichiometric_matrix.ncols()
    }
    pub fn num_reactions(&self) -> usize {
        self.stoichiometric_matrix.nrows()
    }
    pub fn stoichiometric_coefficient(&self, r: usize, i: usize) -> f64 {
        self.stoichiometric_matrix[(r, i)]
    }
    pub fn stoichiometric_matrix(&self) -> &DMatrix<f64> {
        &self.stoichiometric_matrix
    }
    pub fn equilibrium_constant(&self, r: usize) -> f64 {
        self.equilibrium_constant[r]
    }

    /// forward and reverse rate constants at `temperature`
    pub fn rate_constants(&self, r: usize, temperature: f64) -> (f64, f64) {
        let kf = self.rate_constant_forward[r];
        let kr = self.rate_constant_reverse[r];
        let ea = self.activation_energy[r];
        if ea > 0.0 {
            let arrhenius = (-ea / (R * temperature)).exp();
            (kf * arrhenius, kr * arrhenius)
        } else {
            (kf, kr)
        }
    }
}
