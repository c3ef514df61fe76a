use crate::Activity::IonicStrength::speciated_ionic_strength;
use crate::Common::errors::ReactionsError;
use enum_dispatch::enum_dispatch;
use nalgebra::DVector;

/// Debye-Huckel `A` parameter of the B-dot model
pub const BDOT_A_GAMMA: f64 = 2.0;
/// Debye-Huckel `B` parameter of the B-dot model
pub const BDOT_B_GAMMA: f64 = 1.6;

#[enum_dispatch]
pub trait ActivityModel {
    /// `ln(gamma_i)` for every species given all speciated concentrations
    fn log_activity_coefficients(
        &self,
        temperature: f64,
        species_concentration: &DVector<f64>,
    ) -> Result<DVector<f64>, ReactionsError>;

    fn is_ideal(&self) -> bool {
        false
    }
}

/// every activity coefficient is one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ideal;

impl ActivityModel for Ideal {
    fn log_activity_coefficients(
        &self,
        _temperature: f64,
        species_concentration: &DVector<f64>,
    ) -> Result<DVector<f64>, ReactionsError> {
        Ok(DVector::zeros(species_concentration.len()))
    }

    fn is_ideal(&self) -> bool {
        true
    }
}

/// Extended Debye-Huckel (B-dot) model:
/// `ln(gamma_i) = -A * sqrt(I) / (1 + a_i * B * sqrt(I)) * z_i^2 + b_i * I`
#[derive(Debug, Clone, PartialEq)]
pub struct Bdot {
    pub species_charge: DVector<f64>,
    /// ion size parameter `a_i`
    pub ion_size: DVector<f64>,
    /// `b_i`
    pub bdot: DVector<f64>,
    pub a_gamma: f64,
    pub b_gamma: f64,
}

impl Bdot {
    pub fn new(
        species_charge: DVector<f64>,
        ion_size: DVector<f64>,
        bdot: DVector<f64>,
    ) -> Result<Self, ReactionsError> {
        if ion_size.len() != species_charge.len() || bdot.len() != species_charge.len() {
            return Err(ReactionsError::DimensionMismatch(format!(
                "B-dot model: {} charges, {} ion sizes, {} bdot values",
                species_charge.len(),
                ion_size.len(),
                bdot.len()
            )));
        }
        Ok(Self {
            species_charge,
            ion_size,
            bdot,
            a_gamma: BDOT_A_GAMMA,
            b_gamma: BDOT_B_GAMMA,
        })
    }
}

impl ActivityModel for Bdot {
    fn log_activity_coefficients(
        &self,
        _temperature: f64,
        species_concentration: &DVector<f64>,
    ) -> Result<DVector<f64>, ReactionsError> {
        let ionic_strength = speciated_ionic_strength(species_concentration, &self.species_charge)?;
        let sqrt_i = ionic_strength.sqrt();
        let log_gamma = DVector::from_fn(species_concentration.len(), |i, _| {
            let z = self.species_charge[i];
            -self.a_gamma * sqrt_i / (1.0 + self.ion_size[i] * self.b_gamma * sqrt_i) * z * z
                + self.bdot[i] * ionic_strength
        });
        Ok(log_gamma)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch(ActivityModel)]
pub enum ActivityModelKind {
    Ideal(Ideal),
    Bdot(Bdot),
}

impl Default for ActivityModelKind {
    fn default() -> Self {
        ActivityModelKind::Ideal(Ideal)
    }
}
