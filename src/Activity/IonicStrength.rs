use crate::Common::errors::ReactionsError;
use nalgebra::DVector;

/// `I = 1/2 * sum(c_i * z_i^2)` over the speciated concentrations.
pub fn speciated_ionic_strength(
    species_concentration: &DVector<f64>,
    species_charge: &DVector<f64>,
) -> Result<f64, ReactionsError> {
    if species_concentration.len() != species_charge.len() {
        return Err(ReactionsError::DimensionMismatch(format!(
            "{} concentrations given for {} charges",
            species_concentration.len(),
            species_charge.len()
        )));
    }
    let ionic_strength = species_concentration
        .iter()
        .zip(species_charge.iter())
        .map(|(c, z)| c * z * z)
        .sum::<f64>();
    Ok(0.5 * ionic_strength)
}
