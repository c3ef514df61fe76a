//! # Predefined reaction systems
//!
//! Input data for tests and example runs. Species are ordered secondary first, primary last,
//! and the species name arrays follow the matrix columns.
use crate::Common::errors::ReactionsError;
use crate::Reactions::Parameters::ReactionsParameters;

pub const CARBONATE_SPECIES: [&str; 18] = [
    "OH-", "CO2", "CO3-2", "H2CO3", "CaHCO3+", "CaSO4", "CaCl+", "CaCl2", "MgSO4", "NaSO4-",
    "CaCO3", "H+", "HCO3-", "Ca+2", "SO4-2", "Cl-", "Mg+2", "Na+",
];

/// carbonate system without the CaCO3 column
pub const CARBONATE_NOSOLID_SPECIES: [&str; 17] = [
    "OH-", "CO2", "CO3-2", "H2CO3", "CaHCO3+", "CaSO4", "CaCl+", "CaCl2", "MgSO4", "NaSO4-",
    "H+", "HCO3-", "Ca+2", "SO4-2", "Cl-", "Mg+2", "Na+",
];

pub const BICARBONATE_BUFFER_SPECIES: [&str; 5] = ["CO2", "OH-", "HCO3-", "CO3-2", "H+"];

/// dense stoichiometric rows from (species, coefficient) pairs
fn sparse_rows(num_species: usize, reactions: &[&[(usize, f64)]]) -> Vec<Vec<f64>> {
    reactions
        .iter()
        .map(|entries| {
            let mut row = vec![0.0; num_species];
            for (i, s) in entries.iter() {
                row[*i] = *s;
            }
            row
        })
        .collect()
}

////////////////////////////////SIMPLE TEST SYSTEM////////////////////////////////
// 2 A <=> B + C
// C + D <=> 2 E

fn simple_rows() -> Vec<Vec<f64>> {
    vec![
        vec![-2.0, 1.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, -1.0, -1.0, 2.0],
    ]
}

/// both reactions at equilibrium
pub fn simple_test_system() -> Result<ReactionsParameters, ReactionsError> {
    ReactionsParameters::from_rows(&simple_rows(), &[1.0, 1.0], &[1.0, 0.5], &[1.0, 0.5], 2)
}

/// the same reactions, both kinetic
pub fn simple_kinetic_test_system() -> Result<ReactionsParameters, ReactionsError> {
    ReactionsParameters::from_rows(&simple_rows(), &[1.0, 1.0], &[1.0, 0.5], &[1.0, 0.5], 0)
}

////////////////////////////////CARBONATE////////////////////////////////

const CARBONATE_EQUILIBRIUM_CONSTANTS: [f64; 11] = [
    9.77E+13, // OH- + H+ = H2O
    4.37E-07, // CO2 + H2O = H+ + HCO3-
    2.14E+10, // CO3-2 + H+ = HCO3-
    1.70E-04, // H2CO3 = H+ + HCO3-
    8.13E-02, // CaHCO3+ = Ca+2 + HCO3-
    6.92E-03, // CaSO4 = Ca+2 + SO4-2
    4.68E+00, // CaCl+ = Ca+2 + Cl-
    3.98E+00, // CaCl2 = Ca+2 + 2Cl-
    3.72E-03, // MgSO4 = Mg+2 + SO4-2
    1.51E-01, // NaSO4- = Na+ + SO4-2
    1.17E+07, // CaCO3 + H+ = Ca+2 + HCO3-
];

const CARBONATE_FORWARD_RATES: [f64; 11] = [
    1.4e11, 0.039, 1.0e10, 0.57, 1.5e6, 1.0e5, 1.0e8, 1.0e7, 1.0e5, 1.0e7, 1.0e5,
];

/// Reverse rates are derived from `K` and `kf`; tabulated values do not satisfy `K = kf/kr`.
const CARBONATE_REVERSE_RATES: [f64; 11] = [0.0; 11];

/// Reactions of the carbonate system with the primary species columns given relative to the
/// first primary column `p` (H+, HCO3-, Ca+2, SO4-2, Cl-, Mg+2, Na+).
fn carbonate_reactions(p: usize, with_solid: bool) -> Vec<Vec<(usize, f64)>> {
    let (h, hco3, ca, so4, cl, mg, na) = (p, p + 1, p + 2, p + 3, p + 4, p + 5, p + 6);
    let mut reactions = vec![
        vec![(0, -1.0), (h, -1.0)],
        vec![(1, -1.0), (h, 1.0), (hco3, 1.0)],
        vec![(2, -1.0), (h, -1.0), (hco3, 1.0)],
        vec![(3, -1.0), (h, 1.0), (hco3, 1.0)],
        vec![(4, -1.0), (hco3, 1.0), (ca, 1.0)],
        vec![(5, -1.0), (ca, 1.0), (so4, 1.0)],
        vec![(6, -1.0), (ca, 1.0), (cl, 1.0)],
        vec![(7, -1.0), (ca, 1.0), (cl, 2.0)],
        vec![(8, -1.0), (so4, 1.0), (mg, 1.0)],
        vec![(9, -1.0), (so4, 1.0), (na, 1.0)],
    ];
    if with_solid {
        reactions.push(vec![(10, -1.0), (h, -1.0), (hco3, 1.0), (ca, 1.0)]);
    } else {
        reactions.push(vec![(h, -1.0), (hco3, 1.0), (ca, 1.0)]);
    }
    reactions
}

fn carbonate_system(
    num_species: usize,
    first_primary: usize,
    with_solid: bool,
    num_equilibrium_reactions: usize,
) -> Result<ReactionsParameters, ReactionsError> {
    let reactions = carbonate_reactions(first_primary, with_solid);
    let entries: Vec<&[(usize, f64)]> = reactions.iter().map(|r| r.as_slice()).collect();
    ReactionsParameters::from_rows(
        &sparse_rows(num_species, &entries),
        &CARBONATE_EQUILIBRIUM_CONSTANTS,
        &CARBONATE_FORWARD_RATES,
        &CARBONATE_REVERSE_RATES,
        num_equilibrium_reactions,
    )
}

/// 18 species, 11 equilibrium reactions (CaCO3 treated as an aqueous secondary species)
pub fn carbonate_all_equilibrium() -> Result<ReactionsParameters, ReactionsError> {
    carbonate_system(18, 11, true, 11)
}

/// 18 species, the same 11 reactions all kinetic
pub fn carbonate_all_kinetic() -> Result<ReactionsParameters, ReactionsError> {
    carbonate_system(18, 11, true, 0)
}

/// 17 species without solid: 10 aqueous equilibria plus calcite dissolution
/// `CaCO3(s) + H+ = Ca+2 + HCO3-` as the kinetic reaction
pub fn carbonate_mixed() -> Result<ReactionsParameters, ReactionsError> {
    carbonate_system(17, 10, false, 10)
}

////////////////////////////////BICARBONATE BUFFER////////////////////////////////

/// five kinetic reactions of the CO2 / bicarbonate / carbonate buffer
pub fn bicarbonate_buffer() -> Result<ReactionsParameters, ReactionsError> {
    let rows = vec![
        vec![-1.0, -1.0, 1.0, 0.0, 0.0], // CO2 + OH- = HCO3-
        vec![-1.0, 0.0, 1.0, 0.0, 1.0],  // CO2 + H2O = HCO3- + H+
        vec![0.0, 1.0, 1.0, -1.0, 0.0],  // CO3-2 + H2O = HCO3- + OH-
        vec![0.0, 0.0, 1.0, -1.0, -1.0], // CO3-2 + H+ = HCO3-
        vec![0.0, -1.0, 0.0, 0.0, -1.0], // OH- + H+ = H2O
    ];
    ReactionsParameters::from_rows(
        &rows,
        &[4.27E+07, 4.27E-07, 2.09E-04, 2.09E+10, 1.00E+14],
        &[8.42E+03, 3.71E-02, 1.25E+06, 1.24E+12, 2.30E+10],
        &[0.0; 5],
        0,
    )
}
