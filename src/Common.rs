//! # Common
//!
//! Numerical building blocks shared by the equilibrium, kinetic and mixed solvers.
//!
//! ## Main Structures
//!
//! - **`DirectSystemSolve`**: dense direct solvers for the small systems met in speciation
//!   (pivoted Gaussian elimination, Cholesky, positive definiteness check)
//! - **`NonlinearSolvers`**: generic Newton-Raphson driver over a residual + Jacobian callback,
//!   returning a `SolveReport`
//! - **`errors`**: `ReactionsError`, the one error type of the crate
//! - **`printers`**: prettytable dumps of linear systems and concentration vectors
//! - **`constants`**: physical constants and the concentration floor
pub mod constants;
#[allow(non_snake_case)]
pub mod DirectSystemSolve;
pub mod errors;
#[allow(non_snake_case)]
pub mod NonlinearSolvers;
pub mod printers;

#[allow(non_snake_case)]
mod DirectSystemSolve_tests;
#[allow(non_snake_case)]
mod NonlinearSolvers_tests;
