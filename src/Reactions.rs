//! # Reactions
//!
//! ## Purpose
//! Reaction systems split into a fast part, held at chemical equilibrium, and a slow part,
//! advanced by rate laws. Species are ordered secondary first and primary last; each of the
//! first `n_eq` reactions (the equilibrium ones) consumes exactly one unit of its own secondary
//! species and is otherwise written in primary species only.
//!
//! ## Main Structures
//! - **`Parameters`**: `ReactionsParameters` with rate-constant consistency (`K = kf/kr`) and
//!   the split into `EquilibriumReactionsParameters` and `KineticReactionsParameters`
//! - **`MassActions`**: secondary concentrations and aggregate primary concentrations from
//!   primary log concentrations
//! - **`EquilibriumReactions`**: `EquilibriumSolver`, equilibrium by reaction extents or by
//!   aggregate concentrations
//! - **`KineticReactions`**: reaction and species rates, backward Euler time step
//! - **`MixedReactions`**: `MixedReactionsSolver`, implicit coupling of the two parts
#[allow(non_snake_case)]
pub mod EquilibriumReactions;
#[allow(non_snake_case)]
pub mod KineticReactions;
#[allow(non_snake_case)]
pub mod MassActions;
#[allow(non_snake_case)]
pub mod MixedReactions;
#[allow(non_snake_case)]
pub mod Parameters;

#[allow(non_snake_case)]
mod MixedReactions_tests;
