//! Predefined reaction systems and worked runs of the solvers on them.
pub mod example_systems;
pub mod reaction_examples;

#[allow(non_snake_case)]
mod Examples_tests;
