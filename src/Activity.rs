//! # Activity corrections
//!
//! Ionic strength and activity-coefficient models used by the aggregate equilibrium solver.
//! Models work in natural-log space: `log_activity_coefficients` returns `ln(gamma_i)` for
//! every species of the system.
pub mod ActivityModels;
pub mod IonicStrength;
