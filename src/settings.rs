//! # Settings Module
//!
//! ## Purpose
//! One place for every solver configuration of the crate, so that a whole run can be described
//! by a single JSON document and validated before anything is solved.
//!
//! ## Usage Pattern
//! ```rust
//! use KiReact::settings::SolverSettings;
//!
//! let mut settings = SolverSettings::default();
//! settings.aggregate.max_iterations = 200;
//! let json = settings.to_json().unwrap();
//! let restored = SolverSettings::from_json_str(&json).unwrap();
//! assert_eq!(settings, restored);
//! ```
//!
//! ## Contents
//! | Field | Used by | Defaults |
//! |-------|---------|----------|
//! | `newton` | generic Newton driver, mixed time step | 12 iterations, 1e-10 |
//! | `extents` | reaction-extent equilibrium | 100 iterations, 1e-14, log-ratio residual |
//! | `aggregate` | aggregate equilibrium | 150 iterations, 1e-12 |
//! | `time_step` | kinetic backward Euler step | 20 iterations, 1e-14 |
//! | `rate_law` | kinetic and mixed solvers | mass action difference |
use crate::Common::NonlinearSolvers::NewtonConfig;
use crate::Common::errors::ReactionsError;
use crate::Reactions::EquilibriumReactions::{AggregateConfig, ExtentsConfig};
use crate::Reactions::KineticReactions::{RateLaw, TimeStepConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SolverSettings {
    pub newton: NewtonConfig,
    pub extents: ExtentsConfig,
    pub aggregate: AggregateConfig,
    pub time_step: TimeStepConfig,
    pub rate_law: RateLaw,
}

impl SolverSettings {
    pub fn validate(&self) -> Result<(), ReactionsError> {
        self.newton.validate()?;
        self.extents.validate()?;
        self.aggregate.validate()?;
        self.time_step.validate()?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ReactionsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Missing sections take their defaults; the result is validated.
    pub fn from_json_str(json: &str) -> Result<Self, ReactionsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reactions::EquilibriumReactions::ResidualForm;

    #[test]
    fn test_defaults_are_valid() {
        let settings = SolverSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.newton.max_iterations, 12);
        assert_eq!(settings.extents.residual_form, ResidualForm::LogRatio);
        assert_eq!(settings.aggregate.max_iterations, 150);
        assert_eq!(settings.time_step.tolerance, 1e-14);
        assert_eq!(settings.rate_law, RateLaw::MassActionDifference);
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = SolverSettings::default();
        settings.extents = ExtentsConfig::bulk_generic().with_residual_form(ResidualForm::Ratio);
        settings.rate_law = RateLaw::Quotient;
        settings.newton.print_linear_system = true;
        let json = settings.to_json().unwrap();
        let restored = SolverSettings::from_json_str(&json).unwrap();
        assert_eq!(restored, settings);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let restored =
            SolverSettings::from_json_str(r#"{ "rate_law": "Quotient" }"#).unwrap();
        assert_eq!(restored.rate_law, RateLaw::Quotient);
        assert_eq!(restored.aggregate, AggregateConfig::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = SolverSettings::default();
        settings.aggregate.tolerance = 0.0;
        assert!(matches!(
            settings.validate(),
            Err(ReactionsError::InvalidConfiguration(_))
        ));

        let mut settings = SolverSettings::default();
        settings.time_step.max_iterations = 0;
        assert!(settings.validate().is_err());

        let mut settings = SolverSettings::default();
        settings.extents.safety_factor = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = SolverSettings::default();
        settings.extents.positivity_floor = -1.0;
        let json = settings.to_json().unwrap();
        assert!(matches!(
            SolverSettings::from_json_str(&json),
            Err(ReactionsError::InvalidConfiguration(_))
        ));

        assert!(matches!(
            SolverSettings::from_json_str("{ not json"),
            Err(ReactionsError::Json(_))
        ));
    }
}
