/// universal gas constant, J/(mol*K)
pub const R: f64 = 8.31446261815324;

/// smallest concentration a species may reach in the reaction-extent solver
pub const MIN_CONCENTRATION: f64 = 1.0e-30;
