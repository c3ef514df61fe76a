use thiserror::Error;

/// Errors produced while building reaction systems or solving them.
///
/// Newton non-convergence is not an error: iterative solvers report it through
/// `SolveReport` and return the best state they reached.
#[derive(Debug, Error)]
pub enum ReactionsError {
    #[error("at least two of K, kf, kr must be specified for reaction {reaction}")]
    InsufficientRateData { reaction: usize },
    #[error(
        "inconsistent equilibrium relation for reaction {reaction}: K = {k:e}, kf/kr = {kf_over_kr:e}"
    )]
    InconsistentEquilibriumRelation {
        reaction: usize,
        k: f64,
        kf_over_kr: f64,
    },
    #[error("invalid stoichiometry: {0}")]
    InvalidStoichiometry(String),
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("concentration of species {index} must be positive, got {value:e}")]
    NonPositiveConcentration { index: usize, value: f64 },
    #[error("singular matrix: zero pivot at row {row}")]
    SingularMatrix { row: usize },
    #[error("matrix is not positive definite: non-positive pivot at row {row}")]
    NotPositiveDefinite { row: usize },
    #[error("jacobian is not symmetric: J[{row}][{col}] = {value:e}, J[{col}][{row}] = {transposed:e}")]
    AsymmetricJacobian {
        row: usize,
        col: usize,
        value: f64,
        transposed: f64,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
