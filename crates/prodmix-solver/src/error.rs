use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Shape mismatch in {what}: expected {expected} entries, found {found}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    #[error("Problem contains a NaN or infinite coefficient")]
    NonFinite,
    #[error("No feasible production plan satisfies every constraint")]
    Infeasible,
    #[error("Problem is unbounded: profit can grow without limit")]
    Unbounded,
    #[error("Iteration limit of {limit} pivots reached without converging")]
    IterationLimitExceeded { limit: usize },
}
