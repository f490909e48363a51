mod config;
mod error;
mod problem;
mod simplex;
mod solution;

pub use config::{PivotRule, SolverConfig};
pub use error::SolveError;
pub use problem::Problem;
pub use simplex::Solver;
pub use solution::{
    Analysis, ConstraintViolation, ReducedCost, SensitivityRange, Solution, SolutionStatus,
};

/// Maximize `profits · x` subject to `constraints · x <= availabilities` and
/// `x >= 0` with the default [`Solver`].
pub fn solve(
    profits: &[f64],
    constraints: &[Vec<f64>],
    availabilities: &[f64],
) -> Result<Solution, SolveError> {
    let problem = Problem::new(profits.to_vec(), constraints.to_vec(), availabilities.to_vec());
    Solver::new().solve(&problem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_free_function() {
        let solution = solve(
            &[120.0, 60.0, 40.0],
            &[
                vec![4.0, 2.0, 1.5],
                vec![8.0, 6.0, 1.0],
                vec![2.0, 1.5, 0.5],
            ],
            &[200.0, 480.0, 80.0],
        )
        .unwrap();

        assert!(solution.is_optimal());
        assert!((solution.objective_value - 5600.0).abs() < 1e-6);
    }

    #[test]
    fn test_solve_rejects_ragged_rows() {
        let result = solve(&[1.0], &[vec![1.0, 2.0]], &[3.0]);
        assert!(matches!(result, Err(SolveError::ShapeMismatch { .. })));
    }
}
