use crate::error::SolveError;

/// A production-mix linear program:
///
/// ```text
/// maximize    profits · x
/// subject to  constraints · x <= availabilities
///             x >= 0
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    /// Objective coefficients, one per variable
    pub profits: Vec<f64>,
    /// Constraint rows, each with one coefficient per variable
    pub constraints: Vec<Vec<f64>>,
    /// Right-hand side of each constraint row
    pub availabilities: Vec<f64>,
}

impl Problem {
    pub fn new(profits: Vec<f64>, constraints: Vec<Vec<f64>>, availabilities: Vec<f64>) -> Self {
        Self {
            profits,
            constraints,
            availabilities,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.profits.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Check that the matrix is rectangular, matches the right-hand side and
    /// holds only finite numbers.
    pub fn validate(&self) -> Result<(), SolveError> {
        let n = self.num_variables();

        if self.constraints.len() != self.availabilities.len() {
            return Err(SolveError::ShapeMismatch {
                what: "availabilities".to_string(),
                expected: self.constraints.len(),
                found: self.availabilities.len(),
            });
        }

        for (row, coefficients) in self.constraints.iter().enumerate() {
            if coefficients.len() != n {
                return Err(SolveError::ShapeMismatch {
                    what: format!("constraint row {}", row),
                    expected: n,
                    found: coefficients.len(),
                });
            }
        }

        let non_finite = self.profits.iter().any(|v| !v.is_finite())
            || self.availabilities.iter().any(|v| !v.is_finite())
            || self.constraints.iter().flatten().any(|v| !v.is_finite());
        if non_finite {
            return Err(SolveError::NonFinite);
        }

        Ok(())
    }

    /// Left-hand side `constraints[row] · values`.
    pub fn activity(&self, row: usize, values: &[f64]) -> f64 {
        self.constraints[row]
            .iter()
            .zip(values)
            .map(|(a, x)| a * x)
            .sum()
    }

    /// Objective `profits · values`.
    pub fn objective(&self, values: &[f64]) -> f64 {
        self.profits.iter().zip(values).map(|(c, x)| c * x).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_rectangular_problem() {
        let problem = Problem::new(
            vec![1.0, 2.0],
            vec![vec![1.0, 1.0], vec![3.0, 0.5]],
            vec![4.0, 6.0],
        );
        assert!(problem.validate().is_ok());
        assert_eq!(problem.num_variables(), 2);
        assert_eq!(problem.num_constraints(), 2);
    }

    #[test]
    fn test_validate_rejects_short_row() {
        let problem = Problem::new(vec![1.0, 2.0], vec![vec![1.0]], vec![4.0]);
        match problem.validate() {
            Err(SolveError::ShapeMismatch { what, expected, found }) => {
                assert_eq!(what, "constraint row 0");
                assert_eq!((expected, found), (2, 1));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_missing_availability() {
        let problem = Problem::new(vec![1.0], vec![vec![1.0], vec![2.0]], vec![4.0]);
        assert!(matches!(
            problem.validate(),
            Err(SolveError::ShapeMismatch { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let problem = Problem::new(vec![f64::NAN], vec![vec![1.0]], vec![4.0]);
        assert!(matches!(problem.validate(), Err(SolveError::NonFinite)));
    }

    #[test]
    fn test_activity_and_objective() {
        let problem = Problem::new(vec![3.0, 2.0], vec![vec![1.0, 4.0]], vec![10.0]);
        assert_eq!(problem.activity(0, &[2.0, 1.0]), 6.0);
        assert_eq!(problem.objective(&[2.0, 1.0]), 8.0);
    }
}
