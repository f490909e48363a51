use crate::error::SolveError;

/// The result of solving a production-mix problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Total profit at the reported point
    pub objective_value: f64,
    /// Quantity of each variable
    pub variables: Vec<f64>,
    /// Unused amount of each constraint's right-hand side
    pub slacks: Vec<f64>,
    /// Marginal profit of one more unit of each constraint's right-hand side
    pub dual_prices: Vec<f64>,
    /// Number of pivots performed
    pub iterations: usize,
    /// Detailed analysis (populated when optimal)
    pub analysis: Analysis,
    /// Constraint violations (populated when infeasible)
    pub violations: Vec<ConstraintViolation>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// A finite optimum was found
    Optimal,
    /// No point satisfies the constraints
    Infeasible,
    /// The objective grows without limit
    Unbounded,
}

/// Detailed analysis of the optimal solution
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    /// Reduced costs for each variable
    /// For non-basic variables, indicates how much profit must rise to enter the solution
    pub reduced_costs: Vec<ReducedCost>,

    /// Indices of constraints that are tight at the optimum
    pub binding_constraints: Vec<usize>,

    /// Ranges for each profit coefficient over which the basis stays optimal
    pub objective_ranges: Vec<SensitivityRange>,

    /// Ranges for each availability over which the dual prices stay valid
    pub rhs_ranges: Vec<SensitivityRange>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedCost {
    /// Variable index
    pub variable: usize,
    /// Current value in solution
    pub value: f64,
    /// Reduced cost (never positive at an optimum)
    pub reduced_cost: f64,
    /// Is this variable in the basis?
    pub is_basic: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityRange {
    /// Current value
    pub current: f64,
    /// Lower bound of range where solution structure stays same
    pub lower_bound: f64,
    /// Upper bound of range where solution structure stays same
    pub upper_bound: f64,
}

/// Information about a violated constraint
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    /// Constraint index
    pub constraint: usize,
    /// Required value (from constraint RHS)
    pub required: f64,
    /// Actual value achieved
    pub actual: f64,
    /// How much the constraint is violated by
    pub violation_amount: f64,
}

impl Solution {
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Turn a non-optimal status into the matching error.
    pub fn into_result(self) -> Result<Solution, SolveError> {
        match self.status {
            SolutionStatus::Optimal => Ok(self),
            SolutionStatus::Infeasible => Err(SolveError::Infeasible),
            SolutionStatus::Unbounded => Err(SolveError::Unbounded),
        }
    }

    pub(crate) fn infeasible(
        variables: Vec<f64>,
        slacks: Vec<f64>,
        iterations: usize,
        violations: Vec<ConstraintViolation>,
    ) -> Self {
        let m = slacks.len();
        Self {
            status: SolutionStatus::Infeasible,
            objective_value: 0.0,
            variables,
            slacks,
            dual_prices: vec![0.0; m],
            iterations,
            analysis: Analysis::default(),
            violations,
        }
    }

    pub(crate) fn unbounded(
        objective_value: f64,
        variables: Vec<f64>,
        slacks: Vec<f64>,
        iterations: usize,
    ) -> Self {
        let m = slacks.len();
        Self {
            status: SolutionStatus::Unbounded,
            objective_value,
            variables,
            slacks,
            dual_prices: vec![0.0; m],
            iterations,
            analysis: Analysis::default(),
            violations: Vec::new(),
        }
    }
}

impl SensitivityRange {
    /// Whether `value` lies inside the range, bounds included.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower_bound && value <= self.upper_bound
    }
}
