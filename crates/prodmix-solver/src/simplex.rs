use tracing::{debug, trace};

use crate::config::PivotRule;
use crate::error::SolveError;
use crate::problem::Problem;
use crate::solution::{
    Analysis, ConstraintViolation, ReducedCost, SensitivityRange, Solution, SolutionStatus,
};

/// Simplex solver for production-mix problems
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solver {
    /// Maximum pivots before giving up, `10 * (n + m)` when unset
    max_iterations: Option<usize>,
    /// Tolerance for floating point comparisons
    tolerance: f64,
    /// Entering/leaving variable selection
    pivot_rule: PivotRule,
    /// Run an artificial-variable phase for negative availabilities
    phase_one: bool,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: None,
            tolerance: 1e-9,
            pivot_rule: PivotRule::Dantzig,
            phase_one: false,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_pivot_rule(mut self, rule: PivotRule) -> Self {
        self.pivot_rule = rule;
        self
    }

    pub fn with_phase_one(mut self, enabled: bool) -> Self {
        self.phase_one = enabled;
        self
    }

    /// Pivot cap applied to `problem`
    pub fn iteration_limit(&self, problem: &Problem) -> usize {
        self.max_iterations
            .unwrap_or(10 * (problem.num_variables() + problem.num_constraints()))
    }

    /// Maximize `problem` with the primal simplex method.
    ///
    /// Infeasible and unbounded problems come back as a [`Solution`] with the
    /// matching status. Malformed input and exhausted pivot budgets are errors.
    pub fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        problem.validate()?;

        let n = problem.num_variables();
        let m = problem.num_constraints();
        let limit = self.iteration_limit(problem);
        debug!(variables = n, constraints = m, limit, rule = ?self.pivot_rule, "solving");

        let negative_rhs = problem
            .availabilities
            .iter()
            .any(|&b| b < -self.tolerance);
        if negative_rhs && !self.phase_one {
            // The all-slack basis is the only starting point without phase one
            let origin = vec![0.0; n];
            let violations = self.find_violations(problem, &origin);
            debug!(
                violations = violations.len(),
                "negative availability, no feasible starting basis"
            );
            let slacks = self.slacks(problem, &origin);
            return Ok(Solution::infeasible(origin, slacks, 0, violations));
        }

        let mut tableau = Tableau::new(problem, self.tolerance);
        let mut pivots = Pivots { count: 0, limit };

        if tableau.n_artificial > 0 && !self.phase1(&mut tableau, &mut pivots)? {
            let values = tableau.values();
            let violations = self.find_violations(problem, &values);
            debug!(
                violations = violations.len(),
                iterations = pivots.count,
                "phase one found no feasible basis"
            );
            let slacks = self.slacks(problem, &values);
            return Ok(Solution::infeasible(values, slacks, pivots.count, violations));
        }

        let structural = tableau.n_vars + tableau.n_slack;
        match self.run(&mut tableau, structural, &mut pivots)? {
            SimplexResult::Optimal => {}
            SimplexResult::Unbounded => {
                let values = tableau.values();
                let objective_value = problem.objective(&values);
                debug!(iterations = pivots.count, "unbounded");
                let slacks = self.slacks(problem, &values);
                return Ok(Solution::unbounded(objective_value, values, slacks, pivots.count));
            }
        }

        let solution = self.extract_solution(&tableau, problem, pivots.count);
        debug!(objective = solution.objective_value, iterations = pivots.count, "optimal");
        Ok(solution)
    }

    /// Pivot until no column below `eligible` improves the objective row.
    fn run(
        &self,
        tableau: &mut Tableau,
        eligible: usize,
        pivots: &mut Pivots,
    ) -> Result<SimplexResult, SolveError> {
        loop {
            let Some(pivot_col) = self.find_pivot_column(tableau, eligible) else {
                return Ok(SimplexResult::Optimal);
            };
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col) else {
                return Ok(SimplexResult::Unbounded);
            };
            pivots.step()?;
            trace!(
                iteration = pivots.count,
                entering = pivot_col,
                leaving = tableau.basic_vars[pivot_row],
                "pivot"
            );
            tableau.pivot(pivot_row, pivot_col);
        }
    }

    /// Find a feasible basis by driving the artificial variables to zero.
    /// Returns false when that is impossible.
    fn phase1(&self, tableau: &mut Tableau, pivots: &mut Pivots) -> Result<bool, SolveError> {
        let obj_row = tableau.obj_row();
        let n_constraints = tableau.basic_vars.len();
        let n_cols = tableau.width();
        let rhs_col = tableau.rhs_col();
        let art_start = tableau.n_vars + tableau.n_slack;

        // Maximize -sum(artificials)
        let original = std::mem::replace(&mut tableau.data[obj_row], vec![0.0; n_cols]);
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[obj_row][j] = -1.0;
        }
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] += tableau.data[i][j];
                }
            }
        }

        if let SimplexResult::Unbounded = self.run(tableau, rhs_col, pivots)? {
            return Ok(false);
        }

        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start && tableau.data[i][rhs_col] > self.tolerance {
                return Ok(false);
            }
        }

        // Artificials left in the basis sit at zero; swap them for any real column
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start {
                let pivot_col = (0..art_start).find(|&j| tableau.data[i][j].abs() > self.tolerance);
                if let Some(col) = pivot_col {
                    tableau.pivot(i, col);
                }
            }
        }

        tableau.data[obj_row] = original;
        for i in 0..n_constraints {
            let basic = tableau.basic_vars[i];
            let ratio = tableau.data[obj_row][basic];
            if ratio != 0.0 {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] -= ratio * tableau.data[i][j];
                }
            }
        }

        Ok(true)
    }

    fn find_pivot_column(&self, tableau: &Tableau, eligible: usize) -> Option<usize> {
        let objective = &tableau.data[tableau.obj_row()];

        match self.pivot_rule {
            PivotRule::Dantzig => {
                // Most positive reduced cost, first one wins ties
                let mut max_val = self.tolerance;
                let mut max_col = None;
                for (j, &value) in objective.iter().enumerate().take(eligible) {
                    if value > max_val {
                        max_val = value;
                        max_col = Some(j);
                    }
                }
                max_col
            }
            PivotRule::Bland => objective
                .iter()
                .take(eligible)
                .position(|&value| value > self.tolerance),
        }
    }

    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.rhs_col();

        let mut min_ratio = f64::INFINITY;
        let mut min_row: Option<usize> = None;

        for i in 0..tableau.basic_vars.len() {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = tableau.data[i][rhs_col] / val;
            let better = match min_row {
                None => true,
                Some(best) => {
                    ratio < min_ratio - self.tolerance
                        || (self.pivot_rule == PivotRule::Bland
                            && ratio <= min_ratio + self.tolerance
                            && tableau.basic_vars[i] < tableau.basic_vars[best])
                }
            };
            if better {
                min_ratio = ratio;
                min_row = Some(i);
            }
        }

        min_row
    }

    /// `availabilities - constraints · values`; entries within roundoff of
    /// zero, relative to the availability, are snapped to zero
    fn slacks(&self, problem: &Problem, values: &[f64]) -> Vec<f64> {
        (0..problem.num_constraints())
            .map(|i| {
                let rhs = problem.availabilities[i];
                let slack = rhs - problem.activity(i, values);
                if slack.abs() <= self.scaled_tolerance(rhs) { 0.0 } else { slack }
            })
            .collect()
    }

    fn find_violations(&self, problem: &Problem, values: &[f64]) -> Vec<ConstraintViolation> {
        let mut violations: Vec<ConstraintViolation> = (0..problem.num_constraints())
            .filter_map(|i| {
                let lhs = problem.activity(i, values);
                let rhs = problem.availabilities[i];
                (lhs > rhs + self.tolerance).then(|| ConstraintViolation {
                    constraint: i,
                    required: rhs,
                    actual: lhs,
                    violation_amount: lhs - rhs,
                })
            })
            .collect();

        // Worst first
        violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));
        violations
    }

    fn extract_solution(
        &self,
        tableau: &Tableau,
        problem: &Problem,
        iterations: usize,
    ) -> Solution {
        let n_vars = problem.num_variables();
        let obj_row = tableau.obj_row();

        let variables = tableau.values();
        let slacks = self.slacks(problem, &variables);
        let rhs_col = tableau.rhs_col();

        // Binding rows and prices come from the final basis: a non-basic slack
        // sits at zero and prices at its negated reduced cost, a basic slack
        // prices at zero and binds only at a degenerate zero level
        let mut binding = Vec::new();
        let mut dual_prices = Vec::with_capacity(problem.num_constraints());
        for i in 0..problem.num_constraints() {
            let col = n_vars + i;
            match tableau.basic_row(col) {
                None => {
                    binding.push(i);
                    dual_prices.push(self.clean(-tableau.data[obj_row][col]));
                }
                Some(row) => {
                    let level = tableau.data[row][rhs_col].abs();
                    if level <= self.scaled_tolerance(problem.availabilities[i]) {
                        binding.push(i);
                    }
                    dual_prices.push(0.0);
                }
            }
        }

        let objective_value = problem.objective(&variables);
        let analysis = self.analyze(tableau, problem, &variables, binding);

        Solution {
            status: SolutionStatus::Optimal,
            objective_value,
            variables,
            slacks,
            dual_prices,
            iterations,
            analysis,
            violations: Vec::new(),
        }
    }

    fn analyze(
        &self,
        tableau: &Tableau,
        problem: &Problem,
        values: &[f64],
        binding_constraints: Vec<usize>,
    ) -> Analysis {
        let n_vars = problem.num_variables();
        let n_constraints = problem.num_constraints();
        let structural = n_vars + n_constraints;
        let obj_row = tableau.obj_row();
        let rhs_col = tableau.rhs_col();
        let objective = &tableau.data[obj_row];

        let mut basis_row = vec![None; tableau.width()];
        for (row, &basic) in tableau.basic_vars.iter().enumerate() {
            basis_row[basic] = Some(row);
        }

        let reduced_costs = (0..n_vars)
            .map(|j| {
                let is_basic = basis_row[j].is_some();
                ReducedCost {
                    variable: j,
                    value: values[j],
                    reduced_cost: if is_basic { 0.0 } else { self.clean(objective[j]) },
                    is_basic,
                }
            })
            .collect::<Vec<_>>();

        // Profit ranging: how far c_j moves before some reduced cost turns positive
        let objective_ranges = (0..n_vars)
            .map(|j| {
                let current = problem.profits[j];
                match basis_row[j] {
                    None => SensitivityRange {
                        current,
                        lower_bound: f64::NEG_INFINITY,
                        upper_bound: current - reduced_costs[j].reduced_cost,
                    },
                    Some(row) => {
                        let mut down = f64::NEG_INFINITY;
                        let mut up = f64::INFINITY;
                        for k in (0..structural).filter(|&k| basis_row[k].is_none()) {
                            let a = tableau.data[row][k];
                            let rc = objective[k].min(0.0);
                            if a > self.tolerance {
                                down = down.max(rc / a);
                            } else if a < -self.tolerance {
                                up = up.min(rc / a);
                            }
                        }
                        SensitivityRange {
                            current,
                            lower_bound: current + down,
                            upper_bound: current + up,
                        }
                    }
                }
            })
            .collect();

        // Availability ranging: x_B + delta * (slack column) must stay non-negative
        let rhs_ranges = (0..n_constraints)
            .map(|i| {
                let col = n_vars + i;
                let current = problem.availabilities[i];
                let mut down = f64::NEG_INFINITY;
                let mut up = f64::INFINITY;
                for row in 0..tableau.basic_vars.len() {
                    let d = tableau.data[row][col];
                    let x = tableau.data[row][rhs_col].max(0.0);
                    if d > self.tolerance {
                        down = down.max(-x / d);
                    } else if d < -self.tolerance {
                        up = up.min(-x / d);
                    }
                }
                SensitivityRange {
                    current,
                    lower_bound: current + down,
                    upper_bound: current + up,
                }
            })
            .collect();

        Analysis {
            reduced_costs,
            binding_constraints,
            objective_ranges,
            rhs_ranges,
        }
    }

    /// Absolute tolerance for a quantity on the scale of `magnitude`
    fn scaled_tolerance(&self, magnitude: f64) -> f64 {
        self.tolerance * (1.0 + magnitude.abs())
    }

    fn clean(&self, value: f64) -> f64 {
        if value.abs() < self.tolerance { 0.0 } else { value }
    }
}

/// Dense simplex tableau. Columns are laid out as decision variables, one
/// slack per constraint, artificials, then the right-hand side. The last row
/// holds the reduced costs of the current objective.
struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
}

impl Tableau {
    fn new(problem: &Problem, tolerance: f64) -> Self {
        let n_vars = problem.num_variables();
        let n_constraints = problem.num_constraints();
        let n_artificial = problem
            .availabilities
            .iter()
            .filter(|&&b| b < -tolerance)
            .count();

        let total_cols = n_vars + n_constraints + n_artificial + 1; // +1 for RHS
        let total_rows = n_constraints + 1; // +1 for objective

        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; total_rows],
            basic_vars: vec![0; n_constraints],
            n_vars,
            n_slack: n_constraints,
            n_artificial,
        };

        let rhs_col = total_cols - 1;
        let mut artificial_idx = n_vars + n_constraints;

        for (i, coefficients) in problem.constraints.iter().enumerate() {
            let rhs = problem.availabilities[i];
            let slack_col = n_vars + i;

            if rhs < -tolerance {
                // Negate the row so the right-hand side is positive; the
                // slack then enters with -1 and an artificial takes the basis
                for (j, &coef) in coefficients.iter().enumerate() {
                    tableau.data[i][j] = -coef;
                }
                tableau.data[i][slack_col] = -1.0;
                tableau.data[i][artificial_idx] = 1.0;
                tableau.data[i][rhs_col] = -rhs;
                tableau.basic_vars[i] = artificial_idx;
                artificial_idx += 1;
            } else {
                tableau.data[i][..n_vars].copy_from_slice(coefficients);
                tableau.data[i][slack_col] = 1.0;
                tableau.data[i][rhs_col] = rhs.max(0.0);
                tableau.basic_vars[i] = slack_col;
            }
        }

        // Objective row stores reduced costs; positive entries can improve profit
        tableau.data[n_constraints][..n_vars].copy_from_slice(&problem.profits);

        tableau
    }

    fn width(&self) -> usize {
        self.data[0].len()
    }

    fn rhs_col(&self) -> usize {
        self.width() - 1
    }

    fn obj_row(&self) -> usize {
        self.data.len() - 1
    }

    /// Row in which `col` is basic, if it is
    fn basic_row(&self, col: usize) -> Option<usize> {
        self.basic_vars.iter().position(|&b| b == col)
    }

    /// Decision variable values at the current basis
    fn values(&self) -> Vec<f64> {
        let rhs_col = self.rhs_col();
        let mut values = vec![0.0; self.n_vars];
        for (i, &basic) in self.basic_vars.iter().enumerate() {
            if basic < self.n_vars {
                values[basic] = self.data[i][rhs_col].max(0.0);
            }
        }
        values
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let n_rows = self.data.len();
        let n_cols = self.width();

        // Update basic variable
        self.basic_vars[row] = col;

        // Scale pivot row
        let pivot_val = self.data[row][col];
        for j in 0..n_cols {
            self.data[row][j] /= pivot_val;
        }

        // Eliminate column in other rows
        for i in 0..n_rows {
            if i != row {
                let factor = self.data[i][col];
                if factor != 0.0 {
                    for j in 0..n_cols {
                        self.data[i][j] -= factor * self.data[row][j];
                    }
                }
            }
        }
    }
}

struct Pivots {
    count: usize,
    limit: usize,
}

impl Pivots {
    fn step(&mut self) -> Result<(), SolveError> {
        if self.count >= self.limit {
            return Err(SolveError::IterationLimitExceeded { limit: self.limit });
        }
        self.count += 1;
        Ok(())
    }
}

enum SimplexResult {
    Optimal,
    Unbounded,
}
