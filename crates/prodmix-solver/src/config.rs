use crate::simplex::Solver;

/// Rule used to choose the entering and leaving variables at each pivot
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PivotRule {
    /// Most positive reduced cost, lowest row index on ratio ties
    #[default]
    Dantzig,
    /// Lowest improving column, lowest basic variable on ratio ties.
    /// Never cycles.
    Bland,
}

/// Solver settings as they appear in a configuration file
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Magnitudes below this are treated as zero
    pub tolerance: f64,
    /// Pivot cap; `None` means `10 * (variables + constraints)`
    pub max_iterations: Option<usize>,
    pub pivot_rule: PivotRule,
    /// Search for a feasible basis when some availability is negative
    pub phase_one: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_iterations: None,
            pivot_rule: PivotRule::Dantzig,
            phase_one: false,
        }
    }
}

impl SolverConfig {
    pub fn solver(&self) -> Solver {
        let solver = Solver::new()
            .with_tolerance(self.tolerance)
            .with_pivot_rule(self.pivot_rule)
            .with_phase_one(self.phase_one);
        match self.max_iterations {
            Some(max) => solver.with_max_iterations(max),
            None => solver,
        }
    }
}
