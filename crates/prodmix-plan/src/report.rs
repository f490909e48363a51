use prodmix_solver::{SensitivityRange, Solution, SolutionStatus};
use serde::{Deserialize, Serialize};

use crate::plan::ProductionPlan;

/// Solution of a plan with every number attached to its product or resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    pub status: SolutionStatus,
    pub total_profit: f64,
    pub iterations: usize,
    pub products: Vec<ProductResult>,
    pub resources: Vec<ResourceResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ViolationResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResult {
    pub name: String,
    pub quantity: f64,
    pub unit_profit: f64,
    /// `quantity * unit_profit`
    pub profit: f64,
    /// How much the unit profit must rise before an idle product is worth making
    pub reduced_cost: f64,
    /// Unit profits over which the same products stay in the plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_range: Option<Range>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceResult {
    pub name: String,
    pub available: f64,
    pub used: f64,
    pub slack: f64,
    /// Extra profit from one more unit of this resource
    pub dual_price: f64,
    pub binding: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,
    /// The dual price exceeds the purchase price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worth_acquiring: Option<bool>,
    /// Availabilities over which the dual price holds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_range: Option<Range>,
}

/// A resource limit exceeded at the reported point. `required` is the usage
/// at that point, not a demand from the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationResult {
    pub resource: String,
    /// The resource's availability
    pub available: f64,
    /// Usage of the resource at the reported point
    pub required: f64,
    /// `required - available`
    pub shortfall: f64,
}

/// Closed interval; `None` marks an unlimited side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl From<&SensitivityRange> for Range {
    fn from(range: &SensitivityRange) -> Self {
        let finite = |v: f64| v.is_finite().then_some(v);
        Self {
            lower: finite(range.lower_bound),
            upper: finite(range.upper_bound),
        }
    }
}

impl PlanReport {
    /// Pair `solution` with the names in `plan`; `solution` must come from
    /// `plan.to_problem()`.
    pub fn build(plan: &ProductionPlan, solution: &Solution) -> Self {
        let analysis = &solution.analysis;

        let products = plan
            .products
            .iter()
            .enumerate()
            .map(|(j, product)| {
                let quantity = solution.variables.get(j).copied().unwrap_or(0.0);
                ProductResult {
                    name: product.name.clone(),
                    quantity,
                    unit_profit: product.profit,
                    profit: quantity * product.profit,
                    reduced_cost: analysis
                        .reduced_costs
                        .get(j)
                        .map(|rc| -rc.reduced_cost)
                        .unwrap_or(0.0),
                    profit_range: analysis.objective_ranges.get(j).map(Range::from),
                }
            })
            .collect();

        let resources = plan
            .resources
            .iter()
            .enumerate()
            .map(|(i, resource)| {
                let slack = solution.slacks.get(i).copied().unwrap_or(0.0);
                let dual_price = solution.dual_prices.get(i).copied().unwrap_or(0.0);
                let optimal = solution.is_optimal();
                ResourceResult {
                    name: resource.name.clone(),
                    available: resource.available,
                    used: resource.available - slack,
                    slack,
                    dual_price,
                    binding: optimal && analysis.binding_constraints.contains(&i),
                    unit_cost: resource.unit_cost,
                    worth_acquiring: resource
                        .unit_cost
                        .filter(|_| optimal)
                        .map(|cost| dual_price > cost),
                    available_range: analysis.rhs_ranges.get(i).map(Range::from),
                }
            })
            .collect();

        let violations = solution
            .violations
            .iter()
            .filter_map(|v| {
                plan.resources.get(v.constraint).map(|resource| ViolationResult {
                    resource: resource.name.clone(),
                    available: v.required,
                    required: v.actual,
                    shortfall: v.violation_amount,
                })
            })
            .collect();

        Self {
            plan: plan.name.clone(),
            status: solution.status,
            total_profit: solution.objective_value,
            iterations: solution.iterations,
            products,
            resources,
            violations,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::solve_plan;
    use prodmix_solver::Solver;

    fn sample_report() -> PlanReport {
        solve_plan(&ProductionPlan::sample(), &Solver::new()).unwrap()
    }

    #[test]
    fn test_report_names_every_number() {
        let report = sample_report();

        assert!(report.is_optimal());
        assert_eq!(report.plan.as_deref(), Some("workshop"));
        assert!((report.total_profit - 5600.0).abs() < 1e-6);

        let desk = &report.products[0];
        assert_eq!(desk.name, "desk");
        assert!((desk.quantity - 20.0).abs() < 1e-6);
        assert!((desk.profit - 2400.0).abs() < 1e-6);

        let table = &report.products[1];
        assert_eq!(table.quantity, 0.0);
        assert!((table.reduced_cost - 10.0).abs() < 1e-6);

        let labor = &report.resources[1];
        assert_eq!(labor.name, "labor");
        assert!((labor.used - 240.0).abs() < 1e-6);
        assert!((labor.slack - 240.0).abs() < 1e-6);
        assert!(!labor.binding);
        assert_eq!(labor.dual_price, 0.0);
        assert_eq!(labor.available_range.unwrap().upper, None);
    }

    #[test]
    fn test_worth_acquiring_compares_dual_price_with_cost() {
        let report = sample_report();
        let flags: Vec<_> = report.resources.iter().map(|r| r.worth_acquiring).collect();

        // assembly is worth 20 at cost 15; finishing is worth 20 at cost 25
        assert_eq!(flags, vec![Some(true), Some(false), Some(false)]);
        assert!(report.resources[0].binding);
        assert!(report.resources[2].binding);
    }

    #[test]
    fn test_infeasible_report_lists_shortfalls() {
        let mut plan = ProductionPlan::sample();
        plan.resources[2].available = -10.0;

        let report = solve_plan(&plan, &Solver::new()).unwrap();
        assert_eq!(report.status, SolutionStatus::Infeasible);
        assert_eq!(report.violations.len(), 1);
        let finishing = &report.violations[0];
        assert_eq!(finishing.resource, "finishing");
        assert_eq!(finishing.available, -10.0);
        assert_eq!(finishing.required, 0.0);
        assert!((finishing.shortfall - 10.0).abs() < 1e-6);
        assert!(report.resources.iter().all(|r| r.worth_acquiring.is_none()));
    }

    #[test]
    fn test_json_uses_null_for_unlimited_ranges() {
        let json = sample_report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "Optimal");
        assert_eq!(value["resources"][1]["available_range"]["upper"], serde_json::Value::Null);
        assert_eq!(value["products"][1]["profit_range"]["lower"], serde_json::Value::Null);
        assert!(value.get("violations").is_none());
    }
}
