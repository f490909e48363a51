use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use prodmix_solver::{Problem, SolveError, Solver};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::report::PlanReport;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON plan: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid TOML plan: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid plan: {0}")]
    Invalid(String),
    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// A resource the products compete for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    /// Quantity on hand
    pub available: f64,
    /// Purchase price of one more unit, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,
}

/// A product and what one unit of it consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    /// Profit per unit produced
    pub profit: f64,
    /// Resource name -> amount consumed per unit; missing resources are unused
    #[serde(default)]
    pub usage: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl ProductionPlan {
    pub fn from_json(source: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_toml(source: &str) -> Result<Self, PlanError> {
        Ok(toml::from_str(source)?)
    }

    /// Load a plan file; `.toml` files are read as TOML, everything else as JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlanError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        debug!(path = %path.display(), toml = is_toml, "loading plan");
        if is_toml {
            Self::from_toml(&source)
        } else {
            Self::from_json(&source)
        }
    }

    /// Three products sharing three resources
    pub fn sample() -> Self {
        let resource = |name: &str, available, unit_cost| Resource {
            name: name.to_string(),
            available,
            unit_cost: Some(unit_cost),
        };
        let product = |name: &str, profit, usage: [f64; 3]| Product {
            name: name.to_string(),
            profit,
            usage: ["assembly", "labor", "finishing"]
                .iter()
                .zip(usage)
                .map(|(r, amount)| (r.to_string(), amount))
                .collect(),
        };

        Self {
            name: Some("workshop".to_string()),
            resources: vec![
                resource("assembly", 200.0, 15.0),
                resource("labor", 480.0, 8.0),
                resource("finishing", 80.0, 25.0),
            ],
            products: vec![
                product("desk", 120.0, [4.0, 8.0, 2.0]),
                product("table", 60.0, [2.0, 6.0, 1.5]),
                product("chair", 40.0, [1.5, 1.0, 0.5]),
            ],
        }
    }

    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if self.products.is_empty() {
            diagnostics.push(Diagnostic::error("Plan has no products"));
        }
        if self.resources.is_empty() && !self.products.is_empty() {
            diagnostics.push(Diagnostic::warning(
                "Plan has no resources; any profitable product is unbounded",
            ));
        }

        let mut seen = HashSet::new();
        for r in &self.resources {
            if !seen.insert(r.name.as_str()) {
                diagnostics.push(Diagnostic::error(format!("Duplicate resource: {}", r.name)));
            }
            if !r.available.is_finite() {
                diagnostics.push(Diagnostic::error(format!(
                    "Resource {} has a non-finite availability",
                    r.name
                )));
            } else if r.available < 0.0 {
                diagnostics.push(Diagnostic::warning(format!(
                    "Resource {} has negative availability {}; no production plan can satisfy it",
                    r.name, r.available
                )));
            }
            if let Some(cost) = r.unit_cost {
                if !cost.is_finite() {
                    diagnostics.push(Diagnostic::error(format!(
                        "Resource {} has a non-finite unit cost",
                        r.name
                    )));
                }
            }
        }

        let mut products = HashSet::new();
        let mut used = HashSet::new();
        for p in &self.products {
            if !products.insert(p.name.as_str()) {
                diagnostics.push(Diagnostic::error(format!("Duplicate product: {}", p.name)));
            }
            if !p.profit.is_finite() {
                diagnostics.push(Diagnostic::error(format!(
                    "Product {} has a non-finite profit",
                    p.name
                )));
            }
            for (resource, &amount) in &p.usage {
                if !seen.contains(resource.as_str()) {
                    diagnostics.push(Diagnostic::error(format!(
                        "Product {} uses unknown resource {}",
                        p.name, resource
                    )));
                } else if !amount.is_finite() {
                    diagnostics.push(Diagnostic::error(format!(
                        "Product {} has a non-finite usage of {}",
                        p.name, resource
                    )));
                }
                if amount > 0.0 {
                    used.insert(resource.as_str());
                }
            }
            if p.profit > 0.0 && !p.usage.values().any(|&amount| amount > 0.0) {
                diagnostics.push(Diagnostic::warning(format!(
                    "Product {} is profitable but consumes nothing; the plan is unbounded",
                    p.name
                )));
            }
        }

        for r in &self.resources {
            if !used.contains(r.name.as_str()) {
                diagnostics.push(Diagnostic::warning(format!(
                    "Resource {} is not used by any product",
                    r.name
                )));
            }
        }

        diagnostics
    }

    /// Reshape into an LP: one variable per product, one row per resource,
    /// both in declaration order.
    pub fn to_problem(&self) -> Result<Problem, PlanError> {
        if let Some(diagnostic) = self
            .validate()
            .into_iter()
            .find(|d| d.severity == Severity::Error)
        {
            return Err(PlanError::Invalid(diagnostic.message));
        }

        let profits = self.products.iter().map(|p| p.profit).collect();
        let constraints = self
            .resources
            .iter()
            .map(|r| {
                self.products
                    .iter()
                    .map(|p| p.usage.get(&r.name).copied().unwrap_or(0.0))
                    .collect()
            })
            .collect();
        let availabilities = self.resources.iter().map(|r| r.available).collect();

        Ok(Problem::new(profits, constraints, availabilities))
    }
}

/// Validate, reshape and solve `plan`.
pub fn solve_plan(plan: &ProductionPlan, solver: &Solver) -> Result<PlanReport, PlanError> {
    let problem = plan.to_problem()?;
    let solution = solver.solve(&problem)?;
    info!(
        plan = plan.name.as_deref().unwrap_or("unnamed"),
        status = ?solution.status,
        profit = solution.objective_value,
        iterations = solution.iterations,
        "plan solved"
    );
    Ok(PlanReport::build(plan, &solution))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_reshapes_into_problem() {
        let problem = ProductionPlan::sample().to_problem().unwrap();

        assert_eq!(problem.profits, vec![120.0, 60.0, 40.0]);
        assert_eq!(
            problem.constraints,
            vec![
                vec![4.0, 2.0, 1.5],
                vec![8.0, 6.0, 1.0],
                vec![2.0, 1.5, 0.5],
            ]
        );
        assert_eq!(problem.availabilities, vec![200.0, 480.0, 80.0]);
        assert!(ProductionPlan::sample().validate().is_empty());
    }

    #[test]
    fn test_missing_usage_is_zero() {
        let plan = ProductionPlan::from_json(
            r#"{
                "resources": [
                    { "name": "wood", "available": 10 },
                    { "name": "paint", "available": 4 }
                ],
                "products": [
                    { "name": "crate", "profit": 3, "usage": { "wood": 2 } },
                    { "name": "sign", "profit": 5, "usage": { "wood": 1, "paint": 1 } }
                ]
            }"#,
        )
        .unwrap();

        let problem = plan.to_problem().unwrap();
        assert_eq!(problem.constraints, vec![vec![2.0, 1.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_parse_toml() {
        let source = r#"
            name = "bakery"

            [[resources]]
            name = "flour"
            available = 50
            unit_cost = 1.5

            [[products]]
            name = "bread"
            profit = 4.0
            usage = { flour = 2 }
        "#;

        let plan = ProductionPlan::from_toml(source).unwrap();
        assert_eq!(plan.name.as_deref(), Some("bakery"));
        assert_eq!(plan.resources[0].unit_cost, Some(1.5));
        assert_eq!(plan.products[0].usage["flour"], 2.0);
    }

    #[test]
    fn test_unknown_resource_is_rejected() {
        let mut plan = ProductionPlan::sample();
        plan.products[0].usage.insert("steel".to_string(), 1.0);

        let err = plan.to_problem().unwrap_err();
        assert!(err.to_string().contains("unknown resource steel"), "{}", err);
    }

    #[test]
    fn test_duplicate_names_are_errors() {
        let mut plan = ProductionPlan::sample();
        plan.resources.push(plan.resources[0].clone());
        plan.products.push(plan.products[1].clone());

        let errors: Vec<_> = plan
            .validate()
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("Duplicate resource: assembly"));
        assert!(errors[1].message.contains("Duplicate product: table"));
    }

    #[test]
    fn test_warnings_do_not_block_solving() {
        let mut plan = ProductionPlan::sample();
        plan.resources[1].available = -5.0;

        let diagnostics = plan.validate();
        assert!(diagnostics.iter().all(|d| d.severity == Severity::Warning));
        assert_eq!(diagnostics.len(), 1);

        let report = solve_plan(&plan, &Solver::new()).unwrap();
        assert!(!report.is_optimal());
    }

    #[test]
    fn test_empty_plan_is_invalid() {
        let plan = ProductionPlan::default();
        assert!(matches!(plan.to_problem(), Err(PlanError::Invalid(_))));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::TempDir::new().unwrap();

        let json = dir.path().join("plan.json");
        std::fs::write(&json, serde_json::to_string(&ProductionPlan::sample()).unwrap()).unwrap();
        let toml_path = dir.path().join("plan.toml");
        std::fs::write(&toml_path, toml::to_string(&ProductionPlan::sample()).unwrap()).unwrap();

        assert_eq!(ProductionPlan::load(&json).unwrap(), ProductionPlan::sample());
        assert_eq!(ProductionPlan::load(&toml_path).unwrap(), ProductionPlan::sample());
        assert!(matches!(
            ProductionPlan::load(dir.path().join("missing.json")),
            Err(PlanError::Io(_))
        ));
    }
}
