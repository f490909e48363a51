pub mod plan;
pub mod report;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use plan::{Diagnostic, PlanError, Product, ProductionPlan, Resource, Severity, solve_plan};
pub use report::{PlanReport, ProductResult, Range, ResourceResult, ViolationResult};
