//! WASM bindings for prodmix
//!
//! This module exposes the solver and plan pipeline to the browser form
//! that edits resources and products.

use wasm_bindgen::prelude::*;

use crate::plan::{Diagnostic, ProductionPlan, Severity, solve_plan as run_plan};
use prodmix_solver::{Problem, Solver};

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Solve a raw LP. `constraints` is an array of numeric rows.
#[wasm_bindgen]
pub fn solve(
    profits: &[f64],
    constraints: js_sys::Array,
    availabilities: &[f64],
) -> Result<JsValue, JsValue> {
    let rows = constraints
        .iter()
        .map(|row| js_sys::Float64Array::new(&row).to_vec())
        .collect();
    let problem = Problem::new(profits.to_vec(), rows, availabilities.to_vec());
    let solution = Solver::new().solve(&problem).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&solution).map_err(to_js_error)
}

/// Solve a plan given as JSON and return the named report
#[wasm_bindgen]
pub fn solve_plan(source: &str) -> Result<JsValue, JsValue> {
    let plan = ProductionPlan::from_json(source).map_err(to_js_error)?;
    let report = run_plan(&plan, &Solver::new()).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&report).map_err(to_js_error)
}

/// Validate a plan given as JSON and return diagnostics
#[wasm_bindgen]
pub fn validate_plan(source: &str) -> JsValue {
    let diagnostics = match ProductionPlan::from_json(source) {
        Ok(plan) => plan.validate(),
        Err(e) => vec![Diagnostic {
            severity: Severity::Error,
            message: e.to_string(),
        }],
    };
    serde_wasm_bindgen::to_value(&diagnostics).unwrap_or(JsValue::NULL)
}

/// The example plan used to pre-fill the form
#[wasm_bindgen]
pub fn sample_plan() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&ProductionPlan::sample()).map_err(to_js_error)
}
