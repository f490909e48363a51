mod config;

use clap::{Parser, Subcommand};
use prodmix_plan::{PlanError, PlanReport, ProductionPlan, Severity};
use prodmix_solver::{PivotRule, SolutionStatus, SolveError};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "prodmix")]
#[command(about = "Plan a profit-maximizing production mix", long_about = None)]
struct Cli {
    /// Configuration file (TOML) with [solver] and [logging] sections
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Log level filter, overridden by RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Log format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a plan file and output the optimal production mix
    Solve {
        /// The plan file (.json or .toml)
        file: PathBuf,
        /// Output format (pretty, json)
        #[arg(short, long, default_value = "pretty")]
        format: String,
        /// Show detailed analysis
        #[arg(short, long)]
        analysis: bool,
        /// Treat magnitudes below this as zero
        #[arg(long)]
        tolerance: Option<f64>,
        /// Maximum number of pivots
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Use Bland's rule instead of the largest reduced cost
        #[arg(long)]
        bland: bool,
        /// Search for a feasible start when an availability is negative
        #[arg(long)]
        phase_one: bool,
    },
    /// Check a plan file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
    /// Print the example plan
    Example {
        /// Output format (toml, json)
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    config.logging.init();

    match cli.command {
        Commands::Solve {
            file,
            format,
            analysis,
            tolerance,
            max_iterations,
            bland,
            phase_one,
        } => {
            let plan = load_plan(&file);

            let mut settings = config.solver;
            if let Some(tol) = tolerance {
                settings.tolerance = tol;
            }
            if let Some(max) = max_iterations {
                settings.max_iterations = Some(max);
            }
            if bland {
                settings.pivot_rule = PivotRule::Bland;
            }
            if phase_one {
                settings.phase_one = true;
            }
            debug!(?settings, plan = %file.display(), "solving");

            let report = match prodmix_plan::solve_plan(&plan, &settings.solver()) {
                Ok(r) => r,
                Err(PlanError::Solve(SolveError::IterationLimitExceeded { limit })) => {
                    eprintln!(
                        "Solver error: internal limit reached after {} pivots without converging",
                        limit
                    );
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            if format == "json" {
                match report.to_json() {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                print_report(&report, analysis);
            }

            if !report.is_optimal() {
                std::process::exit(1);
            }
        }
        Commands::Check { file } => {
            let plan = load_plan(&file);
            let diagnostics = plan.validate();
            let errors: Vec<_> = diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .collect();

            if errors.is_empty() {
                println!("✓ {} is valid", file.display());
                println!("  {} resources", plan.resources.len());
                println!("  {} products", plan.products.len());
                for d in &diagnostics {
                    println!("  warning: {}", d.message);
                }
            } else {
                eprintln!("✗ {} has errors:", file.display());
                for d in errors {
                    eprintln!("  {}", d.message);
                }
                std::process::exit(1);
            }
        }
        Commands::Example { format } => {
            let plan = ProductionPlan::sample();
            let output = if format == "json" {
                serde_json::to_string_pretty(&plan).map_err(|e| e.to_string())
            } else {
                toml::to_string(&plan).map_err(|e| e.to_string())
            };
            match output {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn load_plan(file: &Path) -> ProductionPlan {
    match ProductionPlan::load(file) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error reading plan {}: {}", file.display(), e);
            std::process::exit(1);
        }
    }
}

fn print_report(report: &PlanReport, analysis: bool) {
    if let Some(ref name) = report.plan {
        println!("Plan: {}", name);
    }

    match report.status {
        SolutionStatus::Optimal => {
            println!("Status: OPTIMAL");
            println!("Total profit: {:.2}", report.total_profit);
            println!("Iterations: {}", report.iterations);
            println!();
            println!("Production:");
            for p in &report.products {
                if p.quantity > 0.001 {
                    println!("  {:20} {:10.2}   profit {:10.2}", p.name, p.quantity, p.profit);
                }
            }
            println!();
            println!("Resources:");
            for r in &report.resources {
                println!(
                    "  {:20} {:10.2} / {:<10.2} slack {:10.2}   dual price {:8.4}",
                    r.name, r.used, r.available, r.slack, r.dual_price
                );
            }

            if analysis {
                println!();
                println!("Analysis:");
                println!();

                let binding: Vec<_> = report.resources.iter().filter(|r| r.binding).collect();
                if !binding.is_empty() {
                    println!("Binding resources (pinch points):");
                    for r in binding {
                        println!("  - {}", r.name);
                        if let Some(range) = r.available_range {
                            println!(
                                "    dual price {:.4} holds for availability in [{}, {}]",
                                r.dual_price,
                                bound(range.lower),
                                bound(range.upper)
                            );
                        }
                        if let (Some(cost), Some(true)) = (r.unit_cost, r.worth_acquiring) {
                            println!(
                                "    worth acquiring: each unit adds {:.2} at cost {:.2}",
                                r.dual_price, cost
                            );
                        }
                    }
                    println!();
                }

                println!("Reduced costs (products not in plan):");
                for p in &report.products {
                    if p.quantity <= 0.001 && p.reduced_cost > 0.001 {
                        println!(
                            "  {:20} profit must increase by {:.2} to enter plan",
                            p.name, p.reduced_cost
                        );
                    }
                }
                println!();

                println!("Profit ranges:");
                for p in &report.products {
                    if let Some(range) = p.profit_range {
                        println!(
                            "  {:20} [{}, {}]",
                            p.name,
                            bound(range.lower),
                            bound(range.upper)
                        );
                    }
                }
            }
        }
        SolutionStatus::Infeasible => {
            println!("Status: INFEASIBLE");
            println!("No feasible production plan satisfies every resource limit.");
            for v in &report.violations {
                println!(
                    "  {:20} requires {:.2} but only {:.2} is available (short by {:.2})",
                    v.resource, v.required, v.available, v.shortfall
                );
            }
        }
        SolutionStatus::Unbounded => {
            println!("Status: UNBOUNDED");
            println!("The problem is unbounded: profit can grow without limit.");
        }
    }
}

fn bound(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "unlimited".to_string(),
    }
}
