//! Build the GridEdge financial model workbook
//!
//! Runs the projection (and optionally the bear / base / bull scenarios) and
//! writes every worksheet into the output directory.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use gridedge_model::assumptions::load_assumptions;
use gridedge_model::projection::month_label;
use gridedge_model::report::write_workbook;
use gridedge_model::{
    Assumptions, ProjectionConfig, ProjectionEngine, ScenarioParams, ScenarioRunner,
};
use rust_decimal_macros::dec;

#[derive(Parser)]
#[command(
    name = "build_model",
    version,
    about = "Project CapEx, monthly cash flow, break-even and ROI for the GridEdge facility"
)]
struct Cli {
    /// JSON assumptions file (built-in GridEdge figures when omitted)
    #[arg(short, long)]
    assumptions: Option<PathBuf>,

    /// Workbook output directory
    #[arg(short, long, default_value = "financial_model")]
    output: PathBuf,

    /// Projection horizon in months (overrides the assumptions file)
    #[arg(long)]
    horizon: Option<u32>,

    /// Also run the bear / base / bull scenarios
    #[arg(long)]
    scenarios: bool,

    /// Log every monthly row at debug level
    #[arg(long)]
    detailed: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let assumptions = match &cli.assumptions {
        Some(path) => load_assumptions(path)
            .with_context(|| format!("Failed to load assumptions from {}", path.display()))?,
        None => Assumptions::gridedge_default(),
    };
    println!(
        "Loaded '{}': {} CapEx items, {} revenue streams, {} expense lines",
        assumptions.name,
        assumptions.capex.len(),
        assumptions.revenues.len(),
        assumptions.expenses.len()
    );

    let engine = ProjectionEngine::new(ProjectionConfig {
        horizon_override: cli.horizon,
        detailed_output: cli.detailed,
    });
    let result = engine.project(&assumptions).context("Projection failed")?;

    let outcomes = if cli.scenarios {
        ScenarioRunner::new(engine.clone())
            .run(&assumptions, &ScenarioParams::standard_set())
            .context("Scenario run failed")?
    } else {
        Vec::new()
    };

    let written = write_workbook(&cli.output, &assumptions, &result, &outcomes)
        .with_context(|| format!("Failed to write workbook to {}", cli.output.display()))?;
    println!("Workbook written to {} ({} files)", cli.output.display(), written.len());

    let summary = &result.summary;
    println!("\nModel Summary:");
    println!("  Total CapEx:          ${:.2}", result.capex_total());
    for (category, amount, share) in result.capex.rows() {
        let share = share.map(|s| format!("{:.1}%", s * dec!(100)));
        println!(
            "    {:<20} ${:.2} ({})",
            category.as_str(),
            amount,
            share.as_deref().unwrap_or("N/A")
        );
    }
    println!("  Annualized Revenue:   ${:.2}", summary.annualized_revenue);
    println!("  Annualized OpEx:      ${:.2}", summary.annualized_opex);
    println!("  Simple ROI:           {}", summary.simple_roi);
    println!("  Break-even:           {}", result.breakeven_label());
    println!("  Final Cumulative:     ${:.2}", summary.final_cumulative);
    if let Some((month, loss)) = summary.max_loss {
        println!("  Maximum Loss:         ${:.2} at {}", loss, month_label(month));
    }

    for outcome in &outcomes {
        println!(
            "  Scenario {:<6} break-even {}, final cumulative ${:.2}",
            outcome.params.name,
            outcome.result.breakeven_label(),
            outcome.result.summary.final_cumulative
        );
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
