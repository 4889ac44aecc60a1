//! Render one chart from a previously built workbook
//!
//! Reads the worksheet the chart needs and writes a PNG image.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use gridedge_model::report::{
    read_capex_items, read_capex_subtotals, read_roi_timeline, read_scenario_sheet,
    render_capex_chart, render_capex_detail_chart, render_cashflow_chart,
    render_detailed_cashflow_chart, render_roi_chart, render_scenario_chart, ChartSize,
};

/// Chart types, one per worksheet view
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChartKind {
    /// Horizontal bars of CapEx by category
    Capex,
    /// One bar per CapEx line item, coloured by category
    CapexDetail,
    /// Monthly net cash flow bars
    Cashflow,
    /// Revenue vs OpEx panel above the net cash flow bars
    CashflowDetail,
    /// Cumulative net position with break-even marker
    Roi,
    /// Cumulative net position per scenario
    Scenarios,
}

impl ChartKind {
    fn default_file(self) -> &'static str {
        match self {
            ChartKind::Capex => "capex_breakdown.png",
            ChartKind::CapexDetail => "capex_detailed.png",
            ChartKind::Cashflow => "monthly_cashflow.png",
            ChartKind::CashflowDetail => "detailed_cashflow.png",
            ChartKind::Roi => "roi_timeline.png",
            ChartKind::Scenarios => "scenario_comparison.png",
        }
    }
}

#[derive(Parser)]
#[command(name = "render_chart", version, about = "Render a PNG chart from the GridEdge workbook")]
struct Cli {
    /// Chart to render
    #[arg(value_enum)]
    chart: ChartKind,

    /// Workbook directory written by build_model
    #[arg(short, long, default_value = "financial_model")]
    workbook: PathBuf,

    /// Output image (defaults to graphs/<chart>.png)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("graphs").join(cli.chart.default_file()));
    let size = ChartSize::default();
    let sheet_error = || format!("Failed to read workbook at {}", cli.workbook.display());

    match cli.chart {
        ChartKind::Capex => {
            let categories = read_capex_subtotals(&cli.workbook).with_context(sheet_error)?;
            render_capex_chart(&categories, &output, size)?;
        }
        ChartKind::CapexDetail => {
            let items = read_capex_items(&cli.workbook).with_context(sheet_error)?;
            render_capex_detail_chart(&items, &output, size)?;
        }
        ChartKind::Cashflow => {
            let rows = read_roi_timeline(&cli.workbook).with_context(sheet_error)?;
            render_cashflow_chart(&rows, &output, size)?;
        }
        ChartKind::CashflowDetail => {
            let rows = read_roi_timeline(&cli.workbook).with_context(sheet_error)?;
            render_detailed_cashflow_chart(&rows, &output, size)?;
        }
        ChartKind::Roi => {
            let rows = read_roi_timeline(&cli.workbook).with_context(sheet_error)?;
            let (index, breakeven) = render_roi_chart(&rows, &output, size)?;
            let label = &rows[index].label;
            if breakeven {
                println!("Break-even marked at {}", label);
            } else {
                println!("Break-even not reached; maximum loss marked at {}", label);
            }
        }
        ChartKind::Scenarios => {
            let rows = read_scenario_sheet(&cli.workbook).with_context(sheet_error)?;
            if rows.is_empty() {
                bail!("Workbook has no scenario rows; rerun build_model with --scenarios");
            }
            render_scenario_chart(&rows, &output, size)?;
        }
    }

    println!("Chart written to {}", output.display());
    Ok(())
}
