//! Projection engine: runs the CapEx, cash-flow, break-even and summary steps

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::capex::{compute_capex_breakdown, CapexBreakdown};
use super::cashflows::{compute_monthly_projection, find_breakeven, MonthlyRow};
use super::summary::{summarize, Summary};
use crate::assumptions::{Assumptions, Money};
use crate::error::ModelResult;

/// Configuration for a projection run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Replace the assumption set's horizon (e.g. from a CLI flag)
    #[serde(default)]
    pub horizon_override: Option<u32>,

    /// Log every monthly row at debug level
    #[serde(default)]
    pub detailed_output: bool,
}

/// Everything the workbook writer and chart renderers need
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub name: String,
    pub capex: CapexBreakdown,
    pub rows: Vec<MonthlyRow>,
    pub breakeven_month: Option<u32>,
    pub summary: Summary,
}

impl ProjectionResult {
    pub fn capex_total(&self) -> Money {
        self.capex.total
    }

    pub fn horizon_months(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Break-even as a month label, or a note that it is out of reach
    pub fn breakeven_label(&self) -> String {
        match self.breakeven_month {
            Some(month) => super::cashflows::month_label(month),
            None => format!("Not achieved in {} months", self.horizon_months()),
        }
    }
}

/// Stateless projection engine; holds only its configuration
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Validate the assumptions and run the full projection
    ///
    /// Pure: identical assumptions always give an identical result.
    pub fn project(&self, assumptions: &Assumptions) -> ModelResult<ProjectionResult> {
        let horizon = self.config.horizon_override.unwrap_or(assumptions.horizon_months);
        let assumptions = assumptions.clone().with_horizon(horizon);
        assumptions.validate()?;

        let capex = compute_capex_breakdown(&assumptions.capex)?;
        let rows = compute_monthly_projection(
            &assumptions.revenues,
            &assumptions.expenses,
            capex.total,
            horizon,
        )?;
        let breakeven_month = find_breakeven(&rows);
        let summary = summarize(&rows, &assumptions.revenues, &assumptions.expenses, capex.total)?;

        if self.config.detailed_output {
            for row in &rows {
                debug!(
                    "{} | revenue {} | expense {} | net {} | cumulative {}",
                    row.label(), row.revenue, row.expense, row.net, row.cumulative
                );
            }
        }

        info!(
            "Projected '{}' over {} months: CapEx {}, break-even {:?}, ROI {}",
            assumptions.name, horizon, capex.total, breakeven_month, summary.simple_roi
        );

        Ok(ProjectionResult {
            name: assumptions.name,
            capex,
            rows,
            breakeven_month,
            summary,
        })
    }
}
