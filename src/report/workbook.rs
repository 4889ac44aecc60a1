//! Workbook output: one CSV file per named worksheet in an output directory
//!
//! Sheets: CapEx Breakdown, Monthly Revenue Forecast, Operating Expenses,
//! ROI Timeline, Executive Summary, and Scenarios when scenarios were run.
//! The chart renderers read the CapEx, ROI and Scenario sheets back.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::{Assumptions, Money};
use crate::error::{ModelError, ModelResult};
use crate::projection::{month_label, ProjectionResult};
use crate::scenario::ScenarioOutcome;

pub const CAPEX_SHEET: &str = "capex_breakdown.csv";
pub const REVENUE_SHEET: &str = "monthly_revenue_forecast.csv";
pub const OPEX_SHEET: &str = "operating_expenses.csv";
pub const ROI_SHEET: &str = "roi_timeline.csv";
pub const SUMMARY_SHEET: &str = "executive_summary.csv";
pub const SCENARIO_SHEET: &str = "scenarios.csv";
pub const RESULT_JSON: &str = "projection.json";

/// Row kinds in the CapEx sheet
pub const KIND_ITEM: &str = "item";
pub const KIND_SUBTOTAL: &str = "subtotal";
pub const KIND_TOTAL: &str = "total";

/// CapEx Breakdown sheet row: line items, then one subtotal per category, then the total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapexSheetRow {
    #[serde(rename = "Kind")]
    pub kind: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Item")]
    pub item: String,
    #[serde(rename = "Amount")]
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Money,
    /// Fraction of total CapEx (subtotal and total rows only)
    #[serde(rename = "Share")]
    #[serde(with = "rust_decimal::serde::str_option")]
    pub share: Option<Decimal>,
}

/// ROI Timeline sheet row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiTimelineRow {
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Label")]
    pub label: String,
    #[serde(rename = "Revenue")]
    #[serde(with = "rust_decimal::serde::str")]
    pub revenue: Money,
    #[serde(rename = "OpEx")]
    #[serde(with = "rust_decimal::serde::str")]
    pub opex: Money,
    #[serde(rename = "Net Cash Flow")]
    #[serde(with = "rust_decimal::serde::str")]
    pub net_cash_flow: Money,
    /// Operating cash generated so far, before CapEx
    #[serde(rename = "Cumulative CF")]
    #[serde(with = "rust_decimal::serde::str")]
    pub cumulative_cf: Money,
    /// Cumulative CF less CapEx; the break-even criterion
    #[serde(rename = "Net Position")]
    #[serde(with = "rust_decimal::serde::str")]
    pub net_position: Money,
    #[serde(rename = "ROI")]
    #[serde(with = "rust_decimal::serde::str_option")]
    pub roi: Option<Decimal>,
    #[serde(rename = "Payback")]
    pub payback: String,
}

impl RoiTimelineRow {
    pub fn payback_reached(&self) -> bool {
        self.payback == "YES"
    }
}

/// Scenarios sheet row (long format: one row per scenario-month)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSheetRow {
    #[serde(rename = "Scenario")]
    pub scenario: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Net Position")]
    #[serde(with = "rust_decimal::serde::str")]
    pub net_position: Money,
    #[serde(rename = "Break-even Month")]
    pub breakeven_month: Option<u32>,
}

/// Metric / value pair for the Executive Summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SummarySheetRow {
    #[serde(rename = "Metric")]
    metric: String,
    #[serde(rename = "Value")]
    value: String,
}

impl SummarySheetRow {
    fn new(metric: impl Into<String>, value: impl ToString) -> Self {
        Self {
            metric: metric.into(),
            value: value.to_string(),
        }
    }
}

fn create_writer(path: &Path) -> ModelResult<csv::Writer<File>> {
    csv::Writer::from_path(path).map_err(|e| ModelError::output(path, e))
}

fn finish(mut writer: csv::Writer<File>, path: &Path) -> ModelResult<()> {
    writer.flush().map_err(|e| ModelError::output(path, e))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

fn write_serialized<T: Serialize>(path: &Path, rows: &[T]) -> ModelResult<()> {
    let mut writer = create_writer(path)?;
    for row in rows {
        writer.serialize(row).map_err(|e| ModelError::output(path, e))?;
    }
    finish(writer, path)
}

fn read_serialized<T: for<'de> Deserialize<'de>>(path: &Path) -> ModelResult<Vec<T>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| ModelError::output(path, e))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|e| ModelError::output(path, e))
}

/// Build the CapEx Breakdown rows
pub fn capex_sheet_rows(assumptions: &Assumptions, result: &ProjectionResult) -> Vec<CapexSheetRow> {
    let mut rows: Vec<CapexSheetRow> = Vec::with_capacity(assumptions.capex.len() + 8);

    let mut items: Vec<_> = assumptions.capex.iter().collect();
    items.sort_by_key(|item| item.category);
    for item in items {
        rows.push(CapexSheetRow {
            kind: KIND_ITEM.to_string(),
            category: item.category.to_string(),
            item: item.label.clone(),
            amount: item.amount,
            share: None,
        });
    }

    for (category, amount, share) in result.capex.rows() {
        rows.push(CapexSheetRow {
            kind: KIND_SUBTOTAL.to_string(),
            category: category.to_string(),
            item: format!("{} Subtotal", category),
            amount,
            share: share.map(|s| s.round_dp(4)),
        });
    }

    rows.push(CapexSheetRow {
        kind: KIND_TOTAL.to_string(),
        category: String::new(),
        item: "Total CapEx".to_string(),
        amount: result.capex.total,
        share: if result.capex.total.is_zero() { None } else { Some(Decimal::ONE) },
    });

    rows
}

/// Build the ROI Timeline rows
pub fn roi_timeline_rows(result: &ProjectionResult) -> Vec<RoiTimelineRow> {
    let capex = result.capex_total();
    result
        .rows
        .iter()
        .map(|row| RoiTimelineRow {
            month: row.month,
            label: row.label(),
            revenue: row.revenue,
            opex: row.expense,
            net_cash_flow: row.net,
            cumulative_cf: row.operating_cumulative(capex),
            net_position: row.cumulative,
            roi: row.cumulative_roi(capex).map(|r| r.round_dp(4)),
            payback: if row.payback_reached() { "YES" } else { "NO" }.to_string(),
        })
        .collect()
}

fn write_revenue_sheet(path: &Path, assumptions: &Assumptions, result: &ProjectionResult) -> ModelResult<()> {
    let mut writer = create_writer(path)?;
    let err = |e: csv::Error| ModelError::output(path, e);

    let mut header = vec!["Month".to_string()];
    header.extend(assumptions.revenues.iter().map(|r| r.label.clone()));
    header.push("Monthly Total".to_string());
    header.push("Annualized".to_string());
    writer.write_record(&header).map_err(err)?;

    for row in &result.rows {
        let mut record = vec![row.label()];
        record.extend(assumptions.revenues.iter().map(|r| r.amount_in(row.month).to_string()));
        record.push(row.revenue.to_string());
        let annualized = row
            .revenue
            .checked_mul(Decimal::from(12))
            .ok_or_else(|| ModelError::overflow(format!("annualized revenue at {}", row.label())))?;
        record.push(annualized.to_string());
        writer.write_record(&record).map_err(err)?;
    }

    finish(writer, path)
}

fn write_opex_sheet(path: &Path, assumptions: &Assumptions, result: &ProjectionResult) -> ModelResult<()> {
    let mut writer = create_writer(path)?;
    let err = |e: csv::Error| ModelError::output(path, e);

    let mut header = vec!["Month".to_string()];
    header.extend(assumptions.expenses.iter().map(|e| e.label.clone()));
    header.push("Total OpEx".to_string());
    writer.write_record(&header).map_err(err)?;

    for row in &result.rows {
        let mut record = vec![row.label()];
        record.extend(assumptions.expenses.iter().map(|e| e.monthly_amount.to_string()));
        record.push(row.expense.to_string());
        writer.write_record(&record).map_err(err)?;
    }

    finish(writer, path)
}

fn summary_rows(result: &ProjectionResult, scenarios: &[ScenarioOutcome]) -> Vec<SummarySheetRow> {
    let s = &result.summary;
    let mut rows = vec![
        SummarySheetRow::new("Project", &result.name),
        SummarySheetRow::new("Generated", Utc::now().format("%Y-%m-%d")),
        SummarySheetRow::new("Total CapEx", result.capex_total()),
    ];
    for (category, amount, share) in result.capex.rows() {
        let share = share
            .map(|r| format!(" ({}%)", (r * Decimal::ONE_HUNDRED).round_dp(1)))
            .unwrap_or_default();
        rows.push(SummarySheetRow::new(format!("CapEx - {}", category), format!("{}{}", amount, share)));
    }
    rows.extend([
        SummarySheetRow::new("Horizon (months)", result.horizon_months()),
        SummarySheetRow::new("Run-rate Monthly Revenue", s.run_rate_revenue),
        SummarySheetRow::new("Run-rate Monthly OpEx", s.run_rate_opex),
        SummarySheetRow::new("Annualized Revenue", s.annualized_revenue),
        SummarySheetRow::new("Annualized OpEx", s.annualized_opex),
        SummarySheetRow::new("Annualized Net", s.annualized_net()),
        SummarySheetRow::new("Simple ROI", s.simple_roi),
        SummarySheetRow::new("Break-even Month", result.breakeven_label()),
        SummarySheetRow::new("Final Cumulative Cash Flow", s.final_cumulative),
        SummarySheetRow::new("Average Monthly Net", s.average_monthly_net),
    ]);
    if let Some((month, value)) = s.max_loss {
        rows.push(SummarySheetRow::new("Maximum Loss", format!("{} at {}", value, month_label(month))));
    }
    for outcome in scenarios {
        rows.push(SummarySheetRow::new(
            format!("Scenario {} Break-even", outcome.params.name),
            outcome.result.breakeven_label(),
        ));
    }
    rows
}

fn scenario_rows(scenarios: &[ScenarioOutcome]) -> Vec<ScenarioSheetRow> {
    scenarios
        .iter()
        .flat_map(|outcome| {
            outcome.result.rows.iter().map(move |row| ScenarioSheetRow {
                scenario: outcome.params.name.clone(),
                title: outcome.params.title.clone(),
                month: row.month,
                net_position: row.cumulative,
                breakeven_month: outcome.result.breakeven_month,
            })
        })
        .collect()
}

/// Write every worksheet into `dir`, creating it if needed
///
/// Returns the paths written, in sheet order.
pub fn write_workbook(
    dir: &Path,
    assumptions: &Assumptions,
    result: &ProjectionResult,
    scenarios: &[ScenarioOutcome],
) -> ModelResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| ModelError::output(dir, e))?;

    let mut written = Vec::new();

    let path = dir.join(CAPEX_SHEET);
    write_serialized(&path, &capex_sheet_rows(assumptions, result))?;
    written.push(path);

    let path = dir.join(REVENUE_SHEET);
    write_revenue_sheet(&path, assumptions, result)?;
    written.push(path);

    let path = dir.join(OPEX_SHEET);
    write_opex_sheet(&path, assumptions, result)?;
    written.push(path);

    let path = dir.join(ROI_SHEET);
    write_serialized(&path, &roi_timeline_rows(result))?;
    written.push(path);

    let path = dir.join(SUMMARY_SHEET);
    write_serialized(&path, &summary_rows(result, scenarios))?;
    written.push(path);

    if !scenarios.is_empty() {
        let path = dir.join(SCENARIO_SHEET);
        write_serialized(&path, &scenario_rows(scenarios))?;
        written.push(path);
    }

    let path = dir.join(RESULT_JSON);
    let json = serde_json::to_string_pretty(result).map_err(|e| ModelError::output(&path, e))?;
    fs::write(&path, json).map_err(|e| ModelError::output(&path, e))?;
    written.push(path);

    info!("Workbook written to {} ({} files)", dir.display(), written.len());
    Ok(written)
}

/// Read the CapEx Breakdown sheet
pub fn read_capex_sheet(dir: &Path) -> ModelResult<Vec<CapexSheetRow>> {
    read_serialized(&dir.join(CAPEX_SHEET))
}

/// Category subtotals from the CapEx Breakdown sheet, in sheet order
pub fn read_capex_subtotals(dir: &Path) -> ModelResult<Vec<(String, Money)>> {
    Ok(read_capex_sheet(dir)?
        .into_iter()
        .filter(|row| row.kind == KIND_SUBTOTAL && row.amount > Decimal::ZERO)
        .map(|row| (row.category, row.amount))
        .collect())
}

/// CapEx line items from the CapEx Breakdown sheet, in sheet order
pub fn read_capex_items(dir: &Path) -> ModelResult<Vec<CapexSheetRow>> {
    Ok(read_capex_sheet(dir)?
        .into_iter()
        .filter(|row| row.kind == KIND_ITEM)
        .collect())
}

/// Read the ROI Timeline sheet
pub fn read_roi_timeline(dir: &Path) -> ModelResult<Vec<RoiTimelineRow>> {
    read_serialized(&dir.join(ROI_SHEET))
}

/// Read the Scenarios sheet
pub fn read_scenario_sheet(dir: &Path) -> ModelResult<Vec<ScenarioSheetRow>> {
    read_serialized(&dir.join(SCENARIO_SHEET))
}
