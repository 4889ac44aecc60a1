//! Workbook output and chart rendering

pub mod workbook;
pub mod chart;

pub use workbook::{
    read_capex_items, read_capex_sheet, read_capex_subtotals, read_roi_timeline, read_scenario_sheet,
    write_workbook, CapexSheetRow, RoiTimelineRow, ScenarioSheetRow,
};
pub use chart::{
    render_capex_chart, render_capex_detail_chart, render_cashflow_chart, render_detailed_cashflow_chart,
    render_roi_chart, render_scenario_chart, ChartSize,
};
