//! Projection engine for CapEx breakdown, monthly cash flow, break-even and ROI

mod capex;
mod cashflows;
mod summary;
mod engine;

pub use capex::{compute_capex_breakdown, CapexBreakdown};
pub use cashflows::{compute_monthly_projection, find_breakeven, max_loss, month_label, MonthlyRow};
pub use summary::{simple_roi_ratio, summarize, Roi, Summary};
pub use engine::{ProjectionConfig, ProjectionEngine, ProjectionResult};
