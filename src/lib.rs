//! GridEdge Model - Financial projections for a hybrid Bitcoin-mining / GPU-hosting facility
//!
//! This library provides:
//! - CapEx, revenue and OpEx assumption sets (built-in and JSON-loaded)
//! - A deterministic monthly cash-flow projection with break-even and ROI
//! - Bear / base / bull scenario runs
//! - Workbook (CSV worksheet) output and PNG chart rendering

pub mod error;
pub mod assumptions;
pub mod projection;
pub mod scenario;
pub mod report;

// Re-export commonly used types
pub use error::{ModelError, ModelResult};
pub use assumptions::{Assumptions, CapexCategory, CapexItem, ExpenseItem, Money, RevenueStream};
pub use projection::{MonthlyRow, ProjectionConfig, ProjectionEngine, ProjectionResult, Roi, Summary};
pub use scenario::{ScenarioOutcome, ScenarioParams, ScenarioRunner};
