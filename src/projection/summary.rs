//! Summary aggregates: annualized revenue/OpEx, simple ROI and headline figures

use std::fmt;

use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cashflows::{max_loss, MonthlyRow};
use crate::assumptions::{checked_sum, ExpenseItem, Money, RevenueStream};
use crate::error::{ModelError, ModelResult};

const MONTHS_PER_YEAR: usize = 12;

/// Simple ROI, or a marker when CapEx is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Roi {
    Ratio(Decimal),
    NotApplicable,
}

impl Roi {
    pub fn ratio(&self) -> Option<Decimal> {
        match self {
            Roi::Ratio(r) => Some(*r),
            Roi::NotApplicable => None,
        }
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Roi::Ratio(r) => match r.checked_mul(Decimal::ONE_HUNDRED) {
                Some(pct) => write!(f, "{}%", pct.round_dp(1)),
                // Ratios past the percent range
                None => write!(f, "{}x", r.round_dp(1)),
            },
            Roi::NotApplicable => f.write_str("N/A"),
        }
    }
}

/// Headline figures for the Executive Summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Revenue over the last 12 months (scaled up for shorter horizons)
    pub annualized_revenue: Money,
    pub annualized_opex: Money,
    pub simple_roi: Roi,

    /// Monthly revenue once every stream is active
    pub run_rate_revenue: Money,
    pub run_rate_opex: Money,

    /// Cumulative position at the end of the horizon
    pub final_cumulative: Money,
    pub average_monthly_net: Money,

    /// Lowest cumulative position (month, value)
    pub max_loss: Option<(u32, Money)>,
}

impl Summary {
    pub fn annualized_net(&self) -> Money {
        self.annualized_revenue - self.annualized_opex
    }
}

/// Sum `field` over the last 12 rows, or over all rows scaled to 12 months
fn annualize(rows: &[MonthlyRow], field: impl Fn(&MonthlyRow) -> Money, name: &str) -> ModelResult<Money> {
    if rows.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let window = &rows[rows.len().saturating_sub(MONTHS_PER_YEAR)..];
    let total = checked_sum(window.iter().map(field), || name.to_string())?;

    if window.len() < MONTHS_PER_YEAR {
        let scaled = total
            .checked_mul(Decimal::from(MONTHS_PER_YEAR as u32))
            .ok_or_else(|| ModelError::overflow(name))?;
        Ok((scaled / Decimal::from(window.len() as u32)).round_dp(2))
    } else {
        Ok(total)
    }
}

/// (annualized revenue - annualized OpEx) / CapEx
pub fn simple_roi_ratio(annualized_revenue: Money, annualized_opex: Money, capex_total: Money) -> ModelResult<Decimal> {
    if capex_total.is_zero() {
        return Err(ModelError::DivisionUndefined { what: "simple ROI with zero CapEx" });
    }
    annualized_revenue
        .checked_sub(annualized_opex)
        .and_then(|net| net.checked_div(capex_total))
        .ok_or_else(|| ModelError::overflow("simple_roi"))
}

/// Aggregate the projection rows into summary figures
///
/// An undefined ROI is recorded as `Roi::NotApplicable`; the run continues.
/// Overflow in any aggregate is an error.
pub fn summarize(
    rows: &[MonthlyRow],
    revenues: &[RevenueStream],
    expenses: &[ExpenseItem],
    capex_total: Money,
) -> ModelResult<Summary> {
    let annualized_revenue = annualize(rows, |r| r.revenue, "annualized_revenue")?;
    let annualized_opex = annualize(rows, |r| r.expense, "annualized_opex")?;

    let simple_roi = match simple_roi_ratio(annualized_revenue, annualized_opex, capex_total) {
        Ok(ratio) => Roi::Ratio(ratio),
        Err(e) if e.is_recoverable() => {
            warn!("{}; reporting ROI as N/A", e);
            Roi::NotApplicable
        }
        Err(e) => return Err(e),
    };

    let average_monthly_net = if rows.is_empty() {
        Decimal::ZERO
    } else {
        let total = checked_sum(rows.iter().map(|r| r.net), || "average_monthly_net".to_string())?;
        (total / Decimal::from(rows.len() as u32)).round_dp(2)
    };

    Ok(Summary {
        annualized_revenue,
        annualized_opex,
        simple_roi,
        run_rate_revenue: checked_sum(revenues.iter().map(|r| r.monthly_amount), || "run_rate_revenue".to_string())?,
        run_rate_opex: checked_sum(expenses.iter().map(|e| e.monthly_amount), || "run_rate_opex".to_string())?,
        final_cumulative: rows.last().map(|r| r.cumulative).unwrap_or(-capex_total),
        average_monthly_net,
        max_loss: max_loss(rows),
    })
}
