//! Model assumptions: CapEx line items, revenue streams, OpEx items and horizon

mod capex;
mod operating;
pub mod loader;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

pub use capex::{contingency_item, CapexCategory, CapexItem};
pub use loader::{load_assumptions, load_assumptions_from_reader};
pub use operating::{monthly_energy_cost, ExpenseItem, RevenueStream};

/// Currency amounts are fixed-point decimals (dollars with cents)
pub type Money = Decimal;

/// Default projection horizon: 5 years of monthly rows
pub const DEFAULT_HORIZON_MONTHS: u32 = 60;

/// Complete input snapshot for one projection run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assumptions {
    /// Display name used in the Executive Summary
    #[serde(default = "default_name")]
    pub name: String,

    /// Number of monthly rows to project
    #[serde(default = "default_horizon")]
    pub horizon_months: u32,

    #[serde(default)]
    pub capex: Vec<CapexItem>,

    #[serde(default)]
    pub revenues: Vec<RevenueStream>,

    #[serde(default)]
    pub expenses: Vec<ExpenseItem>,
}

fn default_name() -> String { "GridEdge Compute Center".to_string() }
fn default_horizon() -> u32 { DEFAULT_HORIZON_MONTHS }

impl Assumptions {
    /// Built-in GridEdge 5 MW assumption set
    pub fn gridedge_default() -> Self {
        let mut capex = vec![
            // Equipment
            CapexItem::new(CapexCategory::Equipment, "ASIC Miners", dec!(3000000)),        // 2 MW
            CapexItem::new(CapexCategory::Equipment, "GPU Clusters", dec!(2500000)),       // 1 MW
            CapexItem::new(CapexCategory::Equipment, "Network Equipment", dec!(1000000)),
            CapexItem::new(CapexCategory::Equipment, "Servers & Storage", dec!(1500000)),
            // Facility
            CapexItem::new(CapexCategory::Facility, "Modular Construction", dec!(2000000)), // 5000 sq ft
            CapexItem::new(CapexCategory::Facility, "Site Preparation", dec!(500000)),
            CapexItem::new(CapexCategory::Facility, "Security Systems", dec!(250000)),
            // Power & Cooling
            CapexItem::new(CapexCategory::PowerAndCooling, "Geothermal Connection", dec!(15000000)), // 3 MW PPA
            CapexItem::new(CapexCategory::PowerAndCooling, "Solar Array", dec!(3000000)),
            CapexItem::new(CapexCategory::PowerAndCooling, "Battery Storage", dec!(1000000)),
            CapexItem::new(CapexCategory::PowerAndCooling, "Gas Generators", dec!(2000000)),
            CapexItem::new(CapexCategory::PowerAndCooling, "HVAC Systems", dec!(4000000)),
            CapexItem::new(CapexCategory::PowerAndCooling, "Electrical Distribution", dec!(3000000)),
        ];
        capex.extend(contingency_item(&capex, dec!(0.15), "15% Buffer"));

        let revenues = vec![
            RevenueStream::new("GPU Leasing", dec!(80000)),
            RevenueStream::new("ASIC Mining", dec!(18000)),   // 2 MW at $9K/MW
            RevenueStream::new("Spa Income", dec!(2500)),     // heat recovery
        ];

        // 5 MW at $0.07/kWh, 720 hours, 85% uptime
        let mut expenses: Vec<ExpenseItem> = monthly_energy_cost(dec!(0.07), dec!(5000), dec!(720), dec!(0.85))
            .map(|cost| ExpenseItem::new("Energy", cost))
            .into_iter()
            .collect();
        expenses.extend([
            ExpenseItem::new("Staff", dec!(15000)),
            ExpenseItem::new("Maintenance", dec!(5000)),
            ExpenseItem::new("Insurance", dec!(2000)),
            ExpenseItem::new("Connectivity", dec!(3000)),
            ExpenseItem::new("Other", dec!(1500)),
        ]);

        Self {
            name: default_name(),
            horizon_months: DEFAULT_HORIZON_MONTHS,
            capex,
            revenues,
            expenses,
        }
    }

    /// Eager validation before any computation
    ///
    /// Errors name the offending field, e.g. `revenues[1].monthly_amount`.
    pub fn validate(&self) -> ModelResult<()> {
        if self.horizon_months == 0 {
            return Err(ModelError::invalid("horizon_months", "must be greater than zero"));
        }

        for (i, item) in self.capex.iter().enumerate() {
            check_label(&item.label, || format!("capex[{}].label", i))?;
            check_amount(item.amount, || format!("capex[{}].amount", i))?;
        }
        for (i, stream) in self.revenues.iter().enumerate() {
            check_label(&stream.label, || format!("revenues[{}].label", i))?;
            check_amount(stream.monthly_amount, || format!("revenues[{}].monthly_amount", i))?;
        }
        for (i, item) in self.expenses.iter().enumerate() {
            check_label(&item.label, || format!("expenses[{}].label", i))?;
            check_amount(item.monthly_amount, || format!("expenses[{}].monthly_amount", i))?;
        }

        Ok(())
    }

    /// Same assumptions with a different horizon
    pub fn with_horizon(mut self, horizon_months: u32) -> Self {
        self.horizon_months = horizon_months;
        self
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::gridedge_default()
    }
}

pub(crate) fn check_amount(amount: Money, field: impl FnOnce() -> String) -> ModelResult<()> {
    if amount < Decimal::ZERO {
        return Err(ModelError::invalid(
            field(),
            format!("amount {} must be non-negative", amount),
        ));
    }
    Ok(())
}

/// Sum that reports overflow against `field` instead of panicking
pub(crate) fn checked_sum(
    amounts: impl IntoIterator<Item = Money>,
    field: impl FnOnce() -> String,
) -> ModelResult<Money> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(|| ModelError::overflow(field()))
}

fn check_label(label: &str, field: impl FnOnce() -> String) -> ModelResult<()> {
    if label.trim().is_empty() {
        return Err(ModelError::invalid(field(), "label must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capex_total() {
        let a = Assumptions::gridedge_default();
        let total: Money = a.capex.iter().map(|c| c.amount).sum();

        // Base project cost $38.75M + 15% contingency
        assert_eq!(total, dec!(44562500));
        assert_eq!(a.capex.last().unwrap().amount, dec!(5812500));
    }

    #[test]
    fn test_default_monthly_totals() {
        let a = Assumptions::gridedge_default();
        let revenue: Money = a.revenues.iter().map(|r| r.monthly_amount).sum();
        let opex: Money = a.expenses.iter().map(|e| e.monthly_amount).sum();

        assert_eq!(revenue, dec!(100500));
        assert_eq!(opex, dec!(240700));
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_horizon() {
        let a = Assumptions::gridedge_default().with_horizon(0);
        match a.validate() {
            Err(ModelError::InvalidInput { field, .. }) => assert_eq!(field, "horizon_months"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_names_offending_field() {
        let mut a = Assumptions::gridedge_default();
        a.expenses[2].monthly_amount = dec!(-1);

        match a.validate() {
            Err(ModelError::InvalidInput { field, .. }) => assert_eq!(field, "expenses[2].monthly_amount"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }

        let mut a = Assumptions::gridedge_default();
        a.revenues[0].label = "  ".to_string();
        assert!(matches!(a.validate(), Err(ModelError::InvalidInput { .. })));
    }
}
