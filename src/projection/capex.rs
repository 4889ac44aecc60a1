//! CapEx aggregation by category

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::{check_amount, CapexCategory, CapexItem, Money};
use crate::error::{ModelError, ModelResult};

/// Category totals and overall CapEx
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapexBreakdown {
    /// Only categories that have at least one item
    pub by_category: BTreeMap<CapexCategory, Money>,
    pub total: Money,
}

impl CapexBreakdown {
    /// Fraction of the total held by `category`
    /// Returns None when the total is zero
    pub fn share(&self, category: CapexCategory) -> Option<Decimal> {
        if self.total.is_zero() {
            return None;
        }
        let amount = self.by_category.get(&category).copied().unwrap_or(Decimal::ZERO);
        Some(amount / self.total)
    }

    /// (category, amount, share) in category order
    pub fn rows(&self) -> Vec<(CapexCategory, Money, Option<Decimal>)> {
        self.by_category
            .iter()
            .map(|(&category, &amount)| (category, amount, self.share(category)))
            .collect()
    }
}

/// Group CapEx items by category and total them
///
/// Order-independent; fails on the first negative amount or on overflow.
pub fn compute_capex_breakdown(items: &[CapexItem]) -> ModelResult<CapexBreakdown> {
    let mut breakdown = CapexBreakdown::default();

    for (i, item) in items.iter().enumerate() {
        let field = || format!("capex[{}].amount ({})", i, item.label);
        check_amount(item.amount, field)?;

        breakdown.total = breakdown
            .total
            .checked_add(item.amount)
            .ok_or_else(|| ModelError::overflow(field()))?;
        // Bounded by the total, which did not overflow
        *breakdown.by_category.entry(item.category).or_insert(Decimal::ZERO) += item.amount;
    }

    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use rust_decimal_macros::dec;

    fn sample_items() -> Vec<CapexItem> {
        vec![
            CapexItem::new(CapexCategory::Equipment, "Miners", dec!(1000000)),
            CapexItem::new(CapexCategory::Facility, "Modules", dec!(900000)),
            CapexItem::new(CapexCategory::Equipment, "GPUs", dec!(500000)),
            CapexItem::new(CapexCategory::PowerAndCooling, "HVAC", dec!(600000)),
            CapexItem::new(CapexCategory::Contingency, "Buffer", dec!(200000)),
        ]
    }

    #[test]
    fn test_breakdown_totals() {
        let b = compute_capex_breakdown(&sample_items()).unwrap();

        assert_eq!(b.total, dec!(3200000));
        assert_eq!(b.by_category[&CapexCategory::Equipment], dec!(1500000));
        assert_eq!(b.by_category.values().copied().sum::<Decimal>(), b.total);
        assert_eq!(b.share(CapexCategory::Equipment), Some(dec!(0.46875)));
        assert_eq!(b.share(CapexCategory::LegalAdmin), Some(Decimal::ZERO));
        assert!(!b.by_category.contains_key(&CapexCategory::LegalAdmin));
    }

    #[test]
    fn test_breakdown_order_independent() {
        let items = sample_items();
        let mut reversed = items.clone();
        reversed.reverse();

        assert_eq!(
            compute_capex_breakdown(&items).unwrap(),
            compute_capex_breakdown(&reversed).unwrap()
        );
    }

    #[test]
    fn test_breakdown_rejects_negative() {
        let mut items = sample_items();
        items[3].amount = dec!(-0.01);

        match compute_capex_breakdown(&items) {
            Err(ModelError::InvalidInput { field, .. }) => assert!(field.starts_with("capex[3].amount")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_breakdown_overflow_is_an_error() {
        let items = vec![
            CapexItem::new(CapexCategory::Equipment, "Miners", dec!(50000000000000000000000000000)),
            CapexItem::new(CapexCategory::Facility, "Modules", dec!(50000000000000000000000000000)),
        ];

        match compute_capex_breakdown(&items) {
            Err(ModelError::InvalidInput { field, reason }) => {
                assert_eq!(field, "capex[1].amount (Modules)");
                assert_eq!(reason, "amount overflow");
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_breakdown() {
        let b = compute_capex_breakdown(&[]).unwrap();
        assert_eq!(b.total, Decimal::ZERO);
        assert_eq!(b.share(CapexCategory::Equipment), None);
        assert!(b.rows().is_empty());
    }

    #[test]
    fn test_cents_sum_exactly() {
        // Many odd-cent items; fixed-point sums must not drift
        let items: Vec<CapexItem> = (0..1000)
            .map(|i| CapexItem::new(CapexCategory::ALL[i % 6], format!("item {}", i), dec!(0.01) * Decimal::from(i as u32 % 7 + 1)))
            .collect();
        let b = compute_capex_breakdown(&items).unwrap();

        let direct: Decimal = items.iter().map(|c| c.amount).sum();
        assert_eq!(b.total, direct);
        assert_eq!(b.by_category.values().copied().sum::<Decimal>(), b.total);
    }
}
