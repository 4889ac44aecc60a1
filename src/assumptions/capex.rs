//! Capital expenditure line items and categories

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Money;
use crate::error::ModelError;

/// Investment category used to aggregate CapEx line items
///
/// Declaration order is the order categories appear in the breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CapexCategory {
    Equipment,
    Facility,
    #[serde(alias = "Power & Cooling")]
    PowerAndCooling,
    #[serde(alias = "Legal & Admin")]
    LegalAdmin,
    Contingency,
    Other,
}

impl CapexCategory {
    pub const ALL: [CapexCategory; 6] = [
        CapexCategory::Equipment,
        CapexCategory::Facility,
        CapexCategory::PowerAndCooling,
        CapexCategory::LegalAdmin,
        CapexCategory::Contingency,
        CapexCategory::Other,
    ];

    /// Worksheet display name
    pub fn as_str(&self) -> &'static str {
        match self {
            CapexCategory::Equipment => "Equipment",
            CapexCategory::Facility => "Facility",
            CapexCategory::PowerAndCooling => "Power & Cooling",
            CapexCategory::LegalAdmin => "Legal & Admin",
            CapexCategory::Contingency => "Contingency",
            CapexCategory::Other => "Other",
        }
    }
}

impl fmt::Display for CapexCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapexCategory {
    type Err = ModelError;

    /// Accepts both the display name and the variant name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CapexCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == trimmed || format!("{:?}", c) == trimmed)
            .ok_or_else(|| ModelError::invalid("category", format!("unknown CapEx category '{}'", s)))
    }
}

/// One CapEx line item (e.g. "ASIC Miners", $3.0M, Equipment)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapexItem {
    pub category: CapexCategory,
    pub label: String,
    pub amount: Money,
}

impl CapexItem {
    pub fn new(category: CapexCategory, label: impl Into<String>, amount: Money) -> Self {
        Self {
            category,
            label: label.into(),
            amount,
        }
    }
}

/// Build a Contingency line as `rate` times every non-contingency item
///
/// The amount is rounded to cents. None if the amount overflows.
pub fn contingency_item(items: &[CapexItem], rate: Decimal, label: impl Into<String>) -> Option<CapexItem> {
    let base = items
        .iter()
        .filter(|item| item.category != CapexCategory::Contingency)
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.amount))?;

    let amount = base.checked_mul(rate)?.round_dp(2);
    Some(CapexItem::new(CapexCategory::Contingency, label, amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_category_round_trip_names() {
        for category in CapexCategory::ALL {
            assert_eq!(category.as_str().parse::<CapexCategory>().unwrap(), category);
        }
        assert_eq!(
            "PowerAndCooling".parse::<CapexCategory>().unwrap(),
            CapexCategory::PowerAndCooling
        );
        assert!("Furniture".parse::<CapexCategory>().is_err());
    }

    #[test]
    fn test_category_order() {
        assert!(CapexCategory::Equipment < CapexCategory::Facility);
        assert!(CapexCategory::PowerAndCooling < CapexCategory::Contingency);
    }

    #[test]
    fn test_contingency_ignores_existing_buffer() {
        let items = vec![
            CapexItem::new(CapexCategory::Equipment, "ASIC Miners", dec!(3000000)),
            CapexItem::new(CapexCategory::Facility, "Site Preparation", dec!(500000)),
            CapexItem::new(CapexCategory::Contingency, "Old buffer", dec!(1000000)),
        ];

        let buffer = contingency_item(&items, dec!(0.15), "15% Buffer").unwrap();
        assert_eq!(buffer.category, CapexCategory::Contingency);
        assert_eq!(buffer.amount, dec!(525000));
    }

    #[test]
    fn test_contingency_overflow() {
        let items = vec![
            CapexItem::new(CapexCategory::Equipment, "A", Decimal::MAX),
            CapexItem::new(CapexCategory::Facility, "B", Decimal::MAX),
        ];
        assert!(contingency_item(&items, dec!(0.15), "Buffer").is_none());
        assert!(contingency_item(&items[..1], dec!(2), "Buffer").is_none());
    }
}
