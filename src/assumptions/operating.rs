//! Monthly revenue streams and operating expense items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Money;

/// A monthly revenue line (GPU leasing, ASIC mining, heat-recovery income)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueStream {
    pub label: String,

    /// Amount earned each month once the stream is active
    pub monthly_amount: Money,

    /// First month (0-based) the stream earns revenue
    /// Streams that start on or after the horizon contribute nothing
    #[serde(default)]
    pub start_month: u32,
}

impl RevenueStream {
    pub fn new(label: impl Into<String>, monthly_amount: Money) -> Self {
        Self {
            label: label.into(),
            monthly_amount,
            start_month: 0,
        }
    }

    pub fn starting_at(mut self, start_month: u32) -> Self {
        self.start_month = start_month;
        self
    }

    /// Revenue contributed in `month`
    pub fn amount_in(&self, month: u32) -> Money {
        if month >= self.start_month {
            self.monthly_amount
        } else {
            Decimal::ZERO
        }
    }
}

/// A monthly operating expense, constant across the horizon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub label: String,
    pub monthly_amount: Money,
}

impl ExpenseItem {
    pub fn new(label: impl Into<String>, monthly_amount: Money) -> Self {
        Self {
            label: label.into(),
            monthly_amount,
        }
    }
}

/// Monthly energy bill: rate ($/kWh) x load (kW) x hours x uptime
///
/// Rounded to cents. None if the product overflows.
pub fn monthly_energy_cost(rate_per_kwh: Decimal, load_kw: Decimal, hours: Decimal, uptime: Decimal) -> Option<Money> {
    let cost = rate_per_kwh.checked_mul(load_kw)?.checked_mul(hours)?.checked_mul(uptime)?;
    Some(cost.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_stream_activation() {
        let stream = RevenueStream::new("Spa Income", dec!(2500)).starting_at(3);

        assert_eq!(stream.amount_in(0), Decimal::ZERO);
        assert_eq!(stream.amount_in(2), Decimal::ZERO);
        assert_eq!(stream.amount_in(3), dec!(2500));
        assert_eq!(stream.amount_in(40), dec!(2500));
    }

    #[test]
    fn test_energy_cost() {
        // $0.07/kWh x 5 MW x 720 hours x 85% uptime
        let cost = monthly_energy_cost(dec!(0.07), dec!(5000), dec!(720), dec!(0.85));
        assert_eq!(cost, Some(dec!(214200)));

        assert_eq!(monthly_energy_cost(Decimal::MAX, dec!(5000), dec!(720), dec!(0.85)), None);
    }
}
