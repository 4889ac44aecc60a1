//! Monthly cash-flow rows and break-even search

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::{check_amount, checked_sum, ExpenseItem, Money, RevenueStream};
use crate::error::{ModelError, ModelResult};

/// One month of the projection
///
/// `cumulative` nets the up-front CapEx, so it starts deep in the negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRow {
    /// 0-based projection month
    pub month: u32,
    pub revenue: Money,
    pub expense: Money,
    pub net: Money,
    pub cumulative: Money,
}

impl MonthlyRow {
    /// Calendar-style label: month 0 -> "Y1M01", month 13 -> "Y2M02"
    pub fn label(&self) -> String {
        month_label(self.month)
    }

    pub fn payback_reached(&self) -> bool {
        self.cumulative >= Decimal::ZERO
    }

    /// Operating cash generated so far, before CapEx
    ///
    /// Always representable: the projection checks this running sum too.
    pub fn operating_cumulative(&self, capex_total: Money) -> Money {
        self.cumulative + capex_total
    }

    /// Operating cumulative cash flow as a fraction of CapEx
    /// None when there is no CapEx to return (or the ratio overflows)
    pub fn cumulative_roi(&self, capex_total: Money) -> Option<Decimal> {
        self.operating_cumulative(capex_total).checked_div(capex_total)
    }
}

pub fn month_label(month: u32) -> String {
    format!("Y{}M{:02}", month / 12 + 1, month % 12 + 1)
}

/// Build one row per month over `[0, horizon_months)`
///
/// revenue(m) counts every stream with start_month <= m, expense(m) is the
/// constant OpEx total, and cumulative(0) = net(0) - capex_total.
/// Sums that leave the decimal range fail with `InvalidInput`.
pub fn compute_monthly_projection(
    revenues: &[RevenueStream],
    expenses: &[ExpenseItem],
    capex_total: Money,
    horizon_months: u32,
) -> ModelResult<Vec<MonthlyRow>> {
    if horizon_months == 0 {
        return Err(ModelError::invalid("horizon_months", "must be greater than zero"));
    }
    check_amount(capex_total, || "capex_total".to_string())?;
    for (i, stream) in revenues.iter().enumerate() {
        check_amount(stream.monthly_amount, || format!("revenues[{}].monthly_amount", i))?;
    }
    for (i, item) in expenses.iter().enumerate() {
        check_amount(item.monthly_amount, || format!("expenses[{}].monthly_amount", i))?;
    }

    let expense = checked_sum(expenses.iter().map(|e| e.monthly_amount), || "expenses".to_string())?;

    let mut rows = Vec::with_capacity(horizon_months as usize);
    let mut cumulative = -capex_total;
    let mut operating = Decimal::ZERO;

    for month in 0..horizon_months {
        let revenue = checked_sum(revenues.iter().map(|r| r.amount_in(month)), || {
            format!("revenues at {}", month_label(month))
        })?;
        // Both sides are non-negative, so the difference fits
        let net = revenue - expense;
        let overflow = || ModelError::overflow(format!("cumulative cash flow at {}", month_label(month)));
        cumulative = cumulative.checked_add(net).ok_or_else(overflow)?;
        operating = operating.checked_add(net).ok_or_else(overflow)?;

        rows.push(MonthlyRow {
            month,
            revenue,
            expense,
            net,
            cumulative,
        });
    }

    Ok(rows)
}

/// First month whose cumulative position is >= 0
///
/// None means break-even is not reached within the horizon, which is a
/// normal outcome and distinct from Some(0).
pub fn find_breakeven(rows: &[MonthlyRow]) -> Option<u32> {
    rows.iter().find(|row| row.payback_reached()).map(|row| row.month)
}

/// Month and value of the lowest cumulative position (first one on ties)
pub fn max_loss(rows: &[MonthlyRow]) -> Option<(u32, Money)> {
    rows.iter()
        .fold(None, |worst: Option<&MonthlyRow>, row| match worst {
            Some(w) if w.cumulative <= row.cumulative => Some(w),
            _ => Some(row),
        })
        .map(|row| (row.month, row.cumulative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn scenario_two() -> (Vec<RevenueStream>, Vec<ExpenseItem>) {
        (
            vec![
                RevenueStream::new("GPU Lease", dec!(80000)),
                RevenueStream::new("BTC Mining", dec!(9000)),
            ],
            vec![ExpenseItem::new("OpEx", dec!(132000))],
        )
    }

    #[test]
    fn test_constant_negative_net() {
        let (revenues, expenses) = scenario_two();
        let capex = dec!(3200000);
        let rows = compute_monthly_projection(&revenues, &expenses, capex, 6).unwrap();

        assert_eq!(rows.len(), 6);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.month, i as u32);
            assert_eq!(row.net, dec!(-43000));
        }
        assert_eq!(rows[0].cumulative, dec!(-43000) - capex);
        assert_eq!(rows[5].cumulative, dec!(-258000) - capex);
        assert_eq!(find_breakeven(&rows), None);
    }

    #[test]
    fn test_cumulative_recurrence() {
        let (revenues, expenses) = scenario_two();
        let rows = compute_monthly_projection(&revenues, &expenses, dec!(1000), 24).unwrap();

        assert_eq!(rows[0].cumulative, rows[0].net - dec!(1000));
        for pair in rows.windows(2) {
            assert_eq!(pair[1].cumulative - pair[0].cumulative, pair[1].net);
            assert_eq!(pair[1].month, pair[0].month + 1);
            assert_eq!(pair[1].net, pair[1].revenue - pair[1].expense);
        }
    }

    #[test]
    fn test_delayed_stream() {
        let revenues = vec![
            RevenueStream::new("GPU Lease", dec!(80000)),
            RevenueStream::new("Spa Income", dec!(2500)).starting_at(3),
        ];
        let rows = compute_monthly_projection(&revenues, &[], Decimal::ZERO, 6).unwrap();

        assert_eq!(rows[0].revenue, dec!(80000));
        assert_eq!(rows[2].revenue, dec!(80000));
        assert_eq!(rows[3].revenue - rows[2].revenue, dec!(2500));
        assert_eq!(rows[5].revenue, dec!(82500));
    }

    #[test]
    fn test_stream_after_horizon_contributes_nothing() {
        let revenues = vec![RevenueStream::new("Late", dec!(1000)).starting_at(12)];
        let rows = compute_monthly_projection(&revenues, &[], Decimal::ZERO, 12).unwrap();

        assert!(rows.iter().all(|r| r.revenue.is_zero()));
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let (revenues, expenses) = scenario_two();
        let err = compute_monthly_projection(&revenues, &expenses, Decimal::ZERO, 0).unwrap_err();
        assert!(matches!(err, ModelError::InvalidInput { .. }));
    }

    #[test]
    fn test_all_zero_streams_still_produce_rows() {
        let rows = compute_monthly_projection(&[], &[], Decimal::ZERO, 3).unwrap();
        assert_eq!(rows.iter().map(|r| r.month).collect::<Vec<_>>(), vec![0, 1, 2]);
        // Nothing invested and nothing lost: paid back immediately
        assert_eq!(find_breakeven(&rows), Some(0));
    }

    #[test]
    fn test_breakeven_month() {
        // 10k/month net against 35k CapEx: -25k, -15k, -5k, +5k
        let revenues = vec![RevenueStream::new("GPU", dec!(12000))];
        let expenses = vec![ExpenseItem::new("Staff", dec!(2000))];
        let rows = compute_monthly_projection(&revenues, &expenses, dec!(35000), 8).unwrap();

        assert_eq!(find_breakeven(&rows), Some(3));
        assert_eq!(rows[3].cumulative, dec!(5000));

        // Exactly zero counts as break-even
        let rows = compute_monthly_projection(&revenues, &expenses, dec!(30000), 8).unwrap();
        assert_eq!(find_breakeven(&rows), Some(2));
        assert_eq!(rows[2].cumulative, Decimal::ZERO);
    }

    #[test]
    fn test_breakeven_monotonic_in_revenue_and_expense() {
        let capex = dec!(500000);
        let breakeven_for = |revenue: Decimal, expense: Decimal| {
            let rows = compute_monthly_projection(
                &[RevenueStream::new("GPU", revenue)],
                &[ExpenseItem::new("OpEx", expense)],
                capex,
                120,
            )
            .unwrap();
            find_breakeven(&rows).unwrap_or(u32::MAX)
        };

        let mut previous = u32::MAX;
        for step in 0..20u32 {
            let month = breakeven_for(dec!(20000) + Decimal::from(step * 5000), dec!(15000));
            assert!(month <= previous, "more revenue delayed break-even");
            previous = month;
        }

        let mut previous = 0;
        for step in 0..20u32 {
            let month = breakeven_for(dec!(50000), Decimal::from(step * 2500));
            assert!(month >= previous, "less expense delayed break-even");
            previous = month;
        }
    }

    #[test]
    fn test_month_labels_and_roi() {
        assert_eq!(month_label(0), "Y1M01");
        assert_eq!(month_label(11), "Y1M12");
        assert_eq!(month_label(13), "Y2M02");
        assert_eq!(month_label(59), "Y5M12");

        let row = MonthlyRow {
            month: 0,
            revenue: dec!(100),
            expense: dec!(40),
            net: dec!(60),
            cumulative: dec!(-940),
        };
        assert_eq!(row.operating_cumulative(dec!(1000)), dec!(60));
        assert_eq!(row.cumulative_roi(dec!(1000)), Some(dec!(0.06)));
        assert_eq!(row.cumulative_roi(Decimal::ZERO), None);
        assert!(!row.payback_reached());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let revenues = vec![
            RevenueStream::new("GPU", Decimal::MAX),
            RevenueStream::new("Mining", dec!(1)).starting_at(2),
        ];
        let expenses = vec![ExpenseItem::new("Power", Decimal::MAX)];
        match compute_monthly_projection(&revenues, &expenses, Decimal::ZERO, 4) {
            Err(ModelError::InvalidInput { field, reason }) => {
                assert_eq!(field, "revenues at Y1M03");
                assert_eq!(reason, "amount overflow");
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }

        // Each month fits, the running total does not
        let revenues = vec![RevenueStream::new("GPU", Decimal::MAX / dec!(2.5))];
        let err = compute_monthly_projection(&revenues, &[], Decimal::ZERO, 3).unwrap_err();
        assert!(err.to_string().contains("cumulative cash flow at Y1M03"));

        let expenses = vec![ExpenseItem::new("A", Decimal::MAX), ExpenseItem::new("B", Decimal::MAX)];
        assert!(compute_monthly_projection(&[], &expenses, Decimal::ZERO, 1).is_err());
    }

    #[test]
    fn test_max_loss() {
        let revenues = vec![RevenueStream::new("GPU", dec!(10000)).starting_at(4)];
        let expenses = vec![ExpenseItem::new("Staff", dec!(4000))];
        let rows = compute_monthly_projection(&revenues, &expenses, dec!(10000), 12).unwrap();

        // Losing 4k/month until month 4, then +6k/month
        assert_eq!(max_loss(&rows), Some((3, dec!(-26000))));
        assert_eq!(max_loss(&[]), None);
    }
}
