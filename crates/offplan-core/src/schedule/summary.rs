use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::simulation::{ratio, SimulationTotals};
use super::{PaymentType, ScheduleEntry};
use crate::types::Money;

/// Totals row appended after the monthly rows.
///
/// Only produced when there was a shortfall or any rent. `amount` carries
/// the total of all payments, so consumers must skip `Summary` rows when
/// summing amounts. The overall rental coverage is measured against the
/// contractual payments only, without acquisition costs. Dated at the later
/// of the final simulated month and the last row so dates stay
/// non-decreasing.
pub fn build_summary(
    final_month: NaiveDate,
    last_row_date: Option<NaiveDate>,
    total_payments: Money,
    contractual_total: Money,
    totals: &SimulationTotals,
) -> Option<ScheduleEntry> {
    if totals.additional_funds_needed.is_zero() && totals.rental_income.is_zero() {
        return None;
    }

    Some(ScheduleEntry {
        date: last_row_date.map_or(final_month, |d| d.max(final_month)),
        amount: total_payments,
        description: "Total".into(),
        payment_type: PaymentType::Summary,
        income_for_period: Decimal::ZERO,
        rental_income: totals.rental_income,
        rental_amount_used: Decimal::ZERO,
        asset_amount_used: Decimal::ZERO,
        reinvested_amount: Decimal::ZERO,
        additional_funds_needed: totals.additional_funds_needed,
        coverage_ratio: Decimal::ZERO,
        rental_coverage_ratio: ratio(totals.rental_income, contractual_total),
        current_asset_value: totals.asset_balance,
    })
}
