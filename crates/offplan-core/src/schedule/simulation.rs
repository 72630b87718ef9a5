//! Month-by-month accrual, coverage and reinvestment.
//!
//! Each calendar month from the first payment through the later of the
//! horizon and the last payment produces at least one row. Asset interest
//! compounds monthly on the running balance; rent accrues from the
//! completion month onward. When a payment is due, rent is applied first,
//! then the asset interest earned that month; the asset principal itself is
//! never drawn. Whatever income is left is reinvested into the asset.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::{PaymentEvent, PaymentType, ScheduleEntry, MAX_SCHEDULE_MONTHS};
use crate::calendar::{add_months, month_index, months_between, same_month};
use crate::error::OffplanError;
use crate::property::PropertyDetails;
use crate::time_value::compound_growth;
use crate::types::{Money, Percent, MAX_MONEY};
use crate::OffplanResult;

/// Running totals carried across simulated months.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationTotals {
    pub asset_balance: Money,
    pub asset_income: Money,
    pub rental_income: Money,
    pub additional_funds_needed: Money,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub entries: Vec<ScheduleEntry>,
    /// Date of the last simulated month
    pub final_month: NaiveDate,
    pub totals: SimulationTotals,
}

/// Income available in one month, before it is applied.
#[derive(Debug, Clone, Copy, Default)]
struct MonthIncome {
    asset: Money,
    rental: Money,
}

impl MonthIncome {
    fn total(&self) -> Money {
        self.asset + self.rental
    }
}

struct SimulationState {
    apr: Percent,
    totals: SimulationTotals,
}

impl SimulationState {
    /// One month of compound growth on the current balance.
    fn accrue_asset(&mut self) -> OffplanResult<Money> {
        if self.totals.asset_balance <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        let growth = compound_growth(self.totals.asset_balance, self.apr, 1)?;
        if growth.final_amount > MAX_MONEY {
            return Err(OffplanError::InvalidInput {
                field: "asset_income.apr".into(),
                reason: format!("Asset balance grows past {MAX_MONEY} within the horizon"),
            });
        }
        self.totals.asset_balance = growth.final_amount;
        self.totals.asset_income += growth.total_income;
        Ok(growth.total_income)
    }

    /// Row for a month with no payment due: all income is reinvested.
    fn accrual_row(&mut self, date: NaiveDate, income: MonthIncome) -> ScheduleEntry {
        // Asset interest is already in the balance; rent joins it.
        self.totals.asset_balance += income.rental;

        ScheduleEntry {
            date,
            amount: Decimal::ZERO,
            description: "Income reinvested".into(),
            payment_type: PaymentType::NoEvent,
            income_for_period: income.total(),
            rental_income: income.rental,
            rental_amount_used: Decimal::ZERO,
            asset_amount_used: Decimal::ZERO,
            reinvested_amount: income.total(),
            additional_funds_needed: Decimal::ZERO,
            coverage_ratio: Decimal::ZERO,
            rental_coverage_ratio: Decimal::ZERO,
            current_asset_value: self.totals.asset_balance,
        }
    }

    /// Apply the month's income to a due payment, rent first.
    fn payment_row(&mut self, event: &PaymentEvent, income: MonthIncome) -> ScheduleEntry {
        let due = event.amount.max(Decimal::ZERO);

        let rental_used = income.rental.min(due);
        let asset_used = income.asset.min(due - rental_used);
        let additional_funds_needed = due - rental_used - asset_used;
        let reinvested_amount = income.total() - rental_used - asset_used;

        // Interest already sits in the balance: take out what was spent and
        // add the unspent rent.
        self.totals.asset_balance += income.rental - rental_used - asset_used;
        self.totals.additional_funds_needed += additional_funds_needed;

        ScheduleEntry {
            date: event.date,
            amount: event.amount,
            description: event.description.clone(),
            payment_type: event.payment_type,
            income_for_period: income.total(),
            rental_income: income.rental,
            rental_amount_used: rental_used,
            asset_amount_used: asset_used,
            reinvested_amount,
            additional_funds_needed,
            coverage_ratio: ratio(income.total(), event.amount),
            rental_coverage_ratio: ratio(income.rental, event.amount),
            current_asset_value: self.totals.asset_balance,
        }
    }
}

/// `part / whole * 100` to 2 dp, or 0 when nothing is due.
pub fn ratio(part: Money, whole: Money) -> Percent {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (part / whole * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Walk the calendar month by month over the sorted `events`.
pub fn simulate(
    details: &PropertyDetails,
    events: &[PaymentEvent],
    warnings: &mut Vec<String>,
) -> OffplanResult<SimulationResult> {
    let first_date = events.first().map_or(details.start_date, |e| e.date);
    let last_event = events.last().map_or(first_date, |e| e.date);
    let horizon = details.end_date.max(last_event);

    let span = months_between(first_date, horizon).max(0);
    if span > i64::from(MAX_SCHEDULE_MONTHS) {
        return Err(OffplanError::HorizonTooLong {
            months: u32::try_from(span).unwrap_or(u32::MAX),
            max: MAX_SCHEDULE_MONTHS,
        });
    }
    let span = span as u32;

    let mut state = SimulationState {
        apr: details
            .asset_income
            .as_ref()
            .map_or(Decimal::ZERO, |a| a.apr),
        totals: SimulationTotals {
            asset_balance: details
                .asset_income
                .as_ref()
                .map_or(Decimal::ZERO, |a| a.initial_amount),
            ..SimulationTotals::default()
        },
    };
    let completion_month = month_index(details.completion_date);

    let mut entries: Vec<ScheduleEntry> = Vec::with_capacity(span as usize + events.len() + 1);
    let mut next_event = 0usize;
    let mut final_month = first_date;
    let mut crowded_months = 0u32;

    for offset in 0..=span {
        let month = add_months(first_date, offset)?;
        final_month = month;

        let asset = state.accrue_asset()?;
        let rental = match &details.rental_income {
            Some(rent) if month_index(month) >= completion_month => rent.monthly_amount,
            _ => Decimal::ZERO,
        };
        state.totals.rental_income += rental;
        let income = MonthIncome { asset, rental };

        let due_start = next_event;
        while next_event < events.len() && same_month(events[next_event].date, month) {
            next_event += 1;
        }
        let due = &events[due_start..next_event];

        match due {
            [] => entries.push(state.accrual_row(month, income)),
            [first, rest @ ..] => {
                entries.push(state.payment_row(first, income));
                // The month's income is attached to its first payment only.
                for event in rest {
                    entries.push(state.payment_row(event, MonthIncome::default()));
                }
                if !rest.is_empty() {
                    crowded_months += 1;
                }
            }
        }
    }

    if crowded_months > 0 {
        warnings.push(format!(
            "{crowded_months} month(s) have more than one payment due; income is applied to the first"
        ));
    }

    Ok(SimulationResult {
        entries,
        final_month,
        totals: state.totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_payment_plans;
    use crate::property::{AssetIncome, RentalIncome};
    use crate::schedule::events::build_payment_events;
    use crate::types::Currency;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn run(details: &PropertyDetails) -> (SimulationResult, Vec<String>) {
        let mut warnings = Vec::new();
        let built = build_payment_events(details, &mut warnings).unwrap();
        let sim = simulate(details, &built.events, &mut warnings).unwrap();
        (sim, warnings)
    }

    fn standard() -> PropertyDetails {
        PropertyDetails::new(
            dec!(1000000),
            d(2025, 1, 15),
            d(2027, 1, 15),
            d(2027, 1, 15),
            default_payment_plans()[0].clone(),
        )
    }

    #[test]
    fn test_one_row_per_month_inclusive() {
        let (sim, _) = run(&standard());
        // Jan 2025 .. Jan 2027 inclusive
        assert_eq!(sim.entries.len(), 25);
        assert_eq!(sim.final_month, d(2027, 1, 15));
    }

    #[test]
    fn test_horizon_extends_past_last_payment() {
        let mut input = standard();
        input.end_date = d(2027, 6, 1);
        let (sim, _) = run(&input);
        assert_eq!(sim.entries.len(), 30);
        assert_eq!(
            sim.entries.last().unwrap().payment_type,
            PaymentType::NoEvent
        );
    }

    #[test]
    fn test_end_date_before_last_payment_is_ignored() {
        let mut input = standard();
        input.end_date = d(2025, 3, 1);
        let (sim, _) = run(&input);
        assert_eq!(sim.entries.len(), 25);
    }

    #[test]
    fn test_asset_income_applied_then_reinvested() {
        let mut input = standard();
        input.asset_income = Some(AssetIncome {
            initial_amount: dec!(200000),
            apr: dec!(12),
            currency: Currency::AED,
        });
        let (sim, _) = run(&input);

        let first = &sim.entries[0];
        assert_eq!(first.payment_type, PaymentType::DownPayment);
        assert_eq!(first.income_for_period, dec!(2000));
        assert_eq!(first.asset_amount_used, dec!(2000));
        assert_eq!(first.additional_funds_needed, dec!(198000));
        assert_eq!(first.reinvested_amount, Decimal::ZERO);
        assert_eq!(first.current_asset_value, dec!(200000));
        assert_eq!(first.coverage_ratio, dec!(1));

        let second = &sim.entries[1];
        assert_eq!(second.payment_type, PaymentType::NoEvent);
        assert_eq!(second.income_for_period, dec!(2000));
        assert_eq!(second.reinvested_amount, dec!(2000));
        assert_eq!(second.current_asset_value, dec!(202000));

        let third = &sim.entries[2];
        // 202,000 * 1.01 = 204,020
        assert_eq!(third.income_for_period, dec!(2020));
        assert_eq!(third.current_asset_value, dec!(204020));
    }

    #[test]
    fn test_rent_starts_at_completion_and_is_used_first() {
        let mut input = standard();
        input.completion_date = d(2025, 7, 15);
        input.end_date = d(2025, 12, 1);
        input.rental_income = Some(RentalIncome {
            monthly_amount: dec!(5000),
            currency: Currency::AED,
        });
        input.asset_income = Some(AssetIncome {
            initial_amount: dec!(100000),
            apr: dec!(6),
            currency: Currency::AED,
        });
        let (sim, _) = run(&input);

        for row in &sim.entries[..6] {
            assert_eq!(row.rental_income, Decimal::ZERO, "{}", row.date);
        }
        let handover = &sim.entries[6];
        assert_eq!(handover.payment_type, PaymentType::Handover);
        assert_eq!(handover.rental_income, dec!(5000));
        assert_eq!(handover.rental_amount_used, dec!(5000));
        assert!(handover.asset_amount_used > Decimal::ZERO);
        assert_eq!(handover.rental_coverage_ratio, dec!(0.63));

        let after = &sim.entries[7];
        assert_eq!(after.rental_income, dec!(5000));
        assert!(after.reinvested_amount >= dec!(5000));
        assert_eq!(sim.totals.rental_income, dec!(30000));
    }

    #[test]
    fn test_rent_exceeding_payment_is_reinvested() {
        let mut input = standard();
        input.selected_plan.handover_payment_percentage = dec!(0.1);
        input.rental_income = Some(RentalIncome {
            monthly_amount: dec!(5000),
            currency: Currency::AED,
        });
        let (sim, _) = run(&input);
        let handover = sim
            .entries
            .iter()
            .find(|e| e.payment_type == PaymentType::Handover)
            .unwrap();
        // 0.1% of 1,000,000
        assert_eq!(handover.amount, dec!(1000));
        assert_eq!(handover.rental_amount_used, dec!(1000));
        assert_eq!(handover.reinvested_amount, dec!(4000));
        assert_eq!(handover.additional_funds_needed, Decimal::ZERO);
        assert_eq!(handover.current_asset_value, dec!(4000));
        assert_eq!(handover.coverage_ratio, dec!(500));
    }

    #[test]
    fn test_same_month_payments_get_own_rows() {
        let mut input = standard();
        let mut plan = default_payment_plans()[1].clone(); // 40/60, 24 monthly
        plan.handover_payment_percentage = dec!(30);
        input.selected_plan = plan;
        input.completion_date = d(2025, 3, 28);
        let (sim, warnings) = run(&input);

        let march: Vec<_> = sim
            .entries
            .iter()
            .filter(|e| same_month(e.date, d(2025, 3, 1)))
            .collect();
        assert_eq!(march.len(), 2);
        assert_eq!(march[0].payment_type, PaymentType::Installment);
        assert_eq!(march[1].payment_type, PaymentType::Handover);
        assert!(warnings.iter().any(|w| w.contains("more than one payment")));
    }

    #[test]
    fn test_ratio_zero_when_nothing_due() {
        assert_eq!(ratio(dec!(100), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(ratio(dec!(1), dec!(3)), dec!(33.33));
    }

    #[test]
    fn test_runaway_asset_growth_is_an_error() {
        let mut input = standard();
        input.end_date = d(2070, 1, 1);
        input.asset_income = Some(AssetIncome {
            initial_amount: dec!(1000000000),
            apr: dec!(120),
            currency: Currency::AED,
        });
        let mut warnings = Vec::new();
        let built = build_payment_events(&input, &mut warnings).unwrap();
        let err = simulate(&input, &built.events, &mut warnings).unwrap_err();
        assert!(matches!(
            err,
            OffplanError::InvalidInput { ref field, .. } if field == "asset_income.apr"
        ));
    }
}
