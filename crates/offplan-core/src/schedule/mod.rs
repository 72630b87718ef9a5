//! Month-by-month payment and cash-flow schedule for an off-plan purchase.
//!
//! The engine runs in three stages:
//! 1. [`events`] turns the plan, price and dates into dated contractual
//!    payments (down payment with acquisition costs, installments, handover,
//!    optional post-handover tail).
//! 2. [`simulation`] walks every calendar month from the first payment to the
//!    horizon, accruing asset interest and rent, applying that income to any
//!    payment due and reinvesting the rest.
//! 3. [`summary`] appends a totals row when there was a shortfall or rent.
//!
//! A run is a pure function of its `PropertyDetails`: identical inputs give
//! identical entries.

pub mod events;
pub mod simulation;
pub mod summary;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::calendar::months_between;
use crate::error::OffplanError;
use crate::mortgage::{quote_mortgage, MortgageQuote};
use crate::property::{PaymentMethod, PropertyDetails};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, MAX_MONEY};
use crate::OffplanResult;

pub use events::{AcquisitionCosts, PaymentEvent, PaymentEvents};
pub use simulation::SimulationResult;

/// Longest simulated horizon, in calendar months (50 years).
pub const MAX_SCHEDULE_MONTHS: u32 = 600;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What a schedule row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Month with no contractual payment; only shows balance growth
    NoEvent,
    DownPayment,
    Installment,
    Handover,
    PostHandover,
    /// Grand totals; excluded from amount sums
    Summary,
}

impl PaymentType {
    pub fn is_payment(&self) -> bool {
        !matches!(self, PaymentType::NoEvent | PaymentType::Summary)
    }
}

/// One row of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    /// Contractual payment due on this row (0 for non-payment rows)
    pub amount: Money,
    pub description: String,
    pub payment_type: PaymentType,
    /// Asset interest plus rent accrued this month
    pub income_for_period: Money,
    pub rental_income: Money,
    pub rental_amount_used: Money,
    pub asset_amount_used: Money,
    /// Income not needed for the payment, folded back into the asset
    pub reinvested_amount: Money,
    /// Shortfall the buyer must fund from elsewhere
    pub additional_funds_needed: Money,
    /// income / amount * 100
    pub coverage_ratio: Percent,
    /// rent / amount * 100
    pub rental_coverage_ratio: Percent,
    /// Asset balance after this row
    pub current_asset_value: Money,
}

/// Engine result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutput {
    /// Chronological rows, optionally ending with a summary row
    pub entries: Vec<ScheduleEntry>,
    pub acquisition_costs: AcquisitionCosts,
    /// Sum of scheduled payments excluding acquisition costs
    pub contractual_total: Money,
    /// The property price the contractual total is expected to match
    pub expected_total: Money,
    /// Sum of every non-summary row amount (contractual total plus costs)
    pub total_payments: Money,
    /// Post-handover share that was not turned into payment events
    pub unscheduled_post_handover: Money,
    pub total_additional_funds_needed: Money,
    pub total_rental_income: Money,
    pub total_asset_income: Money,
    pub final_asset_value: Money,
    /// Quoted when paying by mortgage; not part of the schedule rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mortgage: Option<MortgageQuote>,
}

impl ScheduleOutput {
    /// Rows excluding the trailing summary.
    pub fn payment_rows(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.payment_type != PaymentType::Summary)
    }

    /// Sum of every row amount except the summary row.
    pub fn total_amount(&self) -> Money {
        total_amount(&self.entries)
    }

    pub fn summary(&self) -> Option<&ScheduleEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.payment_type == PaymentType::Summary)
    }
}

/// Sum of row amounts, skipping summary rows so totals are not counted twice.
pub fn total_amount(entries: &[ScheduleEntry]) -> Money {
    entries
        .iter()
        .filter(|e| e.payment_type != PaymentType::Summary)
        .map(|e| e.amount)
        .sum()
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the full payment and cash-flow schedule for a property purchase.
///
/// Returns the chronological rows plus totals. Plan inconsistencies
/// (percentages not summing to 100, unscheduled post-handover share, totals
/// drifting from the price) are reported as warnings, not errors.
pub fn compute_schedule(
    details: &PropertyDetails,
) -> OffplanResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(details, &mut warnings)?;

    let built = events::build_payment_events(details, &mut warnings)?;
    debug!(
        events = built.events.len(),
        contractual_total = %built.contractual_total,
        "built contractual payment events"
    );

    let accounted = built.contractual_total + built.unscheduled_post_handover;
    if built.contractual_total != details.price {
        warnings.push(format!(
            "Scheduled payments total {} but the price is {} (difference {}{})",
            built.contractual_total,
            details.price,
            details.price - built.contractual_total,
            if accounted == details.price && !built.unscheduled_post_handover.is_zero() {
                ", fully explained by the unscheduled post-handover share"
            } else {
                ""
            }
        ));
    }

    let sim = simulation::simulate(details, &built.events, &mut warnings)?;
    debug!(rows = sim.entries.len(), "simulated monthly cash flow");

    let mut entries = sim.entries;
    let total_payments = total_amount(&entries);
    if let Some(row) = summary::build_summary(
        sim.final_month,
        entries.last().map(|e| e.date),
        total_payments,
        built.contractual_total,
        &sim.totals,
    ) {
        entries.push(row);
    }

    let mortgage = match (details.payment_method, details.selected_mortgage_plan.as_ref()) {
        (PaymentMethod::Mortgage, Some(plan)) => {
            warnings.push(
                "Mortgage payments are quoted separately; the schedule follows the \
                 installment plan percentages"
                    .into(),
            );
            match quote_mortgage(details, plan) {
                Ok(quote) => Some(quote),
                Err(e) => {
                    warnings.push(format!(
                        "Mortgage plan '{}' could not be quoted: {e}",
                        plan.name
                    ));
                    None
                }
            }
        }
        (PaymentMethod::Mortgage, None) => {
            warnings.push(
                "Payment method is mortgage but no mortgage plan was selected; \
                 schedule follows the installment plan"
                    .into(),
            );
            None
        }
        _ => None,
    };

    for w in &warnings {
        warn!(warning = %w, "schedule data-integrity warning");
    }

    let output = ScheduleOutput {
        entries,
        acquisition_costs: built.acquisition_costs,
        contractual_total: built.contractual_total,
        expected_total: details.price,
        total_payments,
        unscheduled_post_handover: built.unscheduled_post_handover,
        total_additional_funds_needed: sim.totals.additional_funds_needed,
        total_rental_income: sim.totals.rental_income,
        total_asset_income: sim.totals.asset_income,
        final_asset_value: sim.totals.asset_balance,
        mortgage,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Off-plan payment schedule with asset and rental income coverage",
        details,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn non_negative(field: &str, value: Decimal) -> OffplanResult<()> {
    if value < Decimal::ZERO {
        return Err(OffplanError::InvalidInput {
            field: field.into(),
            reason: "Value cannot be negative".into(),
        });
    }
    Ok(())
}

fn at_most(field: &str, value: Decimal, max: Decimal) -> OffplanResult<()> {
    if value > max {
        return Err(OffplanError::InvalidInput {
            field: field.into(),
            reason: format!("Value cannot exceed {max}"),
        });
    }
    Ok(())
}

/// Share of the price, 0-100.
fn percentage(field: &str, value: Percent) -> OffplanResult<()> {
    non_negative(field, value)?;
    at_most(field, value, Decimal::ONE_HUNDRED)
}

/// Non-negative amount no larger than `MAX_MONEY`.
fn money(field: &str, value: Money) -> OffplanResult<()> {
    non_negative(field, value)?;
    at_most(field, value, MAX_MONEY)
}

fn validate_input(details: &PropertyDetails, warnings: &mut Vec<String>) -> OffplanResult<()> {
    let plan = &details.selected_plan;

    at_most("price", details.price.abs(), MAX_MONEY)?;

    percentage("down_payment_percentage", plan.down_payment_percentage)?;
    percentage("handover_payment_percentage", plan.handover_payment_percentage)?;
    percentage("post_handover_percentage", plan.post_handover_share())?;

    if details.dld_buyer_percentage < Decimal::ZERO || details.dld_buyer_percentage > dec!(4) {
        return Err(OffplanError::InvalidInput {
            field: "dld_buyer_percentage".into(),
            reason: "Buyer share of the DLD fee must be between 0 and 4".into(),
        });
    }
    percentage("realtor_commission", details.realtor_commission)?;
    percentage("mortgage_setup_fee", details.mortgage_setup_fee)?;
    percentage("mortgage_registration_fee", details.mortgage_registration_fee)?;
    money("valuation_fee", details.valuation_fee)?;
    money("no_objection_certificate", details.no_objection_certificate)?;
    money("title_deed_fee", details.title_deed_fee)?;
    money("administrative_fees", details.administrative_fees)?;

    if let Some(asset) = &details.asset_income {
        money("asset_income.initial_amount", asset.initial_amount)?;
        non_negative("asset_income.apr", asset.apr)?;
        if asset.currency != details.currency {
            warnings.push(format!(
                "Asset income is tagged {} but the schedule is in {}; amounts are used as entered",
                asset.currency, details.currency
            ));
        }
    }
    if let Some(rent) = &details.rental_income {
        money("rental_income.monthly_amount", rent.monthly_amount)?;
        if rent.currency != details.currency {
            warnings.push(format!(
                "Rental income is tagged {} but the schedule is in {}; amounts are used as entered",
                rent.currency, details.currency
            ));
        }
    }

    for (field, months) in [
        ("installment_months", plan.installment_months),
        ("post_handover_months", plan.post_handover_months.unwrap_or(0)),
    ] {
        if months > MAX_SCHEDULE_MONTHS {
            return Err(OffplanError::InvalidInput {
                field: field.into(),
                reason: format!("At most {MAX_SCHEDULE_MONTHS} months are supported"),
            });
        }
    }

    let span = months_between(details.start_date, details.end_date.max(details.completion_date));
    if span > i64::from(MAX_SCHEDULE_MONTHS) {
        return Err(OffplanError::HorizonTooLong {
            months: u32::try_from(span).unwrap_or(u32::MAX),
            max: MAX_SCHEDULE_MONTHS,
        });
    }

    // --- Warnings for degenerate but computable inputs ---
    if details.price <= Decimal::ZERO {
        warnings.push(format!(
            "Price {} is not positive; the schedule is degenerate",
            details.price
        ));
    }

    if details.completion_date < details.start_date {
        warnings.push(format!(
            "Completion date {} is before the start date {}",
            details.completion_date, details.start_date
        ));
    }

    let share = plan.installment_share();
    if share < Decimal::ZERO {
        warnings.push(format!(
            "Plan '{}' percentages exceed 100% by {}; installment pool set to 0",
            plan.name, -share
        ));
    } else if share > Decimal::ZERO && plan.installment_months == 0 {
        warnings.push(format!(
            "Plan '{}' leaves {}% of the price unallocated (no installment months)",
            plan.name, share
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_payment_plans;
    use crate::property::{AssetIncome, RentalIncome};
    use crate::types::Currency;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
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
    fn test_standard_plan_two_payments() {
        let out = compute_schedule(&standard()).unwrap().result;
        let payments: Vec<_> = out
            .entries
            .iter()
            .filter(|e| e.payment_type.is_payment())
            .collect();
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].amount, dec!(200000));
        assert_eq!(payments[1].amount, dec!(800000));
        assert_eq!(out.contractual_total, dec!(1000000));
        assert_eq!(out.total_payments, dec!(1000000));
    }

    #[test]
    fn test_no_income_full_shortfall_and_summary() {
        let out = compute_schedule(&standard()).unwrap().result;
        assert_eq!(out.total_additional_funds_needed, dec!(1000000));
        let summary = out.summary().unwrap();
        assert_eq!(summary.additional_funds_needed, dec!(1000000));
        assert_eq!(summary.amount, dec!(1000000));
        assert_eq!(total_amount(&out.entries), dec!(1000000));
        assert_eq!(out.total_amount(), out.total_payments);
    }

    #[test]
    fn test_negative_percentage_rejected() {
        let mut input = standard();
        input.selected_plan.down_payment_percentage = dec!(-5);
        assert!(matches!(
            compute_schedule(&input),
            Err(OffplanError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_dld_share_out_of_range_rejected() {
        let mut input = standard();
        input.dld_buyer_percentage = dec!(4.5);
        assert!(compute_schedule(&input).is_err());
    }

    #[test]
    fn test_horizon_too_long_rejected() {
        let mut input = standard();
        input.end_date = d(2100, 1, 1);
        assert!(matches!(
            compute_schedule(&input),
            Err(OffplanError::HorizonTooLong { max: 600, .. })
        ));
    }

    #[test]
    fn test_unallocated_share_warns() {
        let mut input = standard();
        input.selected_plan.handover_payment_percentage = dec!(70);
        let out = compute_schedule(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("unallocated")));
        assert!(out.warnings.iter().any(|w| w.contains("difference 100000")));
        assert_eq!(out.result.contractual_total, dec!(900000));
    }

    #[test]
    fn test_zero_price_does_not_fail() {
        let mut input = standard();
        input.price = Decimal::ZERO;
        let out = compute_schedule(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("not positive")));
        assert!(out
            .result
            .entries
            .iter()
            .all(|e| e.coverage_ratio == Decimal::ZERO));
    }

    #[test]
    fn test_currency_mismatch_warns() {
        let mut input = standard();
        input.asset_income = Some(AssetIncome {
            initial_amount: dec!(1000),
            apr: dec!(5),
            currency: Currency::USD,
        });
        let out = compute_schedule(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("tagged USD")));
    }

    #[test]
    fn test_mortgage_method_quotes_without_changing_rows() {
        let mut input = standard();
        let installment = compute_schedule(&input).unwrap().result;

        input.payment_method = PaymentMethod::Mortgage;
        input.selected_mortgage_plan = Some(crate::catalog::default_mortgage_plans()[0].clone());
        let out = compute_schedule(&input).unwrap();

        assert!(out.result.mortgage.is_some());
        assert_eq!(out.result.entries, installment.entries);
        assert!(out.warnings.iter().any(|w| w.contains("quoted separately")));
    }

    #[test]
    fn test_price_beyond_money_range_rejected() {
        let mut input = standard();
        input.price = dec!(1000000000000000000000000000);
        match compute_schedule(&input) {
            Err(OffplanError::InvalidInput { field, .. }) => assert_eq!(field, "price"),
            other => panic!("expected InvalidInput on price, got {other:?}"),
        }
    }

    #[test]
    fn test_runaway_asset_balance_rejected() {
        let mut input = standard();
        input.end_date = d(2070, 1, 15);
        input.asset_income = Some(AssetIncome {
            initial_amount: dec!(1000000000),
            apr: dec!(120),
            currency: Currency::AED,
        });
        match compute_schedule(&input) {
            Err(OffplanError::InvalidInput { field, .. }) => {
                assert_eq!(field, "asset_income.apr")
            }
            other => panic!("expected InvalidInput on asset_income.apr, got {other:?}"),
        }
    }

    #[test]
    fn test_unquotable_mortgage_plan_warns_instead_of_failing() {
        let mut input = standard();
        let installment = compute_schedule(&input).unwrap().result;

        let mut plan = crate::catalog::default_mortgage_plans()[0].clone();
        plan.term_years = 5000;
        input.payment_method = PaymentMethod::Mortgage;
        input.selected_mortgage_plan = Some(plan);
        let out = compute_schedule(&input).unwrap();

        assert!(out.result.mortgage.is_none());
        assert_eq!(out.result.entries, installment.entries);
        assert!(out.warnings.iter().any(|w| w.contains("could not be quoted")));
    }

    #[test]
    fn test_zero_term_mortgage_plan_warns() {
        let mut input = standard();
        let mut plan = crate::catalog::default_mortgage_plans()[0].clone();
        plan.term_years = 0;
        input.payment_method = PaymentMethod::Mortgage;
        input.selected_mortgage_plan = Some(plan);
        let out = compute_schedule(&input).unwrap();
        assert!(out.result.mortgage.is_none());
        assert!(out.warnings.iter().any(|w| w.contains("could not be quoted")));
    }

    #[test]
    fn test_summary_rental_coverage_uses_contractual_total() {
        let mut input = standard();
        input.dld_buyer_percentage = dec!(4);
        input.end_date = d(2027, 12, 15);
        input.rental_income = Some(RentalIncome {
            monthly_amount: dec!(5000),
            currency: Currency::AED,
        });
        let out = compute_schedule(&input).unwrap().result;

        assert_eq!(out.acquisition_costs.total, dec!(40000));
        assert_eq!(out.total_payments, dec!(1040000));
        assert_eq!(out.total_rental_income, dec!(60000));
        let summary = out.summary().unwrap();
        assert_eq!(summary.amount, dec!(1040000));
        assert_eq!(summary.rental_coverage_ratio, dec!(6));
    }
}
