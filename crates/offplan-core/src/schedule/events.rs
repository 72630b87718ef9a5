//! Contractual payment events, independent of any income simulation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::PaymentType;
use crate::calendar::add_months;
use crate::error::OffplanError;
use crate::property::PropertyDetails;
use crate::types::{round_money, Money, Percent};
use crate::OffplanResult;

/// Flat DLD transfer fee as a share of price, split between buyer and seller.
pub const DLD_TRANSFER_FEE_RATE: Decimal = dec!(0.04);

/// A dated contractual payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub date: NaiveDate,
    pub amount: Money,
    pub payment_type: PaymentType,
    pub description: String,
}

/// One-time purchase costs charged with the down payment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionCosts {
    /// Buyer's share of the DLD transfer fee
    pub dld_fee: Money,
    pub realtor_commission: Money,
    /// Valuation + NOC + title deed + administrative
    pub fixed_fees: Money,
    pub total: Money,
}

/// Output of the event builder.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentEvents {
    /// Sorted ascending by date
    pub events: Vec<PaymentEvent>,
    pub acquisition_costs: AcquisitionCosts,
    /// Sum of event amounts less acquisition costs
    pub contractual_total: Money,
    pub unscheduled_post_handover: Money,
}

/// Acquisition costs for the property's fee settings.
///
/// Expects input that passed schedule validation (bounded price and fees).
///
/// DLD: `price * 4% * buyer_share / 4`, i.e. the buyer pays `buyer_share`
/// quarters of the flat 4% fee.
pub fn acquisition_costs(details: &PropertyDetails) -> AcquisitionCosts {
    let dld_fee =
        details.price * DLD_TRANSFER_FEE_RATE * details.dld_buyer_percentage / dec!(4);
    let realtor_commission = details.price * details.realtor_commission / Decimal::ONE_HUNDRED;
    let fixed_fees = details.valuation_fee
        + details.no_objection_certificate
        + details.title_deed_fee
        + details.administrative_fees;

    AcquisitionCosts {
        dld_fee,
        realtor_commission,
        fixed_fees,
        total: dld_fee + realtor_commission + fixed_fees,
    }
}

/// `round(price * pct / 100)`
fn share_of(price: Money, pct: Percent) -> OffplanResult<Money> {
    price
        .checked_mul(pct)
        .map(|v| round_money(v / Decimal::ONE_HUNDRED))
        .ok_or_else(|| OffplanError::ArithmeticOverflow {
            context: format!("{pct}% of {price}"),
        })
}

/// Split `pool` into `count` rounded parts; the last part absorbs the
/// remainder so the parts always sum to `pool`.
pub fn split_evenly(pool: Money, count: u32) -> Vec<Money> {
    if count == 0 {
        return Vec::new();
    }
    let per = round_money(pool / Decimal::from(count));
    let mut parts = vec![per; count as usize];
    if let Some(last) = parts.last_mut() {
        *last = pool - per * Decimal::from(count - 1);
    }
    parts
}

/// Translate the selected plan, price and dates into sorted payment events.
pub fn build_payment_events(
    details: &PropertyDetails,
    warnings: &mut Vec<String>,
) -> OffplanResult<PaymentEvents> {
    let plan = &details.selected_plan;
    let price = details.price;
    let costs = acquisition_costs(details);

    let mut events: Vec<PaymentEvent> = Vec::new();

    // --- Down payment (with acquisition costs) ---
    let down_payment = share_of(price, plan.down_payment_percentage)?;
    events.push(PaymentEvent {
        date: details.start_date,
        amount: down_payment + costs.total,
        payment_type: PaymentType::DownPayment,
        description: if costs.total.is_zero() {
            "Down payment".into()
        } else {
            "Down payment incl. acquisition costs".into()
        },
    });

    // --- Pre-handover installments ---
    if plan.installment_months > 0 {
        let pool = share_of(price, plan.installment_share().max(Decimal::ZERO))?;
        let frequency = plan.installment_frequency;
        let count = frequency.installment_count(plan.installment_months);
        for (i, amount) in split_evenly(pool, count).into_iter().enumerate() {
            let n = i as u32 + 1;
            events.push(PaymentEvent {
                date: add_months(details.start_date, n * frequency.step_months())?,
                amount,
                payment_type: PaymentType::Installment,
                description: format!("Installment {n} of {count}"),
            });
        }
    }

    // --- Handover ---
    events.push(PaymentEvent {
        date: details.completion_date,
        amount: share_of(price, plan.handover_payment_percentage)?,
        payment_type: PaymentType::Handover,
        description: "Handover payment".into(),
    });

    // --- Post-handover ---
    let mut unscheduled_post_handover = Decimal::ZERO;
    if plan.has_post_handover() {
        let pool = share_of(price, plan.post_handover_share())?;
        let months = plan.post_handover_months.unwrap_or(0);
        if details.schedule_post_handover {
            for (i, amount) in split_evenly(pool, months).into_iter().enumerate() {
                let n = i as u32 + 1;
                events.push(PaymentEvent {
                    date: add_months(details.completion_date, n)?,
                    amount,
                    payment_type: PaymentType::PostHandover,
                    description: format!("Post-handover payment {n} of {months}"),
                });
            }
        } else {
            unscheduled_post_handover = pool;
            warnings.push(format!(
                "Post-handover share of {}% ({pool}) over {months} months is not scheduled",
                plan.post_handover_share()
            ));
        }
    }

    // Chronological order drives the monthly simulation.
    events.sort_by_key(|e| e.date);

    let mut contractual_total: Money =
        events.iter().map(|e| e.amount).sum::<Money>() - costs.total;

    if details.reconcile_to_price && contractual_total != price {
        let difference = price - contractual_total;
        if let Some(last) = events.last_mut() {
            last.amount += difference;
            contractual_total = price;
        }
    }

    Ok(PaymentEvents {
        events,
        acquisition_costs: costs,
        contractual_total,
        unscheduled_post_handover,
    })
}
