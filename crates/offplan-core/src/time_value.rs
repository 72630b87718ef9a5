use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::OffplanError;
use crate::types::{round_money, Money, Percent};
use crate::OffplanResult;

/// Outcome of compounding a balance over a number of months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundGrowth {
    /// Balance after growth, rounded to whole currency units
    pub final_amount: Money,
    /// `final_amount - initial`
    pub total_income: Money,
}

/// Monthly rate as a decimal from an annual percentage (12 -> 0.01).
pub fn monthly_rate_from_apr(apr: Percent) -> Decimal {
    apr / dec!(12) / dec!(100)
}

/// Compound `initial` monthly at `apr / 12` for `months` months.
///
/// `final_amount = round(initial * (1 + apr/12/100)^months)`. The schedule
/// loop calls this with `months = 1` once per simulated month. Fails with
/// `ArithmeticOverflow` when the balance leaves the `Decimal` range.
pub fn compound_growth(initial: Money, apr: Percent, months: u32) -> OffplanResult<CompoundGrowth> {
    let one_plus_r = Decimal::ONE + monthly_rate_from_apr(apr);
    let compound = checked_power(one_plus_r, months, "compound growth factor")?;

    let grown = initial
        .checked_mul(compound)
        .ok_or_else(|| overflow("compound growth balance"))?;
    let final_amount = round_money(grown);
    Ok(CompoundGrowth {
        final_amount,
        total_income: final_amount - initial,
    })
}

/// `base^n` via iterative multiplication, failing instead of panicking.
fn checked_power(base: Decimal, n: u32, context: &str) -> OffplanResult<Decimal> {
    let mut acc = Decimal::ONE;
    for _ in 0..n {
        acc = acc.checked_mul(base).ok_or_else(|| overflow(context))?;
    }
    Ok(acc)
}

fn overflow(context: &str) -> OffplanError {
    OffplanError::ArithmeticOverflow {
        context: context.into(),
    }
}

/// Standard fixed-rate annuity payment: P * r(1+r)^n / ((1+r)^n - 1)
///
/// `monthly_rate` is a decimal (0.0035 for 4.2% annual).
pub fn annuity_payment(
    principal: Money,
    monthly_rate: Decimal,
    total_months: u32,
) -> OffplanResult<Money> {
    if total_months == 0 {
        return Err(OffplanError::DivisionByZero {
            context: "annuity payment with zero months".into(),
        });
    }

    if monthly_rate.is_zero() {
        // Interest-free: straight-line amortisation
        return Ok(principal / Decimal::from(total_months));
    }

    let compound = checked_power(Decimal::ONE + monthly_rate, total_months, "annuity factor")?;

    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(OffplanError::DivisionByZero {
            context: "annuity payment denominator".into(),
        });
    }

    principal
        .checked_mul(monthly_rate)
        .and_then(|v| v.checked_mul(compound))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| overflow("annuity payment"))
}
