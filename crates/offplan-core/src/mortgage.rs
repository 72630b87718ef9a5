use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::OffplanError;
use crate::plans::MortgagePlan;
use crate::property::PropertyDetails;
use crate::time_value::annuity_payment;
use crate::types::{Money, Percent};
use crate::OffplanResult;

/// Loan terms implied by a mortgage plan for a given price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageQuote {
    pub plan_name: String,
    pub loan_amount: Money,
    /// Price less the loan
    pub down_payment: Money,
    /// Annual rate actually used (custom rate wins over the plan's)
    pub interest_rate: Percent,
    pub term_years: u32,
    pub monthly_payment: Money,
    /// Sum of all payments less the loan
    pub total_interest: Money,
    pub setup_fee: Money,
    pub registration_fee: Money,
    /// The plan's maximum loan amount reduced the loan below
    /// `price * (100 - down%)`
    pub capped_by_max_loan: bool,
}

/// Longest mortgage term accepted, in years.
pub const MAX_MORTGAGE_TERM_YEARS: u32 = 50;

/// Monthly payment on `principal` at `annual_rate` percent over `term_years`.
pub fn calculate_monthly_mortgage_payment(
    principal: Money,
    annual_rate: Percent,
    term_years: u32,
) -> OffplanResult<Money> {
    if annual_rate < Decimal::ZERO {
        return Err(OffplanError::InvalidInput {
            field: "interest_rate".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    if term_years == 0 {
        return Err(OffplanError::InvalidInput {
            field: "term_years".into(),
            reason: "Mortgage term must be at least 1 year".into(),
        });
    }
    if term_years > MAX_MORTGAGE_TERM_YEARS {
        return Err(OffplanError::InvalidInput {
            field: "term_years".into(),
            reason: format!("Mortgage term cannot exceed {MAX_MORTGAGE_TERM_YEARS} years"),
        });
    }
    annuity_payment(principal, annual_rate / dec!(1200), term_years * 12)
}

/// Quote the mortgage described by `plan` for the property's price and fee
/// settings.
pub fn quote_mortgage(details: &PropertyDetails, plan: &MortgagePlan) -> OffplanResult<MortgageQuote> {
    let rate = details.custom_mortgage_rate.unwrap_or(plan.interest_rate);
    if plan.down_payment_percentage < Decimal::ZERO
        || plan.down_payment_percentage > Decimal::ONE_HUNDRED
    {
        return Err(OffplanError::InvalidInput {
            field: "down_payment_percentage".into(),
            reason: "Mortgage down payment must be between 0 and 100".into(),
        });
    }

    let uncapped = share(details.price, Decimal::ONE_HUNDRED - plan.down_payment_percentage)?
        .max(Decimal::ZERO);
    let capped_by_max_loan = uncapped > plan.max_loan_amount;
    let loan_amount = uncapped.min(plan.max_loan_amount).round_dp(2);

    let monthly_payment =
        calculate_monthly_mortgage_payment(loan_amount, rate, plan.term_years)?.round_dp(2);
    let total_paid = monthly_payment
        .checked_mul(Decimal::from(plan.term_years * 12))
        .ok_or_else(|| OffplanError::ArithmeticOverflow {
            context: "mortgage total paid".into(),
        })?;

    Ok(MortgageQuote {
        plan_name: plan.name.clone(),
        loan_amount,
        down_payment: details.price - loan_amount,
        interest_rate: rate,
        term_years: plan.term_years,
        monthly_payment,
        total_interest: (total_paid - loan_amount).max(Decimal::ZERO),
        setup_fee: share(loan_amount, details.mortgage_setup_fee)?.round_dp(2),
        registration_fee: share(loan_amount, details.mortgage_registration_fee)?.round_dp(2),
        capped_by_max_loan,
    })
}

/// `amount * pct / 100`
fn share(amount: Money, pct: Percent) -> OffplanResult<Money> {
    amount
        .checked_mul(pct)
        .map(|v| v / Decimal::ONE_HUNDRED)
        .ok_or_else(|| OffplanError::ArithmeticOverflow {
            context: "mortgage loan sizing".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_mortgage_plans, default_payment_plans};
    use chrono::NaiveDate;

    fn details(price: Decimal) -> PropertyDetails {
        let d = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        PropertyDetails::new(price, d, d, d, default_payment_plans()[0].clone())
    }

    #[test]
    fn test_quote_standard_plan() {
        let mut input = details(dec!(1000000));
        input.mortgage_setup_fee = dec!(1);
        input.mortgage_registration_fee = dec!(0.25);
        let plan = &default_mortgage_plans()[0];
        let q = quote_mortgage(&input, plan).unwrap();

        assert_eq!(q.loan_amount, dec!(800000));
        assert_eq!(q.down_payment, dec!(200000));
        assert_eq!(q.setup_fee, dec!(8000));
        assert_eq!(q.registration_fee, dec!(2000));
        assert!(!q.capped_by_max_loan);
        assert!(q.monthly_payment > dec!(4400) && q.monthly_payment < dec!(4500));
        assert!(q.total_interest > Decimal::ZERO);
    }

    #[test]
    fn test_quote_capped_by_max_loan() {
        let input = details(dec!(20000000));
        let plan = &default_mortgage_plans()[1]; // 10M cap, 30% down
        let q = quote_mortgage(&input, plan).unwrap();
        assert!(q.capped_by_max_loan);
        assert_eq!(q.loan_amount, dec!(10000000));
        assert_eq!(q.down_payment, dec!(10000000));
    }

    #[test]
    fn test_custom_rate_overrides_plan() {
        let mut input = details(dec!(1000000));
        input.custom_mortgage_rate = Some(Decimal::ZERO);
        let plan = &default_mortgage_plans()[0];
        let q = quote_mortgage(&input, plan).unwrap();
        assert_eq!(q.interest_rate, Decimal::ZERO);
        // 800,000 / 300 months
        assert_eq!(q.monthly_payment, dec!(2666.67));
    }

    #[test]
    fn test_zero_term_rejected() {
        assert!(calculate_monthly_mortgage_payment(dec!(1000), dec!(4), 0).is_err());
    }

    #[test]
    fn test_term_beyond_limit_rejected() {
        let err = calculate_monthly_mortgage_payment(dec!(800000), dec!(4), 5000).unwrap_err();
        assert!(matches!(err, OffplanError::InvalidInput { ref field, .. } if field == "term_years"));
    }

    #[test]
    fn test_quote_rejects_out_of_range_plan_down_payment() {
        let mut plan = default_mortgage_plans()[0].clone();
        plan.down_payment_percentage = dec!(-1000000000000000000000000000);
        assert!(quote_mortgage(&details(dec!(1000000)), &plan).is_err());
    }
}
