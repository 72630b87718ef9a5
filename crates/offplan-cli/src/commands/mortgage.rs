use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use offplan_core::mortgage::calculate_monthly_mortgage_payment;

/// Arguments for the annuity payment calculator
#[derive(Args)]
pub struct MortgagePaymentArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent (e.g. 4.5)
    #[arg(long)]
    pub rate: Decimal,

    /// Term in years
    #[arg(long)]
    pub years: u32,
}

pub fn run_mortgage_payment(args: MortgagePaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.principal < Decimal::ZERO {
        return Err("--principal cannot be negative".into());
    }
    let monthly = calculate_monthly_mortgage_payment(args.principal, args.rate, args.years)?
        .round_dp(2);
    let total_paid = monthly
        .checked_mul(Decimal::from(args.years * 12))
        .ok_or("total paid over the term is out of range")?;

    Ok(json!({
        "result": {
            "monthly_payment": monthly.to_string(),
            "total_paid": total_paid.to_string(),
            "total_interest": (total_paid - args.principal).max(Decimal::ZERO).to_string(),
            "principal": args.principal.to_string(),
            "interest_rate": args.rate.to_string(),
            "term_years": args.years,
        }
    }))
}
