use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use offplan_core::calendar::add_months;
use offplan_core::catalog::{
    default_mortgage_plans, default_payment_plans, find_mortgage_plan, find_plan,
};
use offplan_core::schedule::compute_schedule;
use offplan_core::{
    AssetIncome, Currency, MortgagePlan, PaymentMethod, PaymentPlan, PropertyDetails,
    RentalIncome,
};

use crate::input;

/// Months between purchase and handover when no completion date is given
const DEFAULT_CONSTRUCTION_MONTHS: u32 = 24;

/// Arguments for the payment schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a JSON PropertyDetails file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Property price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Payment plan name or zero-based catalog index
    #[arg(long, default_value = "Standard")]
    pub plan: String,

    /// JSON file with a replacement payment plan catalog
    #[arg(long)]
    pub plans_file: Option<String>,

    /// Purchase date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Handover date, defaults to 24 months after the start date
    #[arg(long)]
    pub completion_date: Option<NaiveDate>,

    /// Last simulated month, defaults to the completion date
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Currency the amounts are entered in
    #[arg(long, default_value = "AED")]
    pub currency: Currency,

    /// Convert price and asset amount to this currency before scheduling
    #[arg(long)]
    pub display_currency: Option<Currency>,

    /// Side asset whose interest offsets payments
    #[arg(long)]
    pub asset_amount: Option<Decimal>,

    /// Annual rate on the side asset in percent (e.g. 5 for 5%)
    #[arg(long, default_value = "0")]
    pub asset_apr: Decimal,

    /// Monthly rent received from the completion month on
    #[arg(long)]
    pub monthly_rent: Option<Decimal>,

    /// Buyer's share of the DLD transfer fee in percent (0-4)
    #[arg(long)]
    pub dld_buyer_percentage: Option<Decimal>,

    /// Realtor commission in percent of the price
    #[arg(long)]
    pub realtor_commission: Option<Decimal>,

    #[arg(long)]
    pub valuation_fee: Option<Decimal>,

    #[arg(long)]
    pub no_objection_certificate: Option<Decimal>,

    #[arg(long)]
    pub title_deed_fee: Option<Decimal>,

    #[arg(long)]
    pub administrative_fees: Option<Decimal>,

    /// Mortgage plan name or index; switches the payment method to mortgage
    #[arg(long)]
    pub mortgage_plan: Option<String>,

    /// Annual mortgage rate overriding the plan's
    #[arg(long)]
    pub mortgage_rate: Option<Decimal>,

    /// Mortgage setup fee in percent of the loan
    #[arg(long)]
    pub mortgage_setup_fee: Option<Decimal>,

    /// Mortgage registration fee in percent of the loan
    #[arg(long)]
    pub mortgage_registration_fee: Option<Decimal>,

    /// Turn the post-handover share into monthly payments after completion
    #[arg(long)]
    pub schedule_post_handover: bool,

    /// Fold rounding differences into the last payment
    #[arg(long)]
    pub reconcile: bool,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let details: PropertyDetails = match input::read_document(args.input.as_deref())? {
        Some(details) => details,
        None => details_from_flags(&args)?,
    };

    let details = match args.display_currency {
        Some(currency) => details.converted_to(currency)?,
        None => details,
    };

    debug!(
        plan = %details.selected_plan.name,
        price = %details.price,
        currency = %details.currency,
        "computing schedule"
    );
    let result = compute_schedule(&details)?;
    Ok(serde_json::to_value(result)?)
}

fn details_from_flags(args: &ScheduleArgs) -> Result<PropertyDetails, Box<dyn std::error::Error>> {
    let price = args
        .price
        .ok_or("--price is required (or provide --input)")?;

    let plans = load_payment_plans(args.plans_file.as_deref())?;
    let plan = find_plan(&plans, &args.plan)
        .ok_or_else(|| format!("Unknown payment plan '{}'", args.plan))?
        .clone();

    let start_date = args
        .start_date
        .unwrap_or_else(|| Local::now().date_naive());
    let completion_date = match args.completion_date {
        Some(date) => date,
        None => add_months(start_date, DEFAULT_CONSTRUCTION_MONTHS)?,
    };
    let end_date = args.end_date.unwrap_or(completion_date);

    let mut details = PropertyDetails::new(price, start_date, completion_date, end_date, plan);
    details.currency = args.currency;

    details.asset_income = args.asset_amount.map(|initial_amount| AssetIncome {
        initial_amount,
        apr: args.asset_apr,
        currency: args.currency,
    });
    details.rental_income = args.monthly_rent.map(|monthly_amount| RentalIncome {
        monthly_amount,
        currency: args.currency,
    });

    if let Some(v) = args.dld_buyer_percentage {
        details.dld_buyer_percentage = v;
    }
    if let Some(v) = args.realtor_commission {
        details.realtor_commission = v;
    }
    if let Some(v) = args.valuation_fee {
        details.valuation_fee = v;
    }
    if let Some(v) = args.no_objection_certificate {
        details.no_objection_certificate = v;
    }
    if let Some(v) = args.title_deed_fee {
        details.title_deed_fee = v;
    }
    if let Some(v) = args.administrative_fees {
        details.administrative_fees = v;
    }

    if let Some(ref key) = args.mortgage_plan {
        let mortgage_plans = default_mortgage_plans();
        let mortgage: MortgagePlan = find_mortgage_plan(&mortgage_plans, key)
            .ok_or_else(|| format!("Unknown mortgage plan '{key}'"))?
            .clone();
        details.payment_method = PaymentMethod::Mortgage;
        details.selected_mortgage_plan = Some(mortgage);
    }
    details.custom_mortgage_rate = args.mortgage_rate;
    if let Some(v) = args.mortgage_setup_fee {
        details.mortgage_setup_fee = v;
    }
    if let Some(v) = args.mortgage_registration_fee {
        details.mortgage_registration_fee = v;
    }

    details.schedule_post_handover = args.schedule_post_handover;
    details.reconcile_to_price = args.reconcile;
    Ok(details)
}

/// The built-in catalog, or the plans listed in `path`.
pub fn load_payment_plans(
    path: Option<&str>,
) -> Result<Vec<PaymentPlan>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let plans: Vec<PaymentPlan> = input::file::read_json(path)?;
            if plans.is_empty() {
                return Err(format!("'{path}' does not contain any payment plans").into());
            }
            Ok(plans)
        }
        None => Ok(default_payment_plans()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rust_decimal_macros::dec;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ScheduleArgs,
    }

    fn parse(argv: &[&str]) -> ScheduleArgs {
        TestCli::parse_from(std::iter::once("offplan").chain(argv.iter().copied())).args
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_flags_default_dates_and_plan() {
        let args = parse(&["--price", "1500000", "--start-date", "2025-01-31"]);
        let details = details_from_flags(&args).unwrap();
        assert_eq!(details.selected_plan.name, "Standard");
        assert_eq!(details.completion_date, d(2027, 1, 31));
        assert_eq!(details.end_date, details.completion_date);
        assert!(details.asset_income.is_none());
    }

    #[test]
    fn test_flags_resolve_plan_by_index_and_income() {
        let args = parse(&[
            "--price",
            "900000",
            "--plan",
            "1",
            "--start-date",
            "2025-03-01",
            "--asset-amount",
            "100000",
            "--asset-apr",
            "6",
            "--monthly-rent",
            "7000",
            "--dld-buyer-percentage",
            "2",
        ]);
        let details = details_from_flags(&args).unwrap();
        assert_eq!(details.selected_plan.name, "40/60");
        assert_eq!(details.asset_income.as_ref().unwrap().apr, dec!(6));
        assert_eq!(details.rental_income.as_ref().unwrap().monthly_amount, dec!(7000));
        assert_eq!(details.dld_buyer_percentage, dec!(2));
    }

    #[test]
    fn test_mortgage_plan_switches_payment_method() {
        let args = parse(&["--price", "2000000", "--mortgage-plan", "0"]);
        let details = details_from_flags(&args).unwrap();
        assert_eq!(details.payment_method, PaymentMethod::Mortgage);
        assert!(details.selected_mortgage_plan.is_some());
    }

    #[test]
    fn test_missing_price_and_unknown_plan_are_errors() {
        assert!(details_from_flags(&parse(&[])).is_err());
        assert!(details_from_flags(&parse(&["--price", "1", "--plan", "Nope"])).is_err());
    }
}
