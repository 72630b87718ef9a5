use clap::Args;
use serde_json::{json, Value};

use offplan_core::catalog::default_mortgage_plans;

use super::schedule::load_payment_plans;

/// Arguments for listing the plan catalogs
#[derive(Args)]
pub struct PlansArgs {
    /// JSON file with a replacement payment plan catalog
    #[arg(long)]
    pub plans_file: Option<String>,

    /// Only list payment plans
    #[arg(long, conflicts_with = "mortgage_only")]
    pub payment_only: bool,

    /// Only list mortgage plans
    #[arg(long)]
    pub mortgage_only: bool,
}

pub fn run_plans(args: PlansArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment_plans = if args.mortgage_only {
        Vec::new()
    } else {
        load_payment_plans(args.plans_file.as_deref())?
    };
    let mortgage_plans = if args.payment_only {
        Vec::new()
    } else {
        default_mortgage_plans()
    };

    Ok(json!({
        "payment_plans": serde_json::to_value(payment_plans)?,
        "mortgage_plans": serde_json::to_value(mortgage_plans)?,
    }))
}
