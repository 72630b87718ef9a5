use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use offplan_core::currency::{convert_amount, format_currency};
use offplan_core::{round_money, Currency};

/// Arguments for fixed-rate currency conversion
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ConvertArgs {
    /// Amount to convert
    #[arg(long)]
    pub amount: Decimal,

    /// Source currency (AED or USD)
    #[arg(long, default_value = "AED")]
    pub from: Currency,

    /// Target currency (AED or USD)
    #[arg(long, default_value = "USD")]
    pub to: Currency,
}

pub fn run_convert(args: ConvertArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let converted = convert_amount(args.amount, args.from, args.to)?;
    let rounded = round_money(converted);

    Ok(json!({
        "result": {
            "converted": converted.to_string(),
            "rounded": rounded.to_string(),
            "formatted": format_currency(rounded, args.to),
            "from": args.from,
            "to": args.to,
            "amount": args.amount.to_string(),
        }
    }))
}
