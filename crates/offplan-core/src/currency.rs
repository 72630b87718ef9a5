//! Fixed-rate currency conversion and display formatting.
//!
//! Rates are constants, not live quotes, and are not exact inverses of each
//! other.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::OffplanError;
use crate::types::{round_money, Currency, Money};
use crate::OffplanResult;

pub const AED_TO_USD: Decimal = dec!(0.27);
pub const USD_TO_AED: Decimal = dec!(3.67);

/// Convert `amount` between currencies at the fixed rates (no rounding).
pub fn convert_amount(amount: Money, from: Currency, to: Currency) -> OffplanResult<Money> {
    let rate = match (from, to) {
        (Currency::AED, Currency::USD) => AED_TO_USD,
        (Currency::USD, Currency::AED) => USD_TO_AED,
        _ => return Ok(amount),
    };
    amount
        .checked_mul(rate)
        .ok_or_else(|| OffplanError::ArithmeticOverflow {
            context: format!("converting {amount} {from} to {to}"),
        })
}

/// Whole-unit currency label: `AED 1,250,000`, `$1,250,000`, `-$500`.
pub fn format_currency(amount: Money, currency: Currency) -> String {
    let rounded = round_money(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = rounded.abs().trunc().to_string();
    let grouped = group_thousands(&digits, ',');

    match currency {
        Currency::USD => format!("{sign}${grouped}"),
        Currency::AED => format!("{sign}AED {grouped}"),
    }
}

/// Nearest whole percent with a `%` suffix.
pub fn format_percentage(value: Decimal) -> String {
    let rounded = round_money(value);
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    format!("{}%", rounded.trunc())
}

fn group_thousands(int_part: &str, sep: char) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}
