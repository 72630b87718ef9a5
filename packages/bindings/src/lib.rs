use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;

use offplan_core::catalog::{default_mortgage_plans, default_payment_plans};
use offplan_core::{currency, Currency, PropertyDetails};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_decimal(field: &str, raw: &str) -> NapiResult<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| to_napi_error(format!("{field}: {e}")))
}

fn parse_currency(raw: &str) -> NapiResult<Currency> {
    raw.parse::<Currency>().map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Full payment schedule for a JSON `PropertyDetails` record.
#[napi]
pub fn compute_schedule(input_json: String) -> NapiResult<String> {
    let input: PropertyDetails = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = offplan_core::schedule::compute_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Catalogs
// ---------------------------------------------------------------------------

#[napi]
pub fn payment_plans() -> NapiResult<String> {
    serde_json::to_string(&default_payment_plans()).map_err(to_napi_error)
}

#[napi]
pub fn mortgage_plans() -> NapiResult<String> {
    serde_json::to_string(&default_mortgage_plans()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// Fixed-rate conversion; amounts travel as decimal strings.
#[napi]
pub fn convert_amount(amount: String, from: String, to: String) -> NapiResult<String> {
    let amount = parse_decimal("amount", &amount)?;
    let converted =
        currency::convert_amount(amount, parse_currency(&from)?, parse_currency(&to)?)
            .map_err(to_napi_error)?;
    Ok(converted.to_string())
}

#[napi]
pub fn format_currency(amount: String, currency_code: String) -> NapiResult<String> {
    let amount = parse_decimal("amount", &amount)?;
    Ok(currency::format_currency(amount, parse_currency(&currency_code)?))
}
