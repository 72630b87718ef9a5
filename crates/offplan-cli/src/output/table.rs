use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use offplan_core::currency::{format_currency, format_percentage};
use offplan_core::schedule::{total_amount, ScheduleOutput};
use offplan_core::{Currency, PaymentType, ScheduleEntry};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else if map.contains_key("payment_plans") || map.contains_key("mortgage_plans") {
                print_catalogs(map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    let schedule = result
        .get("entries")
        .and_then(|_| serde_json::from_value::<ScheduleOutput>(result.clone()).ok());

    if let Some(schedule) = schedule {
        let currency = envelope
            .get("assumptions")
            .and_then(|a| a.get("currency"))
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<Currency>().ok())
            .unwrap_or_default();
        print_schedule(&schedule, currency);
    } else if let Value::Object(res_map) = result {
        print_flat_object(&Value::Object(res_map.clone()));
    } else {
        print_flat_object(&Value::Object(envelope.clone()));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_schedule(schedule: &ScheduleOutput, currency: Currency) {
    let money = |v: Decimal| format_currency(v, currency);

    let mut builder = Builder::default();
    builder.push_record([
        "Date",
        "Description",
        "Amount",
        "Income",
        "Rent",
        "Rent used",
        "Asset used",
        "Reinvested",
        "Additional funds",
        "Coverage",
        "Rent coverage",
        "Asset value",
    ]);
    for entry in &schedule.entries {
        builder.push_record(schedule_row(entry, &money));
    }
    println!("{}", Table::from(builder));

    let mut totals = Builder::default();
    totals.push_record(["Total", "Value"]);
    totals.push_record([
        "Payments".to_string(),
        money(total_amount(&schedule.entries)),
    ]);
    totals.push_record(["Contractual total".to_string(), money(schedule.contractual_total)]);
    totals.push_record(["Property price".to_string(), money(schedule.expected_total)]);
    if !schedule.acquisition_costs.total.is_zero() {
        totals.push_record([
            "Acquisition costs".to_string(),
            money(schedule.acquisition_costs.total),
        ]);
    }
    if !schedule.unscheduled_post_handover.is_zero() {
        totals.push_record([
            "Unscheduled post-handover".to_string(),
            money(schedule.unscheduled_post_handover),
        ]);
    }
    totals.push_record([
        "Additional funds needed".to_string(),
        money(schedule.total_additional_funds_needed),
    ]);
    totals.push_record(["Rental income".to_string(), money(schedule.total_rental_income)]);
    totals.push_record(["Asset income".to_string(), money(schedule.total_asset_income)]);
    totals.push_record(["Final asset value".to_string(), money(schedule.final_asset_value)]);
    println!("\n{}", Table::from(totals));

    if let Some(ref quote) = schedule.mortgage {
        let mut mortgage = Builder::default();
        mortgage.push_record(["Mortgage", quote.plan_name.as_str()]);
        mortgage.push_record(["Loan".to_string(), money(quote.loan_amount)]);
        mortgage.push_record(["Down payment".to_string(), money(quote.down_payment)]);
        mortgage.push_record(["Rate".to_string(), format!("{}%", quote.interest_rate)]);
        mortgage.push_record(["Term".to_string(), format!("{} years", quote.term_years)]);
        mortgage.push_record(["Monthly payment".to_string(), money(quote.monthly_payment)]);
        mortgage.push_record(["Total interest".to_string(), money(quote.total_interest)]);
        mortgage.push_record(["Setup fee".to_string(), money(quote.setup_fee)]);
        mortgage.push_record(["Registration fee".to_string(), money(quote.registration_fee)]);
        println!("\n{}", Table::from(mortgage));
    }
}

fn schedule_row(entry: &ScheduleEntry, money: &impl Fn(Decimal) -> String) -> Vec<String> {
    let blank_if_zero = |v: Decimal| if v.is_zero() { String::new() } else { money(v) };
    let is_summary = entry.payment_type == PaymentType::Summary;

    vec![
        entry.date.format("%b %Y").to_string(),
        entry.description.clone(),
        money(entry.amount),
        blank_if_zero(entry.income_for_period),
        blank_if_zero(entry.rental_income),
        blank_if_zero(entry.rental_amount_used),
        blank_if_zero(entry.asset_amount_used),
        blank_if_zero(entry.reinvested_amount),
        blank_if_zero(entry.additional_funds_needed),
        if entry.payment_type.is_payment() {
            format_percentage(entry.coverage_ratio)
        } else {
            String::new()
        },
        if entry.payment_type.is_payment() || is_summary {
            format_percentage(entry.rental_coverage_ratio)
        } else {
            String::new()
        },
        money(entry.current_asset_value),
    ]
}

fn print_catalogs(map: &Map<String, Value>) {
    if let Some(Value::Array(plans)) = map.get("payment_plans") {
        if !plans.is_empty() {
            println!("Payment plans:");
            print_array_table(plans);
        }
    }
    if let Some(Value::Array(plans)) = map.get("mortgage_plans") {
        if !plans.is_empty() {
            println!("\nMortgage plans:");
            print_array_table(plans);
        }
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
