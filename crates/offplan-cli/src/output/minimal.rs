use serde_json::Value;

/// Print just the key answer value from the output.
///
/// For a schedule that is the money the buyer still has to find; otherwise
/// the first well-known field present, then the first field of the result.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "total_additional_funds_needed",
        "monthly_payment",
        "formatted",
        "rounded",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some(Value::Array(plans)) = map.get("payment_plans") {
            for plan in plans {
                if let Some(name) = plan.get("name").and_then(Value::as_str) {
                    println!("{}", name);
                }
            }
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
