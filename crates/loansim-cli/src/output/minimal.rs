use serde_json::Value;

/// Print just the key answer value from the output: the interest saved for
/// a comparison, the installment amount, months to payoff for a schedule,
/// or the first field otherwise.
pub fn print_minimal(value: &Value) {
    if let Some(Value::Array(periods)) = value.get("periods") {
        println!("{}", periods.len());
        return;
    }

    // Comparison envelope: dig into result.summary.
    let core = value
        .as_object()
        .and_then(|m| m.get("result"))
        .and_then(|r| r.get("summary"))
        .or_else(|| value.as_object().and_then(|m| m.get("result")))
        .unwrap_or(value);

    let priority_keys = ["interest_saved", "months_saved", "installment", "total_prepayment"];

    if let Value::Object(map) = core {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(core));
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
