use serde_json::Value;
use std::io;

/// Column order for schedule rows, matching the period record fields.
pub const SCHEDULE_HEADERS: [&str; 7] = [
    "principal",
    "annual_rate_pct",
    "year",
    "month",
    "installment",
    "prepayment",
    "outstanding",
];

/// Write output as CSV to stdout. Schedule runs become one row per month
/// under a fixed header; everything else degrades to field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(Value::Array(periods)) = map.get("periods") {
                write_schedule_csv(&mut wtr, periods);
            } else if let Some(Value::Object(result)) = map.get("result") {
                // Comparison envelope: export the savings summary.
                if let Some(Value::Object(summary)) = result.get("summary") {
                    write_field_value_csv(&mut wtr, summary);
                } else {
                    write_field_value_csv(&mut wtr, result);
                }
            } else {
                write_field_value_csv(&mut wtr, map);
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_schedule_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, periods: &[Value]) {
    let _ = wtr.write_record(SCHEDULE_HEADERS);
    for period in periods {
        if let Value::Object(map) = period {
            let row: Vec<String> = SCHEDULE_HEADERS
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

fn write_field_value_csv(
    wtr: &mut csv::Writer<io::StdoutLock<'_>>,
    map: &serde_json::Map<String, Value>,
) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        if val.is_object() || val.is_array() {
            continue;
        }
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);
        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
