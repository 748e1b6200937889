use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Audit reports get one cell table per group plus a t-test table; any other
/// output falls back to a generic field/value rendering.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                if result.get("groups").is_some() {
                    print_audit_tables(result, map);
                } else {
                    print_result_table(result, map);
                }
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

const CELL_COLUMNS: [&str; 10] = [
    "count",
    "mean",
    "std_dev",
    "sem",
    "ci_lower",
    "ci_upper",
    "median",
    "frequency_mean",
    "q25",
    "q75",
];

fn print_audit_tables(result: &Value, envelope: &serde_json::Map<String, Value>) {
    if let Some(thresholds) = result.get("thresholds").and_then(|t| t.as_array()) {
        let rendered: Vec<String> = thresholds.iter().map(format_value).collect();
        println!("Thresholds: {}", rendered.join(", "));
    }

    for group in result
        .get("groups")
        .and_then(|g| g.as_array())
        .into_iter()
        .flatten()
    {
        let name = group.get("group").and_then(|g| g.as_str()).unwrap_or("?");
        println!("\nGroup {}", name);

        let mut builder = Builder::default();
        let mut header = vec!["bin".to_string()];
        header.extend(CELL_COLUMNS.iter().map(|c| c.to_string()));
        builder.push_record(header);

        if let Some(cells) = group.get("cells").and_then(|c| c.as_object()) {
            for (label, cell) in cells {
                let mut row = vec![label.clone()];
                for column in CELL_COLUMNS {
                    row.push(cell.get(column).map(format_value).unwrap_or_default());
                }
                builder.push_record(row);
            }
        }
        println!("{}", Table::from(builder));
    }

    if let Some(tests) = result.get("t_tests").and_then(|t| t.as_object()) {
        if !tests.is_empty() {
            println!("\nPer-bin t tests");
            let mut builder = Builder::default();
            builder.push_record(["bin", "t", "p", "df", "mean_diff"]);
            for (label, test) in tests {
                builder.push_record([
                    label.clone(),
                    test.get("t_statistic").map(format_value).unwrap_or_default(),
                    test.get("p_value").map(format_value).unwrap_or_default(),
                    test.get("degrees_of_freedom")
                        .map(format_value)
                        .unwrap_or_default(),
                    test.get("mean_difference")
                        .map(format_value)
                        .unwrap_or_default(),
                ]);
            }
            println!("{}", Table::from(builder));
        }
    }

    print_envelope_footer(envelope);
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    if let Value::Object(res_map) = result {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in res_map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        print_flat_object(&Value::Object(envelope.clone()));
    }

    print_envelope_footer(envelope);
}

fn print_envelope_footer(envelope: &serde_json::Map<String, Value>) {
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

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
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
        // serde_json renders non-finite statistics as null.
        Value::Null => "nan".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
