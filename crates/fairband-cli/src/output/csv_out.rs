use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// Audit reports flatten to one row per (group, bin) cell; other outputs
/// fall back to field/value pairs or array tables.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(groups) = result_obj.get("groups").and_then(|g| g.as_array()) {
        write_cells_csv(&mut wtr, groups);
    } else {
        match value {
            Value::Object(map) => {
                if let Some(Value::Object(result)) = map.get("result") {
                    let _ = wtr.write_record(["field", "value"]);
                    for (key, val) in result {
                        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                    }
                } else {
                    let _ = wtr.write_record(["field", "value"]);
                    for (key, val) in map {
                        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                    }
                }
            }
            Value::Array(arr) => {
                write_array_csv(&mut wtr, arr);
            }
            _ => {
                let _ = wtr.write_record([&format_csv_value(value)]);
            }
        }
    }

    let _ = wtr.flush();
}

const CELL_COLUMNS: [&str; 12] = [
    "count",
    "mean",
    "std_dev",
    "min",
    "q25",
    "median",
    "q75",
    "max",
    "sem",
    "ci_lower",
    "ci_upper",
    "frequency_mean",
];

fn write_cells_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, groups: &[Value]) {
    let mut header = vec!["group", "bin"];
    header.extend(CELL_COLUMNS);
    let _ = wtr.write_record(&header);

    for group in groups {
        let name = group.get("group").and_then(|g| g.as_str()).unwrap_or("");
        if let Some(cells) = group.get("cells").and_then(|c| c.as_object()) {
            for (label, cell) in cells {
                let mut row = vec![name.to_string(), label.clone()];
                for column in CELL_COLUMNS {
                    row.push(cell.get(column).map(format_csv_value).unwrap_or_default());
                }
                let _ = wtr.write_record(&row);
            }
        }
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
