use serde_json::Value;

/// Print just the key answer value from the output.
///
/// For an audit report, one line per group and bin with the cell mean.
/// Otherwise, look for well-known result fields in order of priority, then
/// fall back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Audit report: groups -> cells -> mean
    if let Some(groups) = result_obj.get("groups").and_then(|g| g.as_array()) {
        for group in groups {
            let name = group
                .get("group")
                .and_then(|g| g.as_str())
                .unwrap_or("?");
            if let Some(cells) = group.get("cells").and_then(|c| c.as_object()) {
                for (label, cell) in cells {
                    let mean = cell.get("mean").map(format_minimal).unwrap_or_default();
                    println!("{}\t{}\t{}", name, label, mean);
                }
            }
        }
        return;
    }

    let priority_keys = ["mean", "thresholds", "labels", "t_statistic", "p_value"];

    if let Value::Object(map) = result_obj {
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

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "nan".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
