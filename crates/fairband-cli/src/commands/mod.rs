pub mod audit;
pub mod bins;
pub mod bootstrap;

use serde_json::Value;

use crate::input;

/// Resolve a numeric series from a file, an inline flag list, or stdin.
pub(crate) fn get_values(
    input_path: &Option<String>,
    cli_values: &Option<Vec<f64>>,
) -> Result<Vec<f64>, Box<dyn std::error::Error>> {
    if let Some(path) = input_path {
        let data: Value = input::file::read_json_value(path)?;
        if let Some(arr) = data.as_array() {
            let values = arr
                .iter()
                .map(|v| {
                    v.as_f64()
                        .ok_or_else(|| format!("Expected a number, got {}", v))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(values)
        } else if let Some(arr) = data
            .as_object()
            .and_then(|obj| obj.get("values"))
            .and_then(|v| v.as_array())
        {
            Ok(arr.iter().filter_map(|v| v.as_f64()).collect())
        } else {
            Err("Expected a JSON array of numbers or an object with a 'values' array".into())
        }
    } else if let Some(values) = cli_values {
        Ok(values.clone())
    } else if let Some(data) = input::stdin::read_stdin()? {
        let parsed: Vec<f64> = serde_json::from_value(data)?;
        Ok(parsed)
    } else {
        Err("Provide --values or --input file or pipe JSON via stdin".into())
    }
}
