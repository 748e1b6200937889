//! Record-set loading: CSV with configurable column names, JSON arrays, and
//! the row-by-row join of a separate predictions file.

use fairband_core::PolicyRecord;

use super::file;

/// Column names used when reading records from CSV.
pub struct ColumnMap {
    pub prediction: String,
    pub margin: String,
    pub frequency: String,
    pub group: String,
}

/// Load records from a CSV or JSON file, decided by extension.
pub fn load_records(
    path: &str,
    columns: &ColumnMap,
) -> Result<Vec<PolicyRecord>, Box<dyn std::error::Error>> {
    if path.to_lowercase().ends_with(".csv") {
        read_csv_records(path, columns)
    } else {
        file::read_json(path)
    }
}

/// Overwrite each record's prediction with the matching entry of a JSON
/// array, row by row. Lengths must match exactly.
pub fn join_predictions(
    records: &mut [PolicyRecord],
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let predictions: Vec<f64> = file::read_json(path)?;
    if predictions.len() != records.len() {
        return Err(format!(
            "Predictions file holds {} values for {} records",
            predictions.len(),
            records.len()
        )
        .into());
    }
    for (record, prediction) in records.iter_mut().zip(predictions) {
        record.prediction = prediction;
    }
    Ok(())
}

fn read_csv_records(
    path: &str,
    columns: &ColumnMap,
) -> Result<Vec<PolicyRecord>, Box<dyn std::error::Error>> {
    let canonical = file::resolve_path(path)?;
    let mut reader = csv::Reader::from_path(&canonical)
        .map_err(|e| format!("Failed to open '{}': {}", canonical.display(), e))?;

    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);

    // The prediction column may be absent when a predictions file is joined
    // afterwards; absent predictions stay NaN and the engine rejects them if
    // no join fills them in.
    let prediction_idx = position(&columns.prediction);
    let margin_idx = position(&columns.margin)
        .ok_or_else(|| format!("Column '{}' not found in {}", columns.margin, path))?;
    let frequency_idx = position(&columns.frequency);
    let group_idx = position(&columns.group);

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let numeric = |idx: usize, name: &str| -> Result<f64, Box<dyn std::error::Error>> {
            let raw = row.get(idx).unwrap_or("");
            raw.trim()
                .parse::<f64>()
                .map_err(|_| format!("Row {}: '{}' is not numeric in '{}'", line + 2, raw, name).into())
        };

        let prediction = match prediction_idx {
            Some(idx) => numeric(idx, &columns.prediction)?,
            None => f64::NAN,
        };
        let margin = numeric(margin_idx, &columns.margin)?;
        let frequency = match frequency_idx {
            Some(idx) => numeric(idx, &columns.frequency)?,
            None => 0.0,
        };
        let group = group_idx
            .and_then(|idx| row.get(idx))
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string);

        records.push(PolicyRecord {
            prediction,
            margin,
            frequency,
            group,
        });
    }

    if records.is_empty() {
        return Err(format!("No data rows in {}", path).into());
    }

    Ok(records)
}
