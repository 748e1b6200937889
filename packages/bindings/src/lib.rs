use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use fairband_core::analysis::AuditConfig;
use fairband_core::binning::BinningConfig;
use fairband_core::bootstrap::BootstrapConfig;
use fairband_core::errorbars::ErrorBarMode;
use fairband_core::PolicyRecord;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Binning
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct BinsInput {
    predictions: Vec<f64>,
    config: BinningConfig,
}

#[napi]
pub fn quantile_bins(input_json: String) -> NapiResult<String> {
    let input: BinsInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let bins = fairband_core::binning::quantile_bins(&input.predictions, &input.config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&bins).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct BootstrapInput {
    values: Vec<f64>,
    #[serde(default)]
    config: BootstrapConfig,
}

#[napi]
pub fn bootstrap_mean(input_json: String) -> NapiResult<String> {
    let input: BootstrapInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let summary = fairband_core::bootstrap::bootstrap_mean(&input.values, &input.config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&summary).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Cross-group audit
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AuditInput {
    records: Vec<PolicyRecord>,
    #[serde(default)]
    subset: Option<Vec<bool>>,
    config: AuditConfig,
    /// Optionally resolve error-bar geometry alongside the report.
    #[serde(default)]
    error_bars: Option<ErrorBarMode>,
}

#[napi]
pub fn group_audit(input_json: String) -> NapiResult<String> {
    let input: AuditInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fairband_core::analysis::run_group_audit(
        &input.records,
        input.subset.as_deref(),
        &input.config,
    )
    .map_err(to_napi_error)?;

    let mut value = serde_json::to_value(&output).map_err(to_napi_error)?;
    if let Some(mode) = input.error_bars {
        let series = fairband_core::errorbars::error_bar_series(&output.result, mode)
            .map_err(to_napi_error)?;
        if let Some(map) = value.as_object_mut() {
            map.insert(
                "error_bars".into(),
                serde_json::to_value(series).map_err(to_napi_error)?,
            );
        }
    }
    serde_json::to_string(&value).map_err(to_napi_error)
}
