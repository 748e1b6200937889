use clap::Args;
use serde::Serialize;
use serde_json::Value;

use fairband_core::binning::{quantile_bins, BinningConfig};
use fairband_core::BinLabel;

use super::get_values;
use crate::commands::audit::DegeneratePolicyArg;

/// Arguments for fitting quantile bins over a prediction column
#[derive(Args)]
pub struct BinsArgs {
    /// Path to a JSON file with prediction values
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated prediction values
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub values: Option<Vec<f64>>,

    /// Number of equal-population bins
    #[arg(long, default_value_t = 10)]
    pub bins: usize,

    /// Comma-separated bin names, ascending threshold order
    #[arg(long, value_delimiter = ',')]
    pub labels: Option<Vec<String>>,

    /// Behaviour when duplicate quantile edges reduce the bin count
    #[arg(long, default_value = "reduce")]
    pub on_degenerate: DegeneratePolicyArg,
}

#[derive(Serialize)]
struct BinsOutput {
    thresholds: Vec<f64>,
    labels: Vec<BinLabel>,
    bin_count: usize,
    requested_bins: usize,
}

pub fn run_bins(args: BinsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let predictions = get_values(&args.input, &args.values)?;

    let config = BinningConfig {
        num_bins: args.bins,
        labels: args.labels.clone(),
        on_degenerate: args.on_degenerate.clone().into(),
    };
    let bins = quantile_bins(&predictions, &config)?;

    let output = BinsOutput {
        thresholds: bins.thresholds.clone(),
        labels: bins.canonical_labels(),
        bin_count: bins.len(),
        requested_bins: args.bins,
    };

    Ok(serde_json::to_value(output)?)
}
