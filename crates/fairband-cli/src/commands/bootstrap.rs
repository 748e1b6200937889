use clap::Args;
use serde_json::Value;

use fairband_core::bootstrap::{bootstrap_mean, BootstrapConfig};

use super::get_values;

/// Arguments for bootstrapping the mean of a sample
#[derive(Args)]
pub struct BootstrapArgs {
    /// Path to a JSON file with sample values
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated sample values (e.g. "12.5,-3.0,7.25")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub values: Option<Vec<f64>>,

    /// Number of with-replacement resamples
    #[arg(long, default_value_t = 1000)]
    pub resamples: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

pub fn run_bootstrap(args: BootstrapArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let values = get_values(&args.input, &args.values)?;

    let config = BootstrapConfig {
        resamples: args.resamples,
        seed: args.seed,
    };
    let summary = bootstrap_mean(&values, &config)?;

    Ok(serde_json::to_value(summary)?)
}
