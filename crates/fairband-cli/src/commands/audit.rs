use clap::{Args, ValueEnum};
use serde_json::Value;

use fairband_core::analysis::{run_group_audit, AuditConfig};
use fairband_core::binning::DegeneratePolicy;
use fairband_core::bootstrap::BootstrapConfig;
use fairband_core::errorbars::{error_bar_series, ErrorBarMode};

use crate::input;
use crate::input::records::ColumnMap;

/// Arguments for the full cross-group fairness audit
#[derive(Args)]
pub struct AuditArgs {
    /// Path to CSV or JSON records
    #[arg(long)]
    pub input: String,

    /// JSON array of predictions to join onto the records, row by row
    #[arg(long)]
    pub predictions: Option<String>,

    /// Number of equal-population prediction bins
    #[arg(long, default_value_t = 10)]
    pub bins: usize,

    /// Comma-separated bin names, ascending threshold order
    #[arg(long, value_delimiter = ',')]
    pub labels: Option<Vec<String>>,

    /// Comma-separated ordered group list (default: distinct groups in the data)
    #[arg(long, value_delimiter = ',')]
    pub groups: Option<Vec<String>>,

    /// Attach bootstrap summaries to every cell
    #[arg(long)]
    pub bootstrap: bool,

    /// Bootstrap resample count
    #[arg(long, default_value_t = 1000)]
    pub resamples: usize,

    /// Bootstrap RNG seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Run a per-bin two-sample t test (requires exactly two groups)
    #[arg(long)]
    pub ttest: bool,

    /// Resolve error-bar geometry for charting
    #[arg(long)]
    pub error_bars: Option<ErrorBarModeArg>,

    /// Behaviour when duplicate quantile edges reduce the bin count
    #[arg(long, default_value = "reduce")]
    pub on_degenerate: DegeneratePolicyArg,

    /// CSV column holding the model prediction
    #[arg(long, default_value = "prediction")]
    pub prediction_col: String,

    /// CSV column holding the premium-minus-claims margin
    #[arg(long, default_value = "margin")]
    pub margin_col: String,

    /// CSV column holding the claim frequency
    #[arg(long, default_value = "frequency")]
    pub frequency_col: String,

    /// CSV column holding the group attribute
    #[arg(long, default_value = "group")]
    pub group_col: String,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum DegeneratePolicyArg {
    Reduce,
    Fail,
}

impl From<DegeneratePolicyArg> for DegeneratePolicy {
    fn from(arg: DegeneratePolicyArg) -> Self {
        match arg {
            DegeneratePolicyArg::Reduce => DegeneratePolicy::Reduce,
            DegeneratePolicyArg::Fail => DegeneratePolicy::Fail,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ErrorBarModeArg {
    #[value(name = "parametric-95ci")]
    Parametric95,
    #[value(name = "bootstrap-95ci")]
    Bootstrap95,
    #[value(name = "bootstrap-2std")]
    Bootstrap2Std,
    #[value(name = "bootstrap-1std")]
    Bootstrap1Std,
    #[value(name = "2sem")]
    TwoSem,
    #[value(name = "1sem")]
    OneSem,
}

impl From<ErrorBarModeArg> for ErrorBarMode {
    fn from(arg: ErrorBarModeArg) -> Self {
        match arg {
            ErrorBarModeArg::Parametric95 => ErrorBarMode::Parametric95,
            ErrorBarModeArg::Bootstrap95 => ErrorBarMode::Bootstrap95,
            ErrorBarModeArg::Bootstrap2Std => ErrorBarMode::Bootstrap2Std,
            ErrorBarModeArg::Bootstrap1Std => ErrorBarMode::Bootstrap1Std,
            ErrorBarModeArg::TwoSem => ErrorBarMode::TwoSem,
            ErrorBarModeArg::OneSem => ErrorBarMode::OneSem,
        }
    }
}

pub fn run_audit(args: AuditArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let columns = ColumnMap {
        prediction: args.prediction_col.clone(),
        margin: args.margin_col.clone(),
        frequency: args.frequency_col.clone(),
        group: args.group_col.clone(),
    };

    let mut records = input::records::load_records(&args.input, &columns)?;
    if let Some(path) = &args.predictions {
        input::records::join_predictions(&mut records, path)?;
    }

    let config = AuditConfig {
        num_bins: args.bins,
        bin_labels: args.labels.clone(),
        groups: args.groups.clone(),
        bootstrap: args.bootstrap.then(|| BootstrapConfig {
            resamples: args.resamples,
            seed: args.seed,
        }),
        run_t_test: args.ttest,
        on_degenerate: args.on_degenerate.clone().into(),
    };

    let output = run_group_audit(&records, None, &config)?;

    let mut value = serde_json::to_value(&output)?;
    if let Some(mode) = args.error_bars {
        let series = error_bar_series(&output.result, mode.into())?;
        if let Some(map) = value.as_object_mut() {
            map.insert("error_bars".into(), serde_json::to_value(series)?);
        }
    }

    Ok(value)
}
