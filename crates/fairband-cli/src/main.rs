mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::audit::AuditArgs;
use commands::bins::BinsArgs;
use commands::bootstrap::BootstrapArgs;

/// Quantile-band fairness audits for pricing model outputs
#[derive(Parser)]
#[command(
    name = "fba",
    version,
    about = "Quantile-band fairness audits for pricing model outputs",
    long_about = "Audits a pricing model's premium-minus-claims margin across \
                  equal-population prediction bands and categorical groups: \
                  per-band descriptive statistics, parametric and bootstrap \
                  confidence intervals, and per-band two-sample t tests."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full cross-group fairness audit
    Audit(AuditArgs),
    /// Fit quantile bins over a prediction column
    Bins(BinsArgs),
    /// Bootstrap the mean of a numeric sample
    Bootstrap(BootstrapArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Audit(args) => commands::audit::run_audit(args),
        Commands::Bins(args) => commands::bins::run_bins(args),
        Commands::Bootstrap(args) => commands::bootstrap::run_bootstrap(args),
        Commands::Version => {
            println!("fba {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
