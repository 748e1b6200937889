//! Bootstrap estimation of the sampling distribution of the mean.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::FairbandError;
use crate::FairbandResult;

/// Configuration for the bootstrap estimator.
///
/// The seed is explicit per-call configuration rather than process-global
/// state: identical input and configuration reproduce identical output, and
/// independent cells can resample concurrently without coordination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Number of with-replacement resamples.
    #[serde(default = "default_resamples")]
    pub resamples: usize,
    /// RNG seed.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_resamples() -> usize {
    1000
}

fn default_seed() -> u64 {
    42
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        BootstrapConfig {
            resamples: default_resamples(),
            seed: default_seed(),
        }
    }
}

/// Summary of the resampled-mean distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapSummary {
    /// Mean of the bootstrapped means.
    pub mean: f64,
    /// Sample standard deviation of the bootstrapped means.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Empirical 2.5th percentile of the bootstrapped means.
    pub ci_lower: f64,
    /// Empirical 97.5th percentile of the bootstrapped means.
    pub ci_upper: f64,
}

/// Percentile of a **sorted** slice with linear interpolation, `p` in 0-100.
pub(crate) fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Bootstrap the mean of `values`.
///
/// Draws `config.resamples` samples of size `n` with replacement, records
/// each resample's mean, and summarizes that distribution. A single-value
/// input yields a zero-variance distribution whose interval collapses to the
/// value itself; that is valid output, not an error.
pub fn bootstrap_mean(
    values: &[f64],
    config: &BootstrapConfig,
) -> FairbandResult<BootstrapSummary> {
    if values.is_empty() {
        return Err(FairbandError::EmptySample(
            "bootstrap requires at least one observation".into(),
        ));
    }
    if config.resamples == 0 {
        return Err(FairbandError::InvalidInput {
            field: "resamples".into(),
            reason: "Must be at least 1".into(),
        });
    }

    let n = values.len();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut means = Vec::with_capacity(config.resamples);
    for _ in 0..config.resamples {
        let mut sum = 0.0;
        for _ in 0..n {
            sum += values[rng.gen_range(0..n)];
        }
        means.push(sum / n as f64);
    }

    means.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let b = means.len() as f64;
    let mean = means.iter().sum::<f64>() / b;
    let std_dev = if means.len() > 1 {
        (means.iter().map(|m| (m - mean).powi(2)).sum::<f64>() / (b - 1.0)).sqrt()
    } else {
        0.0
    };

    Ok(BootstrapSummary {
        mean,
        std_dev,
        min: means[0],
        max: means[means.len() - 1],
        ci_lower: percentile_sorted(&means, 2.5),
        ci_upper: percentile_sorted(&means, 97.5),
    })
}
