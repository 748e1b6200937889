//! Descriptive statistics for one (group, bin) cell.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::bootstrap::{bootstrap_mean, percentile_sorted, BootstrapConfig, BootstrapSummary};
use crate::FairbandResult;

/// Statistics for one (group, bin) cell. Immutable once created; empty and
/// singleton cells carry NaN where a statistic is undefined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); NaN below two rows.
    pub std_dev: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
    /// Standard error of the mean; NaN below two rows.
    pub sem: f64,
    /// Parametric 95% confidence interval of the mean, normal approximation.
    pub ci_lower: f64,
    pub ci_upper: f64,
    /// Mean of the auxiliary claim-frequency column.
    pub frequency_mean: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<BootstrapSummary>,
}

/// Two-sided 95% quantile of the standard normal (~1.959964).
pub(crate) fn normal_z95() -> f64 {
    Normal::new(0.0, 1.0)
        .map(|n| n.inverse_cdf(0.975))
        .unwrap_or(1.959963984540054)
}

pub(crate) fn mean_of(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let n = values.len() as f64;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
}

/// Summarize the margins of one (group, bin) cell.
///
/// `margins` and `frequencies` are the cell's rows in matching order. A cell
/// with zero or one row produces NaN spread statistics instead of failing;
/// downstream consumers treat those as missing error bars. When `bootstrap`
/// is set the raw margins are resampled and the summary attached (skipped
/// for an empty cell, where there is nothing to resample).
pub fn summarize_cell(
    margins: &[f64],
    frequencies: &[f64],
    bootstrap: Option<&BootstrapConfig>,
) -> FairbandResult<BinSummary> {
    let count = margins.len();

    let mean = mean_of(margins);
    let std_dev = sample_std_dev(margins, mean);

    let mut sorted = margins.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let (min, q25, median, q75, max) = if count > 0 {
        (
            sorted[0],
            percentile_sorted(&sorted, 25.0),
            percentile_sorted(&sorted, 50.0),
            percentile_sorted(&sorted, 75.0),
            sorted[count - 1],
        )
    } else {
        (f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN)
    };

    // NaN std dev propagates into the SEM and both interval bounds.
    let sem = std_dev / (count as f64).sqrt();
    let z = normal_z95();
    let ci_lower = mean - z * sem;
    let ci_upper = mean + z * sem;

    let frequency_mean = mean_of(frequencies);

    let bootstrap = match bootstrap {
        Some(config) if count > 0 => Some(bootstrap_mean(margins, config)?),
        _ => None,
    };

    Ok(BinSummary {
        count,
        mean,
        std_dev,
        min,
        q25,
        median,
        q75,
        max,
        sem,
        ci_lower,
        ci_upper,
        frequency_mean,
        bootstrap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_descriptives_on_known_sample() {
        let margins = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let freqs = vec![0.1; 8];
        let cell = summarize_cell(&margins, &freqs, None).unwrap();

        assert_eq!(cell.count, 8);
        assert!((cell.mean - 5.0).abs() < EPS);
        // Sample variance of this classic set is 32/7.
        assert!((cell.std_dev - (32.0_f64 / 7.0).sqrt()).abs() < EPS);
        assert_eq!(cell.min, 2.0);
        assert_eq!(cell.max, 9.0);
        assert!((cell.median - 4.5).abs() < EPS);
        assert!((cell.frequency_mean - 0.1).abs() < EPS);
    }

    #[test]
    fn test_quartiles_linear_interpolation() {
        let margins = vec![1.0, 2.0, 3.0, 4.0];
        let cell = summarize_cell(&margins, &[], None).unwrap();
        assert!((cell.q25 - 1.75).abs() < EPS);
        assert!((cell.median - 2.5).abs() < EPS);
        assert!((cell.q75 - 3.25).abs() < EPS);
    }

    #[test]
    fn test_sem_matches_definition() {
        let margins = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let cell = summarize_cell(&margins, &[], None).unwrap();
        let expected = cell.std_dev / 5.0_f64.sqrt();
        assert!((cell.sem - expected).abs() < EPS);
    }

    #[test]
    fn test_confidence_interval_symmetric() {
        let margins = vec![10.0, 12.0, 9.0, 11.0, 13.0, 8.0];
        let cell = summarize_cell(&margins, &[], None).unwrap();
        assert!(
            ((cell.mean - cell.ci_lower) - (cell.ci_upper - cell.mean)).abs() < 1e-9,
            "interval is not symmetric around the mean"
        );
        // z for a two-sided 95% interval under the normal approximation.
        assert!((cell.ci_upper - cell.mean - 1.959964 * cell.sem).abs() < 1e-5);
    }

    #[test]
    fn test_singleton_cell_is_nan_not_error() {
        let cell = summarize_cell(&[3.5], &[0.2], None).unwrap();
        assert_eq!(cell.count, 1);
        assert_eq!(cell.mean, 3.5);
        assert!(cell.std_dev.is_nan());
        assert!(cell.sem.is_nan());
        assert!(cell.ci_lower.is_nan());
        assert!(cell.ci_upper.is_nan());
        assert_eq!(cell.min, 3.5);
        assert_eq!(cell.max, 3.5);
    }

    #[test]
    fn test_empty_cell_is_nan_not_error() {
        let cell = summarize_cell(&[], &[], None).unwrap();
        assert_eq!(cell.count, 0);
        assert!(cell.mean.is_nan());
        assert!(cell.std_dev.is_nan());
        assert!(cell.sem.is_nan());
        assert!(cell.ci_lower.is_nan());
        assert!(cell.ci_upper.is_nan());
        assert!(cell.frequency_mean.is_nan());
    }

    #[test]
    fn test_bootstrap_attached_on_request() {
        let margins: Vec<f64> = (0..40).map(|i| i as f64 * 0.5).collect();
        let cell = summarize_cell(&margins, &[], Some(&BootstrapConfig::default())).unwrap();
        let bs = cell.bootstrap.expect("bootstrap summary missing");
        assert!(bs.ci_lower <= bs.mean && bs.mean <= bs.ci_upper);
    }

    #[test]
    fn test_bootstrap_skipped_for_empty_cell() {
        let cell = summarize_cell(&[], &[], Some(&BootstrapConfig::default())).unwrap();
        assert!(cell.bootstrap.is_none());
    }

    #[test]
    fn test_no_bootstrap_by_default() {
        let cell = summarize_cell(&[1.0, 2.0], &[], None).unwrap();
        assert!(cell.bootstrap.is_none());
    }

    #[test]
    fn test_z_value() {
        assert!((normal_z95() - 1.959964).abs() < 1e-5);
    }
}
