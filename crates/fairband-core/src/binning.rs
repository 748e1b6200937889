//! Equal-population quantile binning of the prediction column.
//!
//! Boundaries are fitted once per audit and shared across every group so all
//! groups are compared on identical risk bands.

use serde::{Deserialize, Serialize};

use crate::error::FairbandError;
use crate::types::BinLabel;
use crate::FairbandResult;

/// What to do when duplicate quantile edges reduce the bin count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Collapse duplicate edges and keep the fewer distinct bins.
    #[default]
    Reduce,
    /// Refuse with `InsufficientVariation` instead of reducing.
    Fail,
}

/// Configuration for quantile bin construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinningConfig {
    /// Target number of equal-population bins.
    pub num_bins: usize,
    /// Optional bin names, one per bin in ascending threshold order.
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub on_degenerate: DegeneratePolicy,
}

/// Fitted quantile bins: boundary values plus per-interval labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantileBins {
    /// `bins + 1` non-decreasing boundary values. Bin `i` spans
    /// `(thresholds[i], thresholds[i + 1]]`; the first bin is closed on the
    /// left so the minimum value is always assigned.
    pub thresholds: Vec<f64>,
    /// Label of each interval, in ascending threshold order.
    pub bin_labels: Vec<BinLabel>,
}

impl QuantileBins {
    /// Number of bins actually produced.
    pub fn len(&self) -> usize {
        self.bin_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bin_labels.is_empty()
    }

    /// The canonical label set: every produced label, ascending.
    pub fn canonical_labels(&self) -> Vec<BinLabel> {
        let mut labels = self.bin_labels.clone();
        labels.sort();
        labels
    }
}

/// Quantile value of a **sorted** slice at probability `prob` in `[0, 1]`,
/// using linear interpolation between order statistics.
fn quantile_sorted(sorted: &[f64], prob: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = prob * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Fit equal-population quantile bins over the prediction column.
///
/// Boundaries are the `num_bins + 1` quantile cut points at probabilities
/// `0, 1/k, ..., 1`. The construction is deterministic: identical input and
/// configuration always produce identical thresholds and labels.
pub fn quantile_bins(predictions: &[f64], config: &BinningConfig) -> FairbandResult<QuantileBins> {
    if config.num_bins == 0 {
        return Err(FairbandError::InvalidInput {
            field: "num_bins".into(),
            reason: "Must be at least 1".into(),
        });
    }
    if predictions.is_empty() {
        return Err(FairbandError::InvalidInput {
            field: "predictions".into(),
            reason: "At least one value is required".into(),
        });
    }
    if predictions.iter().any(|v| !v.is_finite()) {
        return Err(FairbandError::InvalidInput {
            field: "predictions".into(),
            reason: "Values must be finite".into(),
        });
    }
    if let Some(labels) = &config.labels {
        if labels.len() != config.num_bins {
            return Err(FairbandError::InvalidInput {
                field: "labels".into(),
                reason: format!(
                    "{} labels supplied for {} bins",
                    labels.len(),
                    config.num_bins
                ),
            });
        }
    }

    let mut sorted = predictions.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let k = config.num_bins;
    let edges: Vec<f64> = (0..=k)
        .map(|i| quantile_sorted(&sorted, i as f64 / k as f64))
        .collect();

    // Duplicate prediction values can make neighbouring quantile edges
    // coincide; only strictly increasing edges delimit usable bins.
    let mut thresholds = vec![edges[0]];
    for &e in &edges[1..] {
        if e > thresholds[thresholds.len() - 1] {
            thresholds.push(e);
        }
    }
    let produced = thresholds.len() - 1;

    if produced == 0 {
        return Err(FairbandError::InsufficientVariation(format!(
            "prediction column has a single distinct value ({})",
            sorted[0]
        )));
    }

    if produced < k {
        match config.on_degenerate {
            DegeneratePolicy::Fail => {
                return Err(FairbandError::InsufficientVariation(format!(
                    "only {} of {} requested bins are distinct",
                    produced, k
                )));
            }
            DegeneratePolicy::Reduce => {
                // A positional name list no longer lines up once bins have
                // collapsed, so reduction is only available for rank labels.
                if config.labels.is_some() {
                    return Err(FairbandError::InsufficientVariation(format!(
                        "cannot map {} supplied labels onto {} distinct bins",
                        k, produced
                    )));
                }
            }
        }
    }

    let bin_labels = match &config.labels {
        Some(names) => names.iter().cloned().map(BinLabel::Named).collect(),
        None => (0..produced).map(BinLabel::Index).collect(),
    };

    Ok(QuantileBins {
        thresholds,
        bin_labels,
    })
}

/// Assign every prediction to its bin.
///
/// Intervals are right-closed, `(thresholds[i], thresholds[i + 1]]`, with the
/// first interval additionally closed on the left. Values below the first or
/// above the last boundary clamp into the outermost bins, which only matters
/// when assigning records outside the fitting set.
pub fn assign_bins(predictions: &[f64], bins: &QuantileBins) -> Vec<BinLabel> {
    predictions
        .iter()
        .map(|&v| bins.bin_labels[locate_bin(v, &bins.thresholds)].clone())
        .collect()
}

fn locate_bin(value: f64, thresholds: &[f64]) -> usize {
    let last = thresholds.len() - 2;
    for i in 0..last {
        if value <= thresholds[i + 1] {
            return i;
        }
    }
    last
}
