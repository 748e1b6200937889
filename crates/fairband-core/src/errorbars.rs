//! Error-bar geometry for the presentation layer.
//!
//! The mode is a closed set and the offsets are resolved here, in the core,
//! so renderers receive plain point-plus-offset series and never branch on
//! mode names themselves.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::AuditReport;
use crate::error::FairbandError;
use crate::types::{BinLabel, GroupId};
use crate::FairbandResult;

/// How the error bars around each cell mean are constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorBarMode {
    /// Parametric 95% confidence interval of the mean.
    #[serde(rename = "parametric-95ci")]
    Parametric95,
    /// Empirical 95% interval of the bootstrapped means.
    #[serde(rename = "bootstrap-95ci")]
    Bootstrap95,
    /// Two standard deviations of the bootstrapped means.
    #[serde(rename = "bootstrap-2std")]
    Bootstrap2Std,
    /// One standard deviation of the bootstrapped means.
    #[serde(rename = "bootstrap-1std")]
    Bootstrap1Std,
    /// Two standard errors of the mean.
    #[serde(rename = "2sem")]
    TwoSem,
    /// One standard error of the mean.
    #[serde(rename = "1sem")]
    OneSem,
}

impl ErrorBarMode {
    pub fn requires_bootstrap(&self) -> bool {
        matches!(
            self,
            ErrorBarMode::Bootstrap95 | ErrorBarMode::Bootstrap2Std | ErrorBarMode::Bootstrap1Std
        )
    }
}

impl fmt::Display for ErrorBarMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorBarMode::Parametric95 => "parametric-95ci",
            ErrorBarMode::Bootstrap95 => "bootstrap-95ci",
            ErrorBarMode::Bootstrap2Std => "bootstrap-2std",
            ErrorBarMode::Bootstrap1Std => "bootstrap-1std",
            ErrorBarMode::TwoSem => "2sem",
            ErrorBarMode::OneSem => "1sem",
        };
        f.write_str(name)
    }
}

/// One bar: the cell mean and the distances to the bar ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBarPoint {
    pub label: BinLabel,
    pub estimate: f64,
    /// Distance from the estimate down to the lower bar end.
    pub lower_offset: f64,
    /// Distance from the estimate up to the upper bar end.
    pub upper_offset: f64,
}

/// All bars for one group, in ascending bin order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBarSeries {
    pub group: GroupId,
    pub mode: ErrorBarMode,
    pub points: Vec<ErrorBarPoint>,
}

/// Resolve the error-bar geometry for every group in the report.
///
/// Degenerate cells produce NaN offsets, which renderers treat as a missing
/// bar. Bootstrap-based modes require the report to have been computed with
/// bootstrap summaries attached.
pub fn error_bar_series(
    report: &AuditReport,
    mode: ErrorBarMode,
) -> FairbandResult<Vec<ErrorBarSeries>> {
    let mut series = Vec::with_capacity(report.groups.len());

    for group in &report.groups {
        let mut points = Vec::with_capacity(group.cells.len());
        for (label, cell) in &group.cells {
            let (lower_offset, upper_offset) = match mode {
                ErrorBarMode::Parametric95 => {
                    (cell.mean - cell.ci_lower, cell.ci_upper - cell.mean)
                }
                ErrorBarMode::TwoSem => (2.0 * cell.sem, 2.0 * cell.sem),
                ErrorBarMode::OneSem => (cell.sem, cell.sem),
                ErrorBarMode::Bootstrap95
                | ErrorBarMode::Bootstrap2Std
                | ErrorBarMode::Bootstrap1Std => {
                    // An empty cell legitimately has no bootstrap; any other
                    // cell missing one means the audit ran without bootstrap.
                    match (&cell.bootstrap, cell.count) {
                        (Some(bs), _) => match mode {
                            ErrorBarMode::Bootstrap95 => {
                                (cell.mean - bs.ci_lower, bs.ci_upper - cell.mean)
                            }
                            ErrorBarMode::Bootstrap2Std => (2.0 * bs.std_dev, 2.0 * bs.std_dev),
                            _ => (bs.std_dev, bs.std_dev),
                        },
                        (None, 0) => (f64::NAN, f64::NAN),
                        (None, _) => {
                            return Err(FairbandError::InvalidInput {
                                field: "mode".into(),
                                reason: format!(
                                    "{} requires an audit computed with bootstrap summaries",
                                    mode
                                ),
                            });
                        }
                    }
                }
            };
            points.push(ErrorBarPoint {
                label: label.clone(),
                estimate: cell.mean,
                lower_offset,
                upper_offset,
            });
        }
        series.push(ErrorBarSeries {
            group: group.group.clone(),
            mode,
            points,
        });
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{run_group_audit, AuditConfig};
    use crate::bootstrap::BootstrapConfig;
    use crate::types::PolicyRecord;

    fn audited(bootstrap: bool) -> AuditReport {
        let records: Vec<PolicyRecord> = (0..120)
            .map(|i| PolicyRecord {
                prediction: i as f64 / 119.0,
                margin: (i % 13) as f64 - 6.0,
                frequency: 0.05,
                group: Some(if i % 2 == 0 { "A".into() } else { "B".into() }),
            })
            .collect();
        let config = AuditConfig {
            num_bins: 3,
            bootstrap: bootstrap.then(BootstrapConfig::default),
            ..Default::default()
        };
        run_group_audit(&records, None, &config).unwrap().result
    }

    #[test]
    fn test_parametric_offsets_symmetric() {
        let report = audited(false);
        let series = error_bar_series(&report, ErrorBarMode::Parametric95).unwrap();
        assert_eq!(series.len(), 2);
        for s in &series {
            assert_eq!(s.points.len(), 3);
            for p in &s.points {
                assert!((p.lower_offset - p.upper_offset).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_sem_modes_scale() {
        let report = audited(false);
        let one = error_bar_series(&report, ErrorBarMode::OneSem).unwrap();
        let two = error_bar_series(&report, ErrorBarMode::TwoSem).unwrap();
        for (a, b) in one[0].points.iter().zip(&two[0].points) {
            assert!((2.0 * a.lower_offset - b.lower_offset).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bootstrap_modes() {
        let report = audited(true);
        for mode in [
            ErrorBarMode::Bootstrap95,
            ErrorBarMode::Bootstrap2Std,
            ErrorBarMode::Bootstrap1Std,
        ] {
            let series = error_bar_series(&report, mode).unwrap();
            for p in &series[0].points {
                assert!(p.lower_offset.is_finite());
                assert!(p.upper_offset.is_finite());
            }
        }
    }

    #[test]
    fn test_bootstrap_mode_without_bootstrap_rejected() {
        let report = audited(false);
        assert!(matches!(
            error_bar_series(&report, ErrorBarMode::Bootstrap95),
            Err(FairbandError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_mode_serde_names() {
        assert_eq!(
            serde_json::to_string(&ErrorBarMode::Parametric95).unwrap(),
            "\"parametric-95ci\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorBarMode::TwoSem).unwrap(),
            "\"2sem\""
        );
        let mode: ErrorBarMode = serde_json::from_str("\"bootstrap-95ci\"").unwrap();
        assert_eq!(mode, ErrorBarMode::Bootstrap95);
    }

    #[test]
    fn test_display_matches_serde() {
        for mode in [
            ErrorBarMode::Parametric95,
            ErrorBarMode::Bootstrap95,
            ErrorBarMode::Bootstrap2Std,
            ErrorBarMode::Bootstrap1Std,
            ErrorBarMode::TwoSem,
            ErrorBarMode::OneSem,
        ] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode));
        }
    }
}
