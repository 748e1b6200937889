//! Cross-group audit orchestration.
//!
//! Fits quantile bins once over the working subset, summarizes every
//! (group, bin) cell, and optionally runs a per-bin two-sample t test when
//! exactly two groups are compared.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::binning::{assign_bins, quantile_bins, BinningConfig, DegeneratePolicy};
use crate::bootstrap::BootstrapConfig;
use crate::error::FairbandError;
use crate::summary::{summarize_cell, BinSummary};
use crate::ttest::{student_t_test, TTestResult};
use crate::types::{with_metadata, AnalysisOutput, BinLabel, GroupId, PolicyRecord};
use crate::FairbandResult;

/// Configuration for a cross-group audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Target number of equal-population prediction bins.
    #[serde(default = "default_num_bins")]
    pub num_bins: usize,
    /// Optional bin names, ascending threshold order.
    #[serde(default)]
    pub bin_labels: Option<Vec<String>>,
    /// Explicit ordered group list. Defaults to the distinct non-null group
    /// values of the working subset in first-appearance order.
    #[serde(default)]
    pub groups: Option<Vec<String>>,
    /// Attach a bootstrap summary to every cell when set.
    #[serde(default)]
    pub bootstrap: Option<BootstrapConfig>,
    /// Run a per-bin two-sample t test. Requires exactly two groups; any
    /// other count skips testing with a warning instead of failing.
    #[serde(default)]
    pub run_t_test: bool,
    #[serde(default)]
    pub on_degenerate: DegeneratePolicy,
}

fn default_num_bins() -> usize {
    10
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            num_bins: default_num_bins(),
            bin_labels: None,
            groups: None,
            bootstrap: None,
            run_t_test: false,
            on_degenerate: DegeneratePolicy::default(),
        }
    }
}

/// One group's mapping of bin label to cell summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupCells {
    pub group: GroupId,
    /// Keyed by canonical bin label, iterated in ascending label order.
    pub cells: BTreeMap<BinLabel, BinSummary>,
}

/// Full output of one audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// Quantile boundaries shared by every group.
    pub thresholds: Vec<f64>,
    /// Canonical bin labels, ascending.
    pub bin_labels: Vec<BinLabel>,
    /// Per-group cells, in the resolved group order.
    pub groups: Vec<GroupCells>,
    /// Per-bin t test results; empty when testing was off or skipped.
    pub t_tests: BTreeMap<BinLabel, TTestResult>,
}

/// Run the cross-group fairness audit.
///
/// `subset`, when given, is a row mask over `records` selecting the working
/// subset (the mask length must match the record count). Bins are fitted
/// once over the working subset so every group is measured on the same risk
/// bands. Rows with a null group are excluded from grouping; a requested
/// group with no rows still appears in the report with all-NaN cells.
pub fn run_group_audit(
    records: &[PolicyRecord],
    subset: Option<&[bool]>,
    config: &AuditConfig,
) -> FairbandResult<AnalysisOutput<AuditReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if records.is_empty() {
        return Err(FairbandError::InsufficientData(
            "At least one record is required".into(),
        ));
    }

    let working: Vec<&PolicyRecord> = match subset {
        Some(mask) => {
            if mask.len() != records.len() {
                return Err(FairbandError::InvalidInput {
                    field: "subset".into(),
                    reason: format!(
                        "Mask length {} does not match record count {}",
                        mask.len(),
                        records.len()
                    ),
                });
            }
            records
                .iter()
                .zip(mask)
                .filter(|(_, keep)| **keep)
                .map(|(r, _)| r)
                .collect()
        }
        None => records.iter().collect(),
    };
    if working.is_empty() {
        return Err(FairbandError::InsufficientData(
            "The row filter excluded every record".into(),
        ));
    }

    let predictions: Vec<f64> = working.iter().map(|r| r.prediction).collect();
    let bins = quantile_bins(
        &predictions,
        &BinningConfig {
            num_bins: config.num_bins,
            labels: config.bin_labels.clone(),
            on_degenerate: config.on_degenerate,
        },
    )?;
    let assignments = assign_bins(&predictions, &bins);
    let canonical = bins.canonical_labels();

    let group_list = resolve_groups(&working, config.groups.as_deref());
    if group_list.is_empty() {
        return Err(FairbandError::InsufficientData(
            "No non-null group values in the working subset".into(),
        ));
    }

    let mut groups_out: Vec<GroupCells> = Vec::with_capacity(group_list.len());
    // Raw margins are retained per cell only while testing needs them.
    let mut raw_by_group: Vec<BTreeMap<BinLabel, Vec<f64>>> = Vec::new();

    for group in &group_list {
        let mut cells = BTreeMap::new();
        let mut raw = BTreeMap::new();

        for label in &canonical {
            let mut margins = Vec::new();
            let mut frequencies = Vec::new();
            for (record, assigned) in working.iter().zip(&assignments) {
                if record.group.as_deref() == Some(group.0.as_str()) && assigned == label {
                    margins.push(record.margin);
                    frequencies.push(record.frequency);
                }
            }

            let cell = summarize_cell(&margins, &frequencies, config.bootstrap.as_ref())?;
            cells.insert(label.clone(), cell);
            if config.run_t_test {
                raw.insert(label.clone(), margins);
            }
        }

        groups_out.push(GroupCells {
            group: group.clone(),
            cells,
        });
        if config.run_t_test {
            raw_by_group.push(raw);
        }
    }

    let mut t_tests = BTreeMap::new();
    if config.run_t_test {
        if group_list.len() == 2 {
            for label in &canonical {
                let result = student_t_test(
                    &group_list[0],
                    &raw_by_group[0][label],
                    &group_list[1],
                    &raw_by_group[1][label],
                );
                t_tests.insert(label.clone(), result);
            }
        } else {
            warnings.push(format!(
                "t test skipped: 2 groups expected but {} given",
                group_list.len()
            ));
        }
    }

    let report = AuditReport {
        thresholds: bins.thresholds.clone(),
        bin_labels: canonical,
        groups: groups_out,
        t_tests,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Quantile-band group fairness audit",
        &serde_json::json!({
            "num_bins": config.num_bins,
            "bin_labels": config.bin_labels,
            "groups": report.groups.iter().map(|g| g.group.0.clone()).collect::<Vec<_>>(),
            "bootstrap": config.bootstrap,
            "t_test": config.run_t_test,
            "working_rows": working.len(),
        }),
        warnings,
        elapsed,
        report,
    ))
}

/// Explicit caller order when given, otherwise first-appearance order of
/// distinct non-null group values.
fn resolve_groups(working: &[&PolicyRecord], explicit: Option<&[String]>) -> Vec<GroupId> {
    match explicit {
        Some(groups) => groups.iter().map(|g| GroupId(g.clone())).collect(),
        None => {
            let mut seen: Vec<GroupId> = Vec::new();
            for record in working {
                if let Some(g) = &record.group {
                    if !seen.iter().any(|s| s.0 == *g) {
                        seen.push(GroupId(g.clone()));
                    }
                }
            }
            seen
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(prediction: f64, margin: f64, group: &str) -> PolicyRecord {
        PolicyRecord {
            prediction,
            margin,
            frequency: 0.1,
            group: Some(group.into()),
        }
    }

    fn two_group_records(n: usize) -> Vec<PolicyRecord> {
        (0..n)
            .map(|i| {
                let group = if i % 2 == 0 { "A" } else { "B" };
                record(i as f64 / (n - 1) as f64, (i % 11) as f64 - 5.0, group)
            })
            .collect()
    }

    #[test]
    fn test_smoke_two_groups() {
        let records = two_group_records(200);
        let config = AuditConfig {
            num_bins: 4,
            ..Default::default()
        };
        let output = run_group_audit(&records, None, &config).unwrap();
        let report = &output.result;

        assert_eq!(report.thresholds.len(), 5);
        assert_eq!(report.bin_labels.len(), 4);
        assert_eq!(report.groups.len(), 2);
        for group in &report.groups {
            assert_eq!(group.cells.len(), 4);
        }
        assert!(report.t_tests.is_empty());
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_group_order_first_appearance() {
        let records = vec![
            record(0.1, 1.0, "Z"),
            record(0.4, 2.0, "A"),
            record(0.7, 3.0, "Z"),
            record(0.9, 4.0, "M"),
        ];
        let config = AuditConfig {
            num_bins: 2,
            ..Default::default()
        };
        let output = run_group_audit(&records, None, &config).unwrap();
        let order: Vec<&str> = output
            .result
            .groups
            .iter()
            .map(|g| g.group.0.as_str())
            .collect();
        assert_eq!(order, vec!["Z", "A", "M"]);
    }

    #[test]
    fn test_explicit_group_order_preserved() {
        let records = two_group_records(100);
        let config = AuditConfig {
            num_bins: 2,
            groups: Some(vec!["B".into(), "A".into()]),
            ..Default::default()
        };
        let output = run_group_audit(&records, None, &config).unwrap();
        assert_eq!(output.result.groups[0].group, GroupId("B".into()));
        assert_eq!(output.result.groups[1].group, GroupId("A".into()));
    }

    #[test]
    fn test_requested_absent_group_has_nan_cells() {
        let records = two_group_records(100);
        let config = AuditConfig {
            num_bins: 2,
            groups: Some(vec!["A".into(), "C".into()]),
            ..Default::default()
        };
        let output = run_group_audit(&records, None, &config).unwrap();
        let c_cells = &output.result.groups[1].cells;
        for cell in c_cells.values() {
            assert_eq!(cell.count, 0);
            assert!(cell.mean.is_nan());
        }
    }

    #[test]
    fn test_null_groups_excluded() {
        let mut records = two_group_records(100);
        records.push(PolicyRecord {
            prediction: 0.5,
            margin: 100.0,
            frequency: 0.0,
            group: None,
        });
        let config = AuditConfig {
            num_bins: 2,
            ..Default::default()
        };
        let output = run_group_audit(&records, None, &config).unwrap();
        assert_eq!(output.result.groups.len(), 2);
        let total: usize = output
            .result
            .groups
            .iter()
            .flat_map(|g| g.cells.values())
            .map(|c| c.count)
            .sum();
        // The null-group row participates in binning but in no cell.
        assert_eq!(total, 100);
    }

    #[test]
    fn test_subset_mask_filters_rows() {
        let records = two_group_records(100);
        let mask: Vec<bool> = (0..100).map(|i| i < 50).collect();
        let config = AuditConfig {
            num_bins: 2,
            ..Default::default()
        };
        let output = run_group_audit(&records, Some(&mask), &config).unwrap();
        let total: usize = output
            .result
            .groups
            .iter()
            .flat_map(|g| g.cells.values())
            .map(|c| c.count)
            .sum();
        assert_eq!(total, 50);
    }

    #[test]
    fn test_subset_mask_length_mismatch_rejected() {
        let records = two_group_records(10);
        let mask = vec![true; 9];
        let config = AuditConfig::default();
        assert!(matches!(
            run_group_audit(&records, Some(&mask), &config),
            Err(FairbandError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_all_false_mask_rejected() {
        let records = two_group_records(10);
        let mask = vec![false; 10];
        let config = AuditConfig::default();
        assert!(matches!(
            run_group_audit(&records, Some(&mask), &config),
            Err(FairbandError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_empty_records_rejected() {
        assert!(run_group_audit(&[], None, &AuditConfig::default()).is_err());
    }

    #[test]
    fn test_no_groups_rejected() {
        let records: Vec<PolicyRecord> = (0..10)
            .map(|i| PolicyRecord {
                prediction: i as f64,
                margin: 0.0,
                frequency: 0.0,
                group: None,
            })
            .collect();
        assert!(matches!(
            run_group_audit(&records, None, &AuditConfig::default()),
            Err(FairbandError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_t_test_skipped_with_three_groups() {
        let records: Vec<PolicyRecord> = (0..150)
            .map(|i| {
                let group = ["A", "B", "C"][i % 3];
                record(i as f64 / 149.0, (i % 5) as f64, group)
            })
            .collect();
        let config = AuditConfig {
            num_bins: 3,
            run_t_test: true,
            ..Default::default()
        };
        let output = run_group_audit(&records, None, &config).unwrap();
        assert!(output.result.t_tests.is_empty());
        assert_eq!(output.warnings.len(), 1);
        assert!(output.warnings[0].contains("2 groups expected but 3 given"));
    }

    #[test]
    fn test_t_test_runs_per_bin_with_two_groups() {
        let records = two_group_records(300);
        let config = AuditConfig {
            num_bins: 5,
            run_t_test: true,
            ..Default::default()
        };
        let output = run_group_audit(&records, None, &config).unwrap();
        assert_eq!(output.result.t_tests.len(), 5);
        for result in output.result.t_tests.values() {
            assert!(result.p_value.is_nan() || (0.0..=1.0).contains(&result.p_value));
        }
    }

    #[test]
    fn test_assumptions_echo_resolved_groups() {
        let records = two_group_records(50);
        let config = AuditConfig {
            num_bins: 2,
            ..Default::default()
        };
        let output = run_group_audit(&records, None, &config).unwrap();
        let groups = output.assumptions["groups"].as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(output.metadata.precision, "ieee754_f64");
    }
}
