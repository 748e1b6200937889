//! Independent two-sample Student's t test between two groups' margins
//! within one prediction band.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::summary::{mean_of, normal_z95, sample_std_dev};
use crate::types::GroupId;

/// One row of the descriptive two-group comparison table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDescription {
    pub group: GroupId,
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub sem: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// Result of the independent two-sample t test for one bin.
///
/// Degenerate cells (either group with fewer than two rows, or zero pooled
/// variance) yield non-finite statistic and p-value; that is expected output
/// for sparse bins, not a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TTestResult {
    pub t_statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: f64,
    /// Mean of the first group minus mean of the second.
    pub mean_difference: f64,
    /// Per-group rows followed by a combined row.
    pub description: Vec<GroupDescription>,
}

fn describe(group: GroupId, values: &[f64]) -> GroupDescription {
    let count = values.len();
    let mean = mean_of(values);
    let std_dev = sample_std_dev(values, mean);
    let sem = std_dev / (count as f64).sqrt();
    let z = normal_z95();
    GroupDescription {
        group,
        count,
        mean,
        std_dev,
        sem,
        ci_lower: mean - z * sem,
        ci_upper: mean + z * sem,
    }
}

fn two_sided_p(t: f64, df: f64) -> f64 {
    if t.is_nan() || df < 1.0 {
        return f64::NAN;
    }
    if t.is_infinite() {
        // Zero pooled variance with distinct means.
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
        Err(_) => f64::NAN,
    }
}

/// Pooled-variance Student's t test of `a` against `b`.
///
/// `t = (m1 - m2) / sqrt(s2p * (1/n1 + 1/n2))` with
/// `s2p = ((n1 - 1) s1^2 + (n2 - 1) s2^2) / (n1 + n2 - 2)` and a two-sided
/// p-value from the Student's t distribution with `n1 + n2 - 2` degrees of
/// freedom.
pub fn student_t_test(
    group_a: &GroupId,
    a: &[f64],
    group_b: &GroupId,
    b: &[f64],
) -> TTestResult {
    let n1 = a.len() as f64;
    let n2 = b.len() as f64;

    let m1 = mean_of(a);
    let m2 = mean_of(b);
    let v1 = sample_std_dev(a, m1).powi(2);
    let v2 = sample_std_dev(b, m2).powi(2);

    let df = n1 + n2 - 2.0;
    let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
    let t_statistic = (m1 - m2) / (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    let p_value = two_sided_p(t_statistic, df);

    let mut combined = a.to_vec();
    combined.extend_from_slice(b);

    TTestResult {
        t_statistic,
        p_value,
        degrees_of_freedom: df,
        mean_difference: m1 - m2,
        description: vec![
            describe(group_a.clone(), a),
            describe(group_b.clone(), b),
            describe(GroupId("combined".into()), &combined),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gid(s: &str) -> GroupId {
        GroupId(s.into())
    }

    #[test]
    fn test_known_two_sample_case() {
        // Equal sizes and equal variances: t works out to exactly -1.
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let b = vec![2.0, 3.0, 4.0, 5.0, 6.0];
        let result = student_t_test(&gid("A"), &a, &gid("B"), &b);

        assert!((result.t_statistic - (-1.0)).abs() < 1e-12);
        assert_eq!(result.degrees_of_freedom, 8.0);
        assert!((result.mean_difference - (-1.0)).abs() < 1e-12);
        // Two-tailed p for |t| = 1 at 8 degrees of freedom.
        assert!(
            (result.p_value - 0.3466).abs() < 1e-3,
            "p = {}",
            result.p_value
        );
    }

    #[test]
    fn test_identical_samples_with_variance() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let result = student_t_test(&gid("A"), &a, &gid("B"), &a);
        assert_eq!(result.t_statistic, 0.0);
        assert!((result.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_same_mean_is_nan() {
        let a = vec![5.0, 5.0, 5.0];
        let result = student_t_test(&gid("A"), &a, &gid("B"), &a);
        assert!(result.t_statistic.is_nan());
        assert!(result.p_value.is_nan());
    }

    #[test]
    fn test_zero_variance_distinct_means() {
        let a = vec![5.0, 5.0, 5.0];
        let b = vec![6.0, 6.0, 6.0];
        let result = student_t_test(&gid("A"), &a, &gid("B"), &b);
        assert!(result.t_statistic.is_infinite());
        assert_eq!(result.p_value, 0.0);
    }

    #[test]
    fn test_singleton_group_is_nan_not_error() {
        let result = student_t_test(&gid("A"), &[1.0], &gid("B"), &[2.0, 3.0, 4.0]);
        assert!(result.t_statistic.is_nan());
        assert!(result.p_value.is_nan());
    }

    #[test]
    fn test_empty_group_is_nan_not_error() {
        let result = student_t_test(&gid("A"), &[], &gid("B"), &[2.0, 3.0]);
        assert!(result.t_statistic.is_nan());
        assert!(result.p_value.is_nan());
    }

    #[test]
    fn test_p_value_within_unit_interval() {
        let a = vec![0.3, 1.2, -0.4, 0.9, 2.2, 1.1];
        let b = vec![1.8, 2.4, 1.1, 3.0, 2.7, 1.9];
        let result = student_t_test(&gid("A"), &a, &gid("B"), &b);
        assert!(result.p_value >= 0.0 && result.p_value <= 1.0);
        assert!(result.t_statistic < 0.0, "A's mean is below B's");
    }

    #[test]
    fn test_description_rows() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![4.0, 5.0, 6.0, 7.0];
        let result = student_t_test(&gid("A"), &a, &gid("B"), &b);

        assert_eq!(result.description.len(), 3);
        assert_eq!(result.description[0].group, gid("A"));
        assert_eq!(result.description[0].count, 3);
        assert_eq!(result.description[1].group, gid("B"));
        assert_eq!(result.description[1].count, 4);
        assert_eq!(result.description[2].group, gid("combined"));
        assert_eq!(result.description[2].count, 7);
        assert!((result.description[2].mean - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetry_under_group_swap() {
        let a = vec![0.5, 1.5, 2.5, 3.5];
        let b = vec![1.0, 3.0, 5.0];
        let ab = student_t_test(&gid("A"), &a, &gid("B"), &b);
        let ba = student_t_test(&gid("B"), &b, &gid("A"), &a);
        assert!((ab.t_statistic + ba.t_statistic).abs() < 1e-12);
        assert!((ab.p_value - ba.p_value).abs() < 1e-12);
    }
}
