use std::cmp::Ordering;
use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A single observation fed into the audit.
///
/// Records are immutable inputs; binning and summarization return derived
/// structures rather than mutating rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRecord {
    /// Predicted pure premium from the model under audit.
    pub prediction: f64,
    /// Premium-minus-claims margin whose fairness is being audited.
    pub margin: f64,
    /// Claim frequency (exposure); only its per-cell mean is reported.
    #[serde(default)]
    pub frequency: f64,
    /// Categorical group attribute. Rows with no group are excluded from
    /// grouping but still participate in bin fitting.
    #[serde(default)]
    pub group: Option<String>,
}

/// Identifier of one comparison group (e.g. a policy segment).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        GroupId(s.to_string())
    }
}

/// Label of one prediction band.
///
/// Bands are labeled by their 0-indexed rank unless the caller supplied
/// names. Ordering is numeric for ranks, lexicographic for names, with ranks
/// sorting before names; label sets within one audit are homogeneous.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BinLabel {
    Index(usize),
    Named(String),
}

impl Ord for BinLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (BinLabel::Index(a), BinLabel::Index(b)) => a.cmp(b),
            (BinLabel::Named(a), BinLabel::Named(b)) => a.cmp(b),
            (BinLabel::Index(_), BinLabel::Named(_)) => Ordering::Less,
            (BinLabel::Named(_), BinLabel::Index(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for BinLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BinLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinLabel::Index(i) => write!(f, "{}", i),
            BinLabel::Named(s) => f.write_str(s),
        }
    }
}

impl Serialize for BinLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BinLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.parse::<usize>() {
            Ok(i) => BinLabel::Index(i),
            Err(_) => BinLabel::Named(s),
        })
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: AnalysisMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> AnalysisOutput<T> {
    AnalysisOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: AnalysisMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}
