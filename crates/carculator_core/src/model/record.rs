use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::uncertainty::{ParameterKind, UncertaintyType};

/// Descriptive fields that never take part in evaluation
/// (applicable sizes, powertrains, year, display name, ...)
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Fields of a raw table entry that describe its uncertainty.
/// Everything else in the entry is metadata.
pub const UNCERTAINTY_FIELDS: [&str; 8] = [
    "kind",
    "uncertainty_type",
    "amount",
    "loc",
    "scale",
    "shape",
    "minimum",
    "maximum",
];

/// Uncertainty specification of one named parameter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ParameterKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty_type: Option<UncertaintyType>,
    /// Precomputed point value. Authoritative for static evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl ParameterRecord {
    /// A fixed point value
    #[must_use]
    pub fn point(amount: f64) -> Self {
        Self {
            kind: Some(ParameterKind::Distribution),
            uncertainty_type: Some(UncertaintyType::Undefined),
            amount: Some(amount),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn uniform(minimum: f64, maximum: f64) -> Self {
        Self {
            kind: Some(ParameterKind::Distribution),
            uncertainty_type: Some(UncertaintyType::Uniform),
            minimum: Some(minimum),
            maximum: Some(maximum),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn triangular(minimum: f64, mode: f64, maximum: f64) -> Self {
        Self {
            kind: Some(ParameterKind::Distribution),
            uncertainty_type: Some(UncertaintyType::Triangular),
            loc: Some(mode),
            minimum: Some(minimum),
            maximum: Some(maximum),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn normal(loc: f64, scale: f64) -> Self {
        Self {
            kind: Some(ParameterKind::Distribution),
            uncertainty_type: Some(UncertaintyType::Normal),
            loc: Some(loc),
            scale: Some(scale),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn lognormal(loc: f64, scale: f64) -> Self {
        Self {
            uncertainty_type: Some(UncertaintyType::LogNormal),
            ..Self::normal(loc, scale)
        }
    }

    /// Bound the record to `[minimum, maximum]`
    #[must_use]
    pub fn bounded(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    /// Mark the record as inert with a non-distribution kind
    #[must_use]
    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = Some(ParameterKind::from_name(kind));
        self
    }

    /// Whether `static` and `stochastic` evaluation consider this record.
    /// An absent kind counts as a distribution.
    #[must_use]
    pub fn is_evaluable(&self) -> bool {
        matches!(self.kind, None | Some(ParameterKind::Distribution))
    }
}

/// One entry of an `add_parameters` batch: the record fields plus an
/// optional metadata sub-mapping
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterInput {
    #[serde(flatten)]
    pub record: ParameterRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl ParameterInput {
    #[must_use]
    pub fn new(record: ParameterRecord) -> Self {
        Self {
            record,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl From<ParameterRecord> for ParameterInput {
    fn from(record: ParameterRecord) -> Self {
        Self::new(record)
    }
}

/// Evaluated value of a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// Point estimate produced by `static`
    Scalar(f64),
    /// One sample per iteration produced by `stochastic`
    Samples(Vec<f64>),
}

impl ParameterValue {
    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ParameterValue::Scalar(v) => Some(*v),
            ParameterValue::Samples(_) => None,
        }
    }

    #[must_use]
    pub fn as_samples(&self) -> Option<&[f64]> {
        match self {
            ParameterValue::Scalar(_) => None,
            ParameterValue::Samples(samples) => Some(samples),
        }
    }

    /// Number of values held: 1 for a scalar, `n` for samples
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ParameterValue::Scalar(_) => 1,
            ParameterValue::Samples(samples) => samples.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
