//! Uncertainty kind and distribution family identifiers
//!
//! Tables in the wild identify distribution families either by the classic
//! integer uncertainty-array numbering (`0` undefined, `4` uniform, ...) or by
//! name. Both spellings deserialize into [`UncertaintyType`]; identifiers the
//! resolver does not implement are kept as [`UncertaintyType::Unknown`] so the
//! failure surfaces at evaluation time with the offending key attached.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Distribution family selector for a parameter record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UncertaintyType {
    /// Point value without a declared distribution (id 0)
    Undefined,
    /// Point value declared as certain (id 1)
    NoUncertainty,
    /// Lognormal with `loc` = μ and `scale` = σ of the underlying normal (id 2)
    LogNormal,
    /// Normal with mean `loc` and standard deviation `scale` (id 3)
    Normal,
    /// Uniform on `[minimum, maximum]` (id 4)
    Uniform,
    /// Triangular on `[minimum, maximum]` with mode `loc` (id 5)
    Triangular,
    /// Integer draws from `[minimum, maximum)` (id 7)
    DiscreteUniform,
    /// Anything else; kept verbatim for error reporting
    Unknown(String),
}

impl UncertaintyType {
    #[must_use]
    pub fn from_id(id: i64) -> Self {
        match id {
            0 => UncertaintyType::Undefined,
            1 => UncertaintyType::NoUncertainty,
            2 => UncertaintyType::LogNormal,
            3 => UncertaintyType::Normal,
            4 => UncertaintyType::Uniform,
            5 => UncertaintyType::Triangular,
            7 => UncertaintyType::DiscreteUniform,
            other => UncertaintyType::Unknown(other.to_string()),
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "undefined" => UncertaintyType::Undefined,
            "none" | "no_uncertainty" | "point" | "fixed" => UncertaintyType::NoUncertainty,
            "lognormal" | "log_normal" => UncertaintyType::LogNormal,
            "normal" => UncertaintyType::Normal,
            "uniform" => UncertaintyType::Uniform,
            "triangular" => UncertaintyType::Triangular,
            "discrete_uniform" => UncertaintyType::DiscreteUniform,
            // Numeric identifiers sometimes arrive as strings from CSV tables
            _ => match normalized.parse::<i64>() {
                Ok(id) => UncertaintyType::from_id(id),
                Err(_) => UncertaintyType::Unknown(name.to_string()),
            },
        }
    }

    /// Integer identifier in the uncertainty-array numbering
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        match self {
            UncertaintyType::Undefined => Some(0),
            UncertaintyType::NoUncertainty => Some(1),
            UncertaintyType::LogNormal => Some(2),
            UncertaintyType::Normal => Some(3),
            UncertaintyType::Uniform => Some(4),
            UncertaintyType::Triangular => Some(5),
            UncertaintyType::DiscreteUniform => Some(7),
            UncertaintyType::Unknown(_) => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            UncertaintyType::Undefined => "undefined",
            UncertaintyType::NoUncertainty => "no_uncertainty",
            UncertaintyType::LogNormal => "lognormal",
            UncertaintyType::Normal => "normal",
            UncertaintyType::Uniform => "uniform",
            UncertaintyType::Triangular => "triangular",
            UncertaintyType::DiscreteUniform => "discrete_uniform",
            UncertaintyType::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for UncertaintyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUncertaintyType {
    Id(i64),
    Name(String),
}

impl<'de> Deserialize<'de> for UncertaintyType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawUncertaintyType::deserialize(deserializer)? {
            RawUncertaintyType::Id(id) => UncertaintyType::from_id(id),
            RawUncertaintyType::Name(name) => UncertaintyType::from_name(&name),
        })
    }
}

impl Serialize for UncertaintyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.id() {
            Some(id) => serializer.serialize_i64(id),
            None => serializer.serialize_str(self.name()),
        }
    }
}

/// Record kind. Only distribution records take part in evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ParameterKind {
    #[default]
    Distribution,
    /// Inert bookkeeping record, never evaluated
    Other(String),
}

impl ParameterKind {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name == "distribution" {
            ParameterKind::Distribution
        } else {
            ParameterKind::Other(name.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            ParameterKind::Distribution => "distribution",
            ParameterKind::Other(kind) => kind,
        }
    }
}

impl<'de> Deserialize<'de> for ParameterKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| ParameterKind::from_name(&s))
    }
}

impl Serialize for ParameterKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_and_names_agree() {
        for id in [0, 1, 2, 3, 4, 5, 7] {
            let by_id = UncertaintyType::from_id(id);
            assert_eq!(by_id.id(), Some(id));
            assert_eq!(UncertaintyType::from_name(by_id.name()), by_id);
        }
    }

    #[test]
    fn test_unsupported_ids_are_unknown() {
        assert_eq!(
            UncertaintyType::from_id(8),
            UncertaintyType::Unknown("8".to_string())
        );
        assert_eq!(
            UncertaintyType::from_name("weibull"),
            UncertaintyType::Unknown("weibull".to_string())
        );
    }

    #[test]
    fn test_deserialize_from_number_or_string() {
        let by_id: UncertaintyType = serde_json::from_str("5").unwrap();
        let by_name: UncertaintyType = serde_json::from_str("\"Triangular\"").unwrap();
        let by_numeric_string: UncertaintyType = serde_json::from_str("\"4\"").unwrap();
        assert_eq!(by_id, UncertaintyType::Triangular);
        assert_eq!(by_name, UncertaintyType::Triangular);
        assert_eq!(by_numeric_string, UncertaintyType::Uniform);
    }

    #[test]
    fn test_kind_round_trip() {
        let kind: ParameterKind = serde_json::from_str("\"distribution\"").unwrap();
        assert_eq!(kind, ParameterKind::Distribution);
        let kind: ParameterKind = serde_json::from_str("\"function\"").unwrap();
        assert_eq!(kind, ParameterKind::Other("function".into()));
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"function\"");
    }
}
