use std::path::PathBuf;

/// Errors raised while building, evaluating or reading named parameters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    /// The raw parameter table or the extra name set is malformed
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The record names a distribution family the resolver does not know
    #[error("unknown distribution kind {kind:?}{}", key_suffix(.key))]
    UnknownDistributionKind { key: Option<String>, kind: String },

    /// The record's shape fields do not describe a valid distribution
    #[error("invalid {family} parameters{}: {reason}", key_suffix(.key))]
    InvalidDistributionParameters {
        key: Option<String>,
        family: &'static str,
        reason: String,
    },

    /// No evaluated value exists for this key
    #[error("no calculated value for parameter {0:?}")]
    KeyNotFound(String),

    /// Values can only enter the store through `add_parameters` or evaluation
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    #[error("can't find this filepath {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

fn key_suffix(key: &Option<String>) -> String {
    match key {
        Some(k) => format!(" for parameter {k:?}"),
        None => String::new(),
    }
}

impl ParameterError {
    pub(crate) fn invalid(family: &'static str, reason: impl Into<String>) -> Self {
        ParameterError::InvalidDistributionParameters {
            key: None,
            family,
            reason: reason.into(),
        }
    }

    /// Attribute a resolver error to the parameter that produced it.
    ///
    /// Errors that already carry a key, or that are not resolver errors,
    /// are returned unchanged.
    #[must_use]
    pub fn with_key(self, parameter: &str) -> Self {
        match self {
            ParameterError::UnknownDistributionKind { key: None, kind } => {
                ParameterError::UnknownDistributionKind {
                    key: Some(parameter.to_string()),
                    kind,
                }
            }
            ParameterError::InvalidDistributionParameters {
                key: None,
                family,
                reason,
            } => ParameterError::InvalidDistributionParameters {
                key: Some(parameter.to_string()),
                family,
                reason,
            },
            other => other,
        }
    }

    /// The parameter key this error is attributed to, if any
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            ParameterError::UnknownDistributionKind { key, .. }
            | ParameterError::InvalidDistributionParameters { key, .. } => key.as_deref(),
            ParameterError::KeyNotFound(key) => Some(key.as_str()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParameterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_key_annotates_resolver_errors() {
        let err = ParameterError::invalid("uniform", "minimum > maximum").with_key("efficiency");
        assert_eq!(err.key(), Some("efficiency"));
        assert_eq!(
            err.to_string(),
            "invalid uniform parameters for parameter \"efficiency\": minimum > maximum"
        );
    }

    #[test]
    fn test_with_key_keeps_existing_key() {
        let err = ParameterError::UnknownDistributionKind {
            key: Some("a".into()),
            kind: "weibull".into(),
        }
        .with_key("b");
        assert_eq!(err.key(), Some("a"));
    }

    #[test]
    fn test_with_key_ignores_other_errors() {
        let err = ParameterError::Configuration("bad".into()).with_key("a");
        assert_eq!(err, ParameterError::Configuration("bad".into()));
    }
}
