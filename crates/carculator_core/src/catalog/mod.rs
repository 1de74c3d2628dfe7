//! Vehicle parameter catalog
//!
//! Translates a raw default-parameter table into records for the
//! [`NamedParameters`] store and derives the enumerations downstream code
//! iterates over: size classes, powertrains, parameter names and years.
//!
//! A raw entry looks like:
//!
//! ```yaml
//! 2020-Medium-BEV-battery cell energy density:
//!   name: battery cell energy density
//!   sizes: [Medium, Large]
//!   powertrain: [BEV]
//!   year: 2020
//!   kind: distribution
//!   uncertainty_type: 5
//!   loc: 0.2
//!   minimum: 0.15
//!   maximum: 0.25
//! ```
//!
//! Uncertainty fields ([`UNCERTAINTY_FIELDS`]) become the record; every other
//! field is kept as metadata. An entry whose fields do not describe a valid
//! distribution is rejected here, before any evaluation.

pub mod table;

use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Deref, DerefMut};

use serde_json::Value;
use tracing::{debug, info};

use crate::distribution::Distribution;
use crate::error::{ParameterError, Result};
use crate::model::{Metadata, ParameterInput, ParameterRecord, UNCERTAINTY_FIELDS};
use crate::store::NamedParameters;

pub use table::{ParameterSource, load_parameters, rows_to_table};

/// One raw table entry: uncertainty fields mixed with descriptive fields
pub type RawParameter = serde_json::Map<String, Value>;

/// Raw default-parameter table keyed by parameter key
pub type RawParameterTable = BTreeMap<String, RawParameter>;

#[derive(Debug, Clone, Default)]
pub struct VehicleInputParameters {
    parameters: NamedParameters,
    sizes: Vec<String>,
    powertrains: Vec<String>,
    names: Vec<String>,
    years: Vec<i64>,
}

fn string_list(key: &str, field: &str, value: &Value) -> Result<Vec<String>> {
    let invalid = || {
        ParameterError::Configuration(format!(
            "parameter {key:?}: `{field}` must be a string or a list of strings"
        ))
    };
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

fn year_list(key: &str, value: &Value) -> Result<Vec<i64>> {
    let invalid = || {
        ParameterError::Configuration(format!(
            "parameter {key:?}: `year` must be an integer or a list of integers"
        ))
    };
    match value {
        Value::Number(n) => n.as_i64().map(|y| vec![y]).ok_or_else(invalid),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_i64().ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

/// Split a raw entry into its record and its metadata
fn split_entry(key: &str, entry: &RawParameter) -> Result<(ParameterRecord, Metadata)> {
    let (uncertainty, metadata): (Vec<_>, Vec<_>) = entry
        .iter()
        .partition(|(field, _)| UNCERTAINTY_FIELDS.contains(&field.as_str()));

    let uncertainty: serde_json::Map<String, Value> = uncertainty
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect();
    let record: ParameterRecord = serde_json::from_value(Value::Object(uncertainty))
        .map_err(|e| ParameterError::Configuration(format!("parameter {key:?}: {e}")))?;

    if record.is_evaluable() && record.uncertainty_type.is_none() && record.amount.is_none() {
        return Err(ParameterError::Configuration(format!(
            "parameter {key:?} is a distribution but has neither `uncertainty_type` nor `amount`"
        )));
    }

    // Unknown families are reported at evaluation time
    if record.is_evaluable() {
        if let Err(ParameterError::InvalidDistributionParameters { family, reason, .. }) =
            Distribution::from_record(&record)
        {
            return Err(ParameterError::Configuration(format!(
                "parameter {key:?}: invalid {family} parameters: {reason}"
            )));
        }
    }

    let metadata = metadata
        .into_iter()
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect();
    Ok((record, metadata))
}

impl VehicleInputParameters {
    /// Build the catalog from a default-parameter table and the set of extra
    /// parameter names that have no numeric definition of their own.
    pub fn new(table: RawParameterTable, extra: BTreeSet<String>) -> Result<Self> {
        let mut sizes = BTreeSet::new();
        let mut powertrains = BTreeSet::new();
        let mut names = extra;
        let mut years = BTreeSet::new();
        let mut batch = Vec::with_capacity(table.len());

        for (key, entry) in &table {
            let (record, metadata) = split_entry(key, entry)?;

            if let Some(value) = metadata.get("sizes") {
                sizes.extend(string_list(key, "sizes", value)?);
            }
            if let Some(value) = metadata.get("powertrain") {
                powertrains.extend(string_list(key, "powertrain", value)?);
            }
            if let Some(value) = metadata.get("year") {
                years.extend(year_list(key, value)?);
            }
            match metadata.get("name") {
                Some(Value::String(name)) => {
                    names.insert(name.clone());
                }
                Some(_) => {
                    return Err(ParameterError::Configuration(format!(
                        "parameter {key:?}: `name` must be a string"
                    )));
                }
                None => {
                    names.insert(key.clone());
                }
            }

            if !record.is_evaluable() {
                debug!(key = %key, kind = ?record.kind, "inert parameter record");
            }
            batch.push((key.clone(), ParameterInput::new(record).with_metadata(metadata)));
        }

        let mut parameters = NamedParameters::new();
        parameters.add_parameters(batch);

        let catalog = Self {
            parameters,
            sizes: sizes.into_iter().collect(),
            powertrains: powertrains.into_iter().collect(),
            names: names.into_iter().collect(),
            years: years.into_iter().collect(),
        };
        info!(
            parameters = catalog.parameters.len(),
            sizes = catalog.sizes.len(),
            powertrains = catalog.powertrains.len(),
            years = catalog.years.len(),
            "vehicle parameter catalog built"
        );
        Ok(catalog)
    }

    /// Build the catalog from untyped input, checking that the table is a
    /// mapping of mappings and that `extra` is a set of strings.
    pub fn from_value(table: Value, extra: Value) -> Result<Self> {
        let Value::Object(entries) = table else {
            return Err(ParameterError::Configuration(
                "the passed parameters are not of mapping type".to_string(),
            ));
        };
        let table = entries
            .into_iter()
            .map(|(key, entry)| match entry {
                Value::Object(fields) => Ok((key, fields)),
                _ => Err(ParameterError::Configuration(format!(
                    "parameter {key:?} is not a mapping"
                ))),
            })
            .collect::<Result<RawParameterTable>>()?;

        let Value::Array(items) = extra else {
            return Err(ParameterError::Configuration(
                "the extra parameter names are not a set of strings".to_string(),
            ));
        };
        let mut names = BTreeSet::new();
        for item in items {
            let Value::String(name) = item else {
                return Err(ParameterError::Configuration(
                    "the extra parameter names are not a set of strings".to_string(),
                ));
            };
            if !names.insert(name.clone()) {
                return Err(ParameterError::Configuration(format!(
                    "extra parameter name {name:?} is listed twice"
                )));
            }
        }

        Self::new(table, names)
    }

    /// Distinct size classes, sorted
    #[must_use]
    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }

    /// Distinct powertrain identifiers, sorted
    #[must_use]
    pub fn powertrains(&self) -> &[String] {
        &self.powertrains
    }

    /// Distinct parameter names, including the extra names, sorted
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.names
    }

    /// Distinct years, sorted
    #[must_use]
    pub fn years(&self) -> &[i64] {
        &self.years
    }

    #[must_use]
    pub fn into_inner(self) -> NamedParameters {
        self.parameters
    }
}

impl Deref for VehicleInputParameters {
    type Target = NamedParameters;

    fn deref(&self) -> &Self::Target {
        &self.parameters
    }
}

impl DerefMut for VehicleInputParameters {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.parameters
    }
}
